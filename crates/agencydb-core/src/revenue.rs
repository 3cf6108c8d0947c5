//! Monthly revenue ledger: manual rows plus rows derived from collaborations.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::CrmError;

/// Calendar month, rendered `YYYY-MM`. Stored as the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self, CrmError> {
        if !(1..=12).contains(&month) {
            return Err(CrmError::Validation(format!(
                "month must be 1-12, got {month}"
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CrmError::Validation(format!("year {year} is out of range")));
        }
        Ok(Self { year, month })
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }

    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        // Range checked in `new` and guaranteed by `From<NaiveDate>`.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The month before this one.
    #[must_use]
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = CrmError;

    /// Accepts `YYYY-MM`, and `YYYY-MM-DD` as written by older clients. The
    /// day of the long form must exist in that month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CrmError::Validation(format!("month must be YYYY-MM, got '{s}'"));
        let head = s.get(..7).ok_or_else(invalid)?;
        if !is_year_month_shape(head) {
            return Err(invalid());
        }
        match s.len() {
            7 => {
                let year = head[..4].parse::<i32>().map_err(|_| invalid())?;
                let month = head[5..].parse::<u32>().map_err(|_| invalid())?;
                YearMonth::new(year, month)
            }
            10 => {
                let day = &s.as_bytes()[7..];
                if day[0] != b'-' || !day[1..].iter().all(u8::is_ascii_digit) {
                    return Err(invalid());
                }
                let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?;
                Ok(YearMonth::from(date))
            }
            _ => Err(invalid()),
        }
    }
}

/// Four ASCII digits, `-`, two ASCII digits.
fn is_year_month_shape(head: &str) -> bool {
    let bytes = head.as_bytes();
    bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueEntry {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub month: YearMonth,
    pub amount: Decimal,
    pub invoiced: bool,
    pub notes: Option<String>,
    /// Present iff the synchronizer generated this row from a collaboration.
    pub source_collaboration_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RevenueEntry {
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.source_collaboration_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRevenueEntry {
    pub creator_id: Uuid,
    pub month: YearMonth,
    pub amount: Decimal,
    #[serde(default)]
    pub invoiced: bool,
    pub notes: Option<String>,
    #[serde(skip)]
    pub source_collaboration_id: Option<Uuid>,
}

#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevenuePatch {
    pub creator_id: Option<Uuid>,
    pub month: Option<YearMonth>,
    pub amount: Option<Decimal>,
    pub invoiced: Option<bool>,
    pub notes: Option<Option<String>>,
}

impl RevenuePatch {
    pub fn apply(self, entry: &mut RevenueEntry) {
        if let Some(v) = self.creator_id {
            entry.creator_id = v;
        }
        if let Some(v) = self.month {
            entry.month = v;
        }
        if let Some(v) = self.amount {
            entry.amount = v;
        }
        if let Some(v) = self.invoiced {
            entry.invoiced = v;
        }
        if let Some(v) = self.notes {
            entry.notes = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RevenueFilter {
    pub creator_id: Option<Uuid>,
    pub month: Option<YearMonth>,
    pub source_collaboration_id: Option<Uuid>,
    /// Only rows without a source collaboration.
    #[serde(default)]
    pub manual_only: bool,
}

impl RevenueFilter {
    #[must_use]
    pub fn owned_by(collaboration_id: Uuid) -> Self {
        Self {
            source_collaboration_id: Some(collaboration_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn manual(creator_id: Uuid, month: YearMonth) -> Self {
        Self {
            creator_id: Some(creator_id),
            month: Some(month),
            manual_only: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, entry: &RevenueEntry) -> bool {
        self.creator_id.is_none_or(|c| entry.creator_id == c)
            && self.month.is_none_or(|m| entry.month == m)
            && self
                .source_collaboration_id
                .is_none_or(|s| entry.source_collaboration_id == Some(s))
            && (!self.manual_only || !entry.is_auto())
    }
}
