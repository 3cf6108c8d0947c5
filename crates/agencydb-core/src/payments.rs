//! Creator payment records and their verification flag.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::creators::ensure_creator;
use crate::revenue::YearMonth;
use crate::store::{CreatorStore, PaymentStore};
use crate::CrmError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub month: YearMonth,
    pub payment_type: Option<String>,
    pub amount_paid: Decimal,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_link: Option<String>,
    pub verified: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub creator_id: Uuid,
    pub month: YearMonth,
    pub payment_type: Option<String>,
    #[serde(default)]
    pub amount_paid: Decimal,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_link: Option<String>,
    #[serde(default)]
    pub verified: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentPatch {
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentFilter {
    pub creator_id: Option<Uuid>,
    pub month: Option<YearMonth>,
}

impl PaymentFilter {
    #[must_use]
    pub fn matches(&self, payment: &PaymentRecord) -> bool {
        self.creator_id.is_none_or(|c| payment.creator_id == c)
            && self.month.is_none_or(|m| payment.month == m)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentStats {
    pub month: YearMonth,
    pub total: usize,
    pub verified: usize,
    pub to_verify: usize,
    pub amount_total: Decimal,
}

impl PaymentStats {
    /// Summarize the payments recorded for `month`; other months are ignored.
    #[must_use]
    pub fn for_month(month: YearMonth, payments: &[PaymentRecord]) -> Self {
        let in_month: Vec<&PaymentRecord> =
            payments.iter().filter(|p| p.month == month).collect();
        let verified = in_month.iter().filter(|p| p.verified).count();
        Self {
            month,
            total: in_month.len(),
            verified,
            to_verify: in_month.len() - verified,
            amount_total: in_month.iter().map(|p| p.amount_paid).sum(),
        }
    }
}

/// # Errors
///
/// Returns [`CrmError::Validation`] for a negative amount or an unknown
/// creator, or the store error.
pub async fn record_payment<S>(store: &S, new: NewPayment) -> Result<PaymentRecord, CrmError>
where
    S: PaymentStore + CreatorStore + ?Sized,
{
    if new.amount_paid < Decimal::ZERO {
        return Err(CrmError::Validation(format!(
            "amount_paid must not be negative, got {}",
            new.amount_paid
        )));
    }
    ensure_creator(store, new.creator_id).await?;
    store.insert_payment(new).await
}

/// Flip the verified flag of a payment, reading the current value from the store.
///
/// # Errors
///
/// Returns [`CrmError::NotFound`] if the payment does not exist, or the store error.
pub async fn toggle_payment_verified<S>(store: &S, id: Uuid) -> Result<PaymentRecord, CrmError>
where
    S: PaymentStore + ?Sized,
{
    let current = store.get_payment(id).await?;
    let updated = store
        .update_payment(
            id,
            PaymentPatch {
                verified: Some(!current.verified),
            },
        )
        .await?;
    tracing::info!(payment_id = %id, verified = updated.verified, "payment verification toggled");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;

    fn payment(month: YearMonth, amount: i64, verified: bool) -> PaymentRecord {
        let now = Utc::now();
        PaymentRecord {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            month,
            payment_type: None,
            amount_paid: Decimal::new(amount, 0),
            invoice_number: None,
            invoice_date: None,
            invoice_link: None,
            verified,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn stats_count_only_the_requested_month() {
        let march = YearMonth::new(2024, 3).unwrap();
        let april = YearMonth::new(2024, 4).unwrap();
        let payments = vec![
            payment(march, 100, true),
            payment(march, 250, false),
            payment(april, 999, false),
        ];

        let stats = PaymentStats::for_month(march, &payments);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.verified, 1);
        assert_eq!(stats.to_verify, 1);
        assert_eq!(stats.amount_total, Decimal::new(350, 0));
    }

    #[tokio::test]
    async fn toggling_twice_restores_the_flag() {
        let store = InMemoryStore::new();
        let creator = crate::create_creator(&store, crate::NewCreator::named("Nova"))
            .await
            .unwrap();
        let recorded = record_payment(
            &store,
            NewPayment {
                creator_id: creator.id,
                month: YearMonth::new(2024, 3).unwrap(),
                payment_type: Some("bank transfer".to_string()),
                amount_paid: Decimal::new(1200, 0),
                invoice_number: Some("2024/031".to_string()),
                invoice_date: None,
                invoice_link: None,
                verified: false,
                notes: None,
            },
        )
        .await
        .unwrap();

        let once = toggle_payment_verified(&store, recorded.id).await.unwrap();
        assert!(once.verified);
        let twice = toggle_payment_verified(&store, recorded.id).await.unwrap();
        assert!(!twice.verified);
    }

    #[tokio::test]
    async fn toggling_unknown_payment_is_not_found() {
        let store = InMemoryStore::new();
        let err = toggle_payment_verified(&store, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
