//! Revenue reconciliation commands.
//!
//! `resync` walks every collaboration; failures are listed and the pass keeps going.

use agencydb_core::{find_discrepancies, resync_all, CrmStore, Discrepancy, ResyncReport};
use clap::Subcommand;

/// Sub-commands available under `revenue`.
#[derive(Debug, Subcommand)]
pub enum RevenueCommands {
    /// List creator/months holding both manual and synced revenue
    Discrepancies,
    /// Re-derive the synced revenue row of every collaboration
    Resync {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
}

/// # Errors
///
/// Returns an error if the store fails.
pub(crate) async fn run<S>(store: &S, command: RevenueCommands) -> anyhow::Result<()>
where
    S: CrmStore + ?Sized,
{
    let lines = match command {
        RevenueCommands::Discrepancies => {
            let found = find_discrepancies(store).await?;
            render_discrepancies(&found)
        }
        RevenueCommands::Resync { dry_run } => {
            let report = resync_all(store, dry_run).await?;
            if !report.failures.is_empty() {
                tracing::warn!(
                    failures = report.failures.len(),
                    "some collaborations could not be synced"
                );
            }
            render_resync(&report)
        }
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_discrepancies(found: &[Discrepancy]) -> Vec<String> {
    if found.is_empty() {
        return vec!["no discrepancies".to_string()];
    }
    let mut lines = vec![format!("{} discrepancies:", found.len())];
    lines.extend(found.iter().map(|d| {
        format!(
            "  {} creator {} synced {} manual {}",
            d.month, d.creator_id, d.auto_total, d.manual_total
        )
    }));
    lines
}

pub(crate) fn render_resync(report: &ResyncReport) -> Vec<String> {
    let prefix = if report.dry_run { "dry-run: " } else { "" };
    let mut lines = vec![format!(
        "{prefix}scanned {} collaborations: {} created, {} updated, {} removed, {} unchanged",
        report.scanned, report.created, report.updated, report.removed, report.unchanged
    )];
    lines.extend(
        report
            .failures
            .iter()
            .map(|failure| format!("  failed {}: {}", failure.collaboration_id, failure.reason)),
    );
    lines
}
