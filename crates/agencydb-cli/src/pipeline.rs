//! Proposal pipeline commands.

use agencydb_core::{
    convert_to_brand, move_to_stage, Conversion, CrmStore, PipelineStats, ProposalFilter,
    ProposalStage, StageMove,
};
use clap::Subcommand;
use uuid::Uuid;

/// Sub-commands available under `pipeline`.
#[derive(Debug, Subcommand)]
pub enum PipelineCommands {
    /// Count proposals per stage, agent and urgency
    Stats,
    /// Move a proposal to another stage
    Move {
        /// Proposal id
        #[arg(long)]
        proposal: Uuid,
        /// Target stage (TO_CONTACT, CONTACTED, NEGOTIATING, WON, LOST)
        #[arg(long)]
        stage: ProposalStage,
    },
    /// Create a brand from a proposal unless one with the same name exists
    Convert {
        /// Proposal id
        #[arg(long)]
        proposal: Uuid,
    },
}

/// # Errors
///
/// Returns an error if the proposal does not exist or the store fails.
pub(crate) async fn run<S>(store: &S, command: PipelineCommands) -> anyhow::Result<()>
where
    S: CrmStore + ?Sized,
{
    let lines = match command {
        PipelineCommands::Stats => run_stats(store).await?,
        PipelineCommands::Move { proposal, stage } => {
            vec![run_move(store, proposal, stage).await?]
        }
        PipelineCommands::Convert { proposal } => vec![run_convert(store, proposal).await?],
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

pub(crate) async fn run_stats<S>(store: &S) -> anyhow::Result<Vec<String>>
where
    S: CrmStore + ?Sized,
{
    let proposals = store.find_proposals(&ProposalFilter::default()).await?;
    Ok(render_stats(&PipelineStats::from_proposals(&proposals)))
}

pub(crate) async fn run_move<S>(
    store: &S,
    proposal_id: Uuid,
    stage: ProposalStage,
) -> anyhow::Result<String>
where
    S: CrmStore + ?Sized,
{
    let outcome = move_to_stage(store, proposal_id, stage).await?;
    Ok(match outcome {
        StageMove::Unchanged { proposal } => {
            format!("{} already in {}", proposal.brand_name, proposal.stage)
        }
        StageMove::Moved { from, proposal } => {
            format!("{}: {from} -> {}", proposal.brand_name, proposal.stage)
        }
    })
}

pub(crate) async fn run_convert<S>(store: &S, proposal_id: Uuid) -> anyhow::Result<String>
where
    S: CrmStore + ?Sized,
{
    let conversion = convert_to_brand(store, proposal_id).await?;
    Ok(match conversion {
        Conversion::Created(brand) => format!("created brand {} ({})", brand.name, brand.id),
        Conversion::AlreadyExists(brand) => {
            format!("brand {} already exists ({})", brand.name, brand.id)
        }
    })
}

fn render_stats(stats: &PipelineStats) -> Vec<String> {
    let mut lines = vec![format!("proposals: {} ({} urgent)", stats.total, stats.urgent)];
    lines.extend(
        stats
            .by_stage
            .iter()
            .map(|(stage, count)| format!("  {:<12} {count}", stage.as_str())),
    );
    if !stats.by_agent.is_empty() {
        lines.push("by agent:".to_string());
        lines.extend(
            stats
                .by_agent
                .iter()
                .map(|(agent, count)| format!("  {agent:<12} {count}")),
        );
    }
    lines
}
