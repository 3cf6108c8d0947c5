//! Kanban pipeline: stage moves and board/stat views over proposals.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::proposals::{Priority, Proposal, ProposalPatch, ProposalStage};
use crate::store::ProposalStore;
use crate::CrmError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StageMove {
    /// The proposal was already in the requested stage; nothing was written.
    Unchanged { proposal: Proposal },
    Moved {
        from: ProposalStage,
        proposal: Proposal,
    },
}

impl StageMove {
    #[must_use]
    pub fn proposal(&self) -> &Proposal {
        match self {
            StageMove::Unchanged { proposal } | StageMove::Moved { proposal, .. } => proposal,
        }
    }

    #[must_use]
    pub fn into_proposal(self) -> Proposal {
        match self {
            StageMove::Unchanged { proposal } | StageMove::Moved { proposal, .. } => proposal,
        }
    }
}

/// Move a proposal to `stage`. Any stage may follow any other.
///
/// The proposal is re-read from the store rather than trusted from the
/// caller. If the write fails the stored stage is whatever it was before.
///
/// # Errors
///
/// Returns [`CrmError::NotFound`] if the proposal does not exist, or the store error.
pub async fn move_to_stage<S>(
    store: &S,
    proposal_id: Uuid,
    stage: ProposalStage,
) -> Result<StageMove, CrmError>
where
    S: ProposalStore + ?Sized,
{
    let current = store.get_proposal(proposal_id).await?;
    if current.stage == stage {
        tracing::debug!(%proposal_id, %stage, "proposal already in stage");
        return Ok(StageMove::Unchanged { proposal: current });
    }

    let from = current.stage;
    let proposal = store
        .update_proposal(proposal_id, ProposalPatch::stage(stage))
        .await?;
    tracing::info!(%proposal_id, %from, to = %stage, "proposal moved");
    Ok(StageMove::Moved { from, proposal })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineColumn {
    pub stage: ProposalStage,
    pub proposals: Vec<Proposal>,
}

/// The five kanban columns in stage order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineBoard {
    pub columns: Vec<PipelineColumn>,
}

impl PipelineBoard {
    /// Columns are sorted most urgent first, then most recently updated.
    #[must_use]
    pub fn from_proposals(proposals: Vec<Proposal>) -> Self {
        let mut by_stage: BTreeMap<ProposalStage, Vec<Proposal>> = BTreeMap::new();
        for proposal in proposals {
            by_stage.entry(proposal.stage).or_default().push(proposal);
        }

        let columns = ProposalStage::ALL
            .into_iter()
            .map(|stage| {
                let mut proposals = by_stage.remove(&stage).unwrap_or_default();
                proposals.sort_by(|a, b| {
                    b.priority
                        .cmp(&a.priority)
                        .then_with(|| b.updated_at.cmp(&a.updated_at))
                });
                PipelineColumn { stage, proposals }
            })
            .collect();
        Self { columns }
    }

    #[must_use]
    pub fn column(&self, stage: ProposalStage) -> &[Proposal] {
        self.columns
            .iter()
            .find(|c| c.stage == stage)
            .map_or(&[], |c| c.proposals.as_slice())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub total: usize,
    pub by_stage: BTreeMap<ProposalStage, usize>,
    pub urgent: usize,
    /// Keyed by assigned agent; unassigned proposals are not counted here.
    pub by_agent: BTreeMap<String, usize>,
}

impl PipelineStats {
    #[must_use]
    pub fn from_proposals(proposals: &[Proposal]) -> Self {
        let mut stats = Self {
            total: proposals.len(),
            by_stage: ProposalStage::ALL.into_iter().map(|s| (s, 0)).collect(),
            ..Self::default()
        };
        for proposal in proposals {
            *stats.by_stage.entry(proposal.stage).or_default() += 1;
            if proposal.priority == Priority::Urgent {
                stats.urgent += 1;
            }
            if let Some(agent) = proposal.agent.as_deref() {
                *stats.by_agent.entry(agent.to_string()).or_default() += 1;
            }
        }
        stats
    }
}
