//! Turns a proposal into a tracked brand, once.
//!
//! The only guard against duplicate brands is the lookup by exact name before
//! the insert. Two conversions of different proposals with the same brand
//! name can both miss the lookup and both insert; nothing at the storage
//! layer prevents that.

use serde::Serialize;
use uuid::Uuid;

use crate::brands::{Brand, BrandFilter, BrandStatus, NewBrand};
use crate::proposals::{Proposal, ProposalPatch};
use crate::store::{BrandStore, ProposalStore};
use crate::CrmError;

/// Both variants are successes. `AlreadyExists` means the proposal was linked
/// to a brand that was already on file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "brand", rename_all = "snake_case")]
pub enum Conversion {
    Created(Brand),
    AlreadyExists(Brand),
}

impl Conversion {
    #[must_use]
    pub fn brand(&self) -> &Brand {
        match self {
            Conversion::Created(brand) | Conversion::AlreadyExists(brand) => brand,
        }
    }

    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Conversion::Created(_))
    }
}

/// Brand fields copied from the proposal; status starts at `CONTACTED`.
#[must_use]
pub fn brand_from_proposal(proposal: &Proposal) -> NewBrand {
    NewBrand {
        name: proposal.brand_name.clone(),
        sector: proposal.sector.clone(),
        target_demographic: proposal.target_demographic.clone(),
        contact_email: proposal.contact_email.clone(),
        phone: proposal.phone.clone(),
        website: proposal.website.clone(),
        agent: proposal.agent.clone(),
        priority: proposal.priority,
        notes: proposal.notes.clone(),
        suggested_creators: proposal.suggested_creators.clone(),
        referrer: proposal.referrer.clone(),
        contact_date: proposal.contact_date,
        status: BrandStatus::Contacted,
        origin_proposal_id: Some(proposal.id),
    }
}

/// Link the proposal to a brand with the same name, creating it if needed.
///
/// The brand write and the proposal link are two separate store calls. If
/// the second fails the brand stays; calling again finds it by name and
/// takes the `AlreadyExists` path.
///
/// # Errors
///
/// Returns [`CrmError::NotFound`] if the proposal does not exist, or the store error.
pub async fn convert_to_brand<S>(store: &S, proposal_id: Uuid) -> Result<Conversion, CrmError>
where
    S: ProposalStore + BrandStore + ?Sized,
{
    let proposal = store.get_proposal(proposal_id).await?;

    let existing = store
        .find_brands(&BrandFilter::by_name(proposal.brand_name.clone()))
        .await?;
    if let Some(brand) = existing.into_iter().next() {
        store
            .update_proposal(proposal_id, ProposalPatch::link_brand(brand.id))
            .await?;
        tracing::info!(
            %proposal_id,
            brand_id = %brand.id,
            brand_name = %brand.name,
            "brand already exists; proposal linked"
        );
        return Ok(Conversion::AlreadyExists(brand));
    }

    let brand = store.insert_brand(brand_from_proposal(&proposal)).await?;
    store
        .update_proposal(proposal_id, ProposalPatch::link_brand(brand.id))
        .await?;
    tracing::info!(
        %proposal_id,
        brand_id = %brand.id,
        brand_name = %brand.name,
        "proposal converted to brand"
    );
    Ok(Conversion::Created(brand))
}
