//! Persistence seams for the CRM.
//!
//! One trait per record family so each operation names only what it touches.
//! Implementations: [`crate::InMemoryStore`] here, `PgStore` in `agencydb-db`.
//! Writes that name a missing id return [`CrmError::NotFound`]; transport and
//! database failures surface as [`CrmError::StoreUnavailable`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::brands::{Brand, BrandFilter, BrandPatch, NewBrand};
use crate::collaborations::{
    Collaboration, CollaborationFilter, CollaborationPatch, NewCollaboration,
};
use crate::creators::{
    Creator, CreatorFilter, CreatorPatch, CreatorPlatform, NewCreator, NewCreatorPlatform,
};
use crate::events::{
    Event, EventFilter, EventPatch, NewEvent, NewParticipation, Participation,
    ParticipationFilter, ParticipationPatch,
};
use crate::payments::{NewPayment, PaymentFilter, PaymentPatch, PaymentRecord};
use crate::proposals::{NewProposal, Proposal, ProposalFilter, ProposalPatch};
use crate::revenue::{NewRevenueEntry, RevenueEntry, RevenueFilter, RevenuePatch};
use crate::CrmError;

#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn get_proposal(&self, id: Uuid) -> Result<Proposal, CrmError>;
    async fn find_proposals(&self, filter: &ProposalFilter) -> Result<Vec<Proposal>, CrmError>;
    async fn insert_proposal(&self, new: NewProposal) -> Result<Proposal, CrmError>;
    async fn update_proposal(&self, id: Uuid, patch: ProposalPatch) -> Result<Proposal, CrmError>;
    async fn delete_proposal(&self, id: Uuid) -> Result<(), CrmError>;
}

#[async_trait]
pub trait BrandStore: Send + Sync {
    async fn get_brand(&self, id: Uuid) -> Result<Brand, CrmError>;
    async fn find_brands(&self, filter: &BrandFilter) -> Result<Vec<Brand>, CrmError>;
    async fn insert_brand(&self, new: NewBrand) -> Result<Brand, CrmError>;
    async fn update_brand(&self, id: Uuid, patch: BrandPatch) -> Result<Brand, CrmError>;
    async fn delete_brand(&self, id: Uuid) -> Result<(), CrmError>;
}

#[async_trait]
pub trait CreatorStore: Send + Sync {
    async fn get_creator(&self, id: Uuid) -> Result<Creator, CrmError>;
    /// Newest first.
    async fn find_creators(&self, filter: &CreatorFilter) -> Result<Vec<Creator>, CrmError>;
    async fn insert_creator(&self, new: NewCreator) -> Result<Creator, CrmError>;
    async fn update_creator(&self, id: Uuid, patch: CreatorPatch) -> Result<Creator, CrmError>;
    /// Removes the creator's platforms and participations with them.
    async fn delete_creator(&self, id: Uuid) -> Result<(), CrmError>;

    /// Ordered by insertion.
    async fn find_creator_platforms(
        &self,
        creator_id: Uuid,
    ) -> Result<Vec<CreatorPlatform>, CrmError>;
    /// Drop every platform of the creator and insert `platforms` in their place.
    async fn replace_creator_platforms(
        &self,
        creator_id: Uuid,
        platforms: Vec<NewCreatorPlatform>,
    ) -> Result<Vec<CreatorPlatform>, CrmError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event(&self, id: Uuid) -> Result<Event, CrmError>;
    /// Latest start date first; undated events last.
    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<Event>, CrmError>;
    async fn insert_event(&self, new: NewEvent) -> Result<Event, CrmError>;
    async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Event, CrmError>;
    /// Removes the event's participations with it.
    async fn delete_event(&self, id: Uuid) -> Result<(), CrmError>;

    async fn get_participation(&self, id: Uuid) -> Result<Participation, CrmError>;
    async fn find_participations(
        &self,
        filter: &ParticipationFilter,
    ) -> Result<Vec<Participation>, CrmError>;
    /// A second participation of the same creator in one event is a
    /// [`CrmError::Conflict`].
    async fn insert_participation(
        &self,
        event_id: Uuid,
        new: NewParticipation,
    ) -> Result<Participation, CrmError>;
    async fn update_participation(
        &self,
        id: Uuid,
        patch: ParticipationPatch,
    ) -> Result<Participation, CrmError>;
    async fn delete_participation(&self, id: Uuid) -> Result<(), CrmError>;
}

#[async_trait]
pub trait CollaborationStore: Send + Sync {
    async fn get_collaboration(&self, id: Uuid) -> Result<Collaboration, CrmError>;
    async fn find_collaborations(
        &self,
        filter: &CollaborationFilter,
    ) -> Result<Vec<Collaboration>, CrmError>;
    async fn insert_collaboration(&self, new: NewCollaboration)
        -> Result<Collaboration, CrmError>;
    async fn update_collaboration(
        &self,
        id: Uuid,
        patch: CollaborationPatch,
    ) -> Result<Collaboration, CrmError>;
    async fn delete_collaboration(&self, id: Uuid) -> Result<(), CrmError>;
}

#[async_trait]
pub trait RevenueStore: Send + Sync {
    async fn get_revenue(&self, id: Uuid) -> Result<RevenueEntry, CrmError>;
    /// Ordered by month, then creation time.
    async fn find_revenue(&self, filter: &RevenueFilter) -> Result<Vec<RevenueEntry>, CrmError>;
    async fn insert_revenue(&self, new: NewRevenueEntry) -> Result<RevenueEntry, CrmError>;
    async fn update_revenue(&self, id: Uuid, patch: RevenuePatch)
        -> Result<RevenueEntry, CrmError>;
    async fn delete_revenue(&self, id: Uuid) -> Result<(), CrmError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn get_payment(&self, id: Uuid) -> Result<PaymentRecord, CrmError>;
    async fn find_payments(&self, filter: &PaymentFilter)
        -> Result<Vec<PaymentRecord>, CrmError>;
    async fn insert_payment(&self, new: NewPayment) -> Result<PaymentRecord, CrmError>;
    async fn update_payment(&self, id: Uuid, patch: PaymentPatch)
        -> Result<PaymentRecord, CrmError>;
    async fn delete_payment(&self, id: Uuid) -> Result<(), CrmError>;
}

/// Everything the server needs behind one trait object.
#[async_trait]
pub trait CrmStore:
    ProposalStore
    + BrandStore
    + CreatorStore
    + EventStore
    + CollaborationStore
    + RevenueStore
    + PaymentStore
{
    /// Liveness check against the backing store.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::StoreUnavailable`] when the backend cannot be reached.
    async fn health_check(&self) -> Result<(), CrmError>;
}
