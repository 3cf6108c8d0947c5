//! [`PgStore`]: the core store traits over a Postgres pool.

use agencydb_core::{
    Brand, BrandFilter, BrandPatch, BrandStore, Collaboration, CollaborationFilter,
    CollaborationPatch, CollaborationStore, Creator, CreatorFilter, CreatorPatch,
    CreatorPlatform, CreatorStore, CrmError, CrmStore, Event, EventFilter, EventPatch,
    EventStore, NewBrand, NewCollaboration, NewCreator, NewCreatorPlatform, NewEvent,
    NewParticipation, NewPayment, NewProposal, NewRevenueEntry, Participation,
    ParticipationFilter, ParticipationPatch, PaymentFilter, PaymentPatch, PaymentRecord,
    PaymentStore, Proposal, ProposalFilter, ProposalPatch, ProposalStore, RevenueEntry,
    RevenueFilter, RevenuePatch, RevenueStore,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    brands, collaborations, creators, events, health_check, payments, proposals, revenue, DbError,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, CrmError>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(CrmError::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

#[async_trait]
impl ProposalStore for PgStore {
    async fn get_proposal(&self, id: Uuid) -> Result<Proposal, CrmError> {
        let row = proposals::get_proposal(&self.pool, id)
            .await?
            .ok_or(CrmError::not_found("proposal", id))?;
        Ok(Proposal::try_from(row)?)
    }

    async fn find_proposals(&self, filter: &ProposalFilter) -> Result<Vec<Proposal>, CrmError> {
        convert_all(proposals::find_proposals(&self.pool, filter).await?)
    }

    async fn insert_proposal(&self, new: NewProposal) -> Result<Proposal, CrmError> {
        let row = proposals::insert_proposal(&self.pool, &new).await?;
        Ok(Proposal::try_from(row)?)
    }

    async fn update_proposal(&self, id: Uuid, patch: ProposalPatch) -> Result<Proposal, CrmError> {
        let row = proposals::update_proposal(&self.pool, id, patch)
            .await
            .map_err(|e| e.into_crm("proposal", id))?;
        Ok(Proposal::try_from(row)?)
    }

    async fn delete_proposal(&self, id: Uuid) -> Result<(), CrmError> {
        proposals::delete_proposal(&self.pool, id)
            .await
            .map_err(|e| e.into_crm("proposal", id))
    }
}

// ---------------------------------------------------------------------------
// Brands
// ---------------------------------------------------------------------------

#[async_trait]
impl BrandStore for PgStore {
    async fn get_brand(&self, id: Uuid) -> Result<Brand, CrmError> {
        let row = brands::get_brand(&self.pool, id)
            .await?
            .ok_or(CrmError::not_found("brand", id))?;
        Ok(Brand::try_from(row)?)
    }

    async fn find_brands(&self, filter: &BrandFilter) -> Result<Vec<Brand>, CrmError> {
        convert_all(brands::find_brands(&self.pool, filter).await?)
    }

    async fn insert_brand(&self, new: NewBrand) -> Result<Brand, CrmError> {
        let row = brands::insert_brand(&self.pool, &new).await?;
        Ok(Brand::try_from(row)?)
    }

    async fn update_brand(&self, id: Uuid, patch: BrandPatch) -> Result<Brand, CrmError> {
        let row = brands::update_brand(&self.pool, id, &patch)
            .await
            .map_err(|e| e.into_crm("brand", id))?;
        Ok(Brand::try_from(row)?)
    }

    async fn delete_brand(&self, id: Uuid) -> Result<(), CrmError> {
        brands::delete_brand(&self.pool, id)
            .await
            .map_err(|e| e.into_crm("brand", id))
    }
}

// ---------------------------------------------------------------------------
// Creators
// ---------------------------------------------------------------------------

#[async_trait]
impl CreatorStore for PgStore {
    async fn get_creator(&self, id: Uuid) -> Result<Creator, CrmError> {
        let row = creators::get_creator(&self.pool, id)
            .await?
            .ok_or(CrmError::not_found("creator", id))?;
        Ok(Creator::try_from(row)?)
    }

    async fn find_creators(&self, filter: &CreatorFilter) -> Result<Vec<Creator>, CrmError> {
        convert_all(creators::find_creators(&self.pool, filter).await?)
    }

    async fn insert_creator(&self, new: NewCreator) -> Result<Creator, CrmError> {
        let row = creators::insert_creator(&self.pool, &new).await?;
        Ok(Creator::try_from(row)?)
    }

    async fn update_creator(&self, id: Uuid, patch: CreatorPatch) -> Result<Creator, CrmError> {
        let row = creators::update_creator(&self.pool, id, patch)
            .await
            .map_err(|e| e.into_crm("creator", id))?;
        Ok(Creator::try_from(row)?)
    }

    async fn delete_creator(&self, id: Uuid) -> Result<(), CrmError> {
        creators::delete_creator(&self.pool, id)
            .await
            .map_err(|e| e.into_crm("creator", id))
    }

    async fn find_creator_platforms(
        &self,
        creator_id: Uuid,
    ) -> Result<Vec<CreatorPlatform>, CrmError> {
        convert_all(creators::find_creator_platforms(&self.pool, creator_id).await?)
    }

    async fn replace_creator_platforms(
        &self,
        creator_id: Uuid,
        platforms: Vec<NewCreatorPlatform>,
    ) -> Result<Vec<CreatorPlatform>, CrmError> {
        convert_all(creators::replace_creator_platforms(&self.pool, creator_id, &platforms).await?)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[async_trait]
impl EventStore for PgStore {
    async fn get_event(&self, id: Uuid) -> Result<Event, CrmError> {
        events::get_event(&self.pool, id)
            .await?
            .map(Event::from)
            .ok_or(CrmError::not_found("event", id))
    }

    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<Event>, CrmError> {
        let rows = events::find_events(&self.pool, filter).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn insert_event(&self, new: NewEvent) -> Result<Event, CrmError> {
        let row = events::insert_event(&self.pool, &new).await?;
        Ok(row.into())
    }

    async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Event, CrmError> {
        events::update_event(&self.pool, id, patch)
            .await
            .map(Event::from)
            .map_err(|e| e.into_crm("event", id))
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), CrmError> {
        events::delete_event(&self.pool, id)
            .await
            .map_err(|e| e.into_crm("event", id))
    }

    async fn get_participation(&self, id: Uuid) -> Result<Participation, CrmError> {
        let row = events::get_participation(&self.pool, id)
            .await?
            .ok_or(CrmError::not_found("participation", id))?;
        Ok(Participation::try_from(row)?)
    }

    async fn find_participations(
        &self,
        filter: &ParticipationFilter,
    ) -> Result<Vec<Participation>, CrmError> {
        convert_all(events::find_participations(&self.pool, filter).await?)
    }

    async fn insert_participation(
        &self,
        event_id: Uuid,
        new: NewParticipation,
    ) -> Result<Participation, CrmError> {
        let row = events::insert_participation(&self.pool, event_id, &new).await?;
        Ok(Participation::try_from(row)?)
    }

    async fn update_participation(
        &self,
        id: Uuid,
        patch: ParticipationPatch,
    ) -> Result<Participation, CrmError> {
        let row = events::update_participation(&self.pool, id, patch)
            .await
            .map_err(|e| e.into_crm("participation", id))?;
        Ok(Participation::try_from(row)?)
    }

    async fn delete_participation(&self, id: Uuid) -> Result<(), CrmError> {
        events::delete_participation(&self.pool, id)
            .await
            .map_err(|e| e.into_crm("participation", id))
    }
}

// ---------------------------------------------------------------------------
// Collaborations
// ---------------------------------------------------------------------------

#[async_trait]
impl CollaborationStore for PgStore {
    async fn get_collaboration(&self, id: Uuid) -> Result<Collaboration, CrmError> {
        let row = collaborations::get_collaboration(&self.pool, id)
            .await?
            .ok_or(CrmError::not_found("collaboration", id))?;
        Ok(Collaboration::try_from(row)?)
    }

    async fn find_collaborations(
        &self,
        filter: &CollaborationFilter,
    ) -> Result<Vec<Collaboration>, CrmError> {
        convert_all(collaborations::find_collaborations(&self.pool, filter).await?)
    }

    async fn insert_collaboration(
        &self,
        new: NewCollaboration,
    ) -> Result<Collaboration, CrmError> {
        let row = collaborations::insert_collaboration(&self.pool, &new).await?;
        Ok(Collaboration::try_from(row)?)
    }

    async fn update_collaboration(
        &self,
        id: Uuid,
        patch: CollaborationPatch,
    ) -> Result<Collaboration, CrmError> {
        let row = collaborations::update_collaboration(&self.pool, id, patch)
            .await
            .map_err(|e| e.into_crm("collaboration", id))?;
        Ok(Collaboration::try_from(row)?)
    }

    async fn delete_collaboration(&self, id: Uuid) -> Result<(), CrmError> {
        collaborations::delete_collaboration(&self.pool, id)
            .await
            .map_err(|e| e.into_crm("collaboration", id))
    }
}

// ---------------------------------------------------------------------------
// Revenue
// ---------------------------------------------------------------------------

#[async_trait]
impl RevenueStore for PgStore {
    async fn get_revenue(&self, id: Uuid) -> Result<RevenueEntry, CrmError> {
        revenue::get_revenue(&self.pool, id)
            .await?
            .map(RevenueEntry::from)
            .ok_or(CrmError::not_found("revenue entry", id))
    }

    async fn find_revenue(&self, filter: &RevenueFilter) -> Result<Vec<RevenueEntry>, CrmError> {
        let rows = revenue::find_revenue(&self.pool, filter).await?;
        Ok(rows.into_iter().map(RevenueEntry::from).collect())
    }

    async fn insert_revenue(&self, new: NewRevenueEntry) -> Result<RevenueEntry, CrmError> {
        let row = revenue::insert_revenue(&self.pool, &new).await?;
        Ok(row.into())
    }

    async fn update_revenue(
        &self,
        id: Uuid,
        patch: RevenuePatch,
    ) -> Result<RevenueEntry, CrmError> {
        revenue::update_revenue(&self.pool, id, &patch)
            .await
            .map(RevenueEntry::from)
            .map_err(|e| e.into_crm("revenue entry", id))
    }

    async fn delete_revenue(&self, id: Uuid) -> Result<(), CrmError> {
        revenue::delete_revenue(&self.pool, id)
            .await
            .map_err(|e| e.into_crm("revenue entry", id))
    }
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[async_trait]
impl PaymentStore for PgStore {
    async fn get_payment(&self, id: Uuid) -> Result<PaymentRecord, CrmError> {
        payments::get_payment(&self.pool, id)
            .await?
            .map(PaymentRecord::from)
            .ok_or(CrmError::not_found("payment", id))
    }

    async fn find_payments(&self, filter: &PaymentFilter) -> Result<Vec<PaymentRecord>, CrmError> {
        let rows = payments::find_payments(&self.pool, filter).await?;
        Ok(rows.into_iter().map(PaymentRecord::from).collect())
    }

    async fn insert_payment(&self, new: NewPayment) -> Result<PaymentRecord, CrmError> {
        let row = payments::insert_payment(&self.pool, &new).await?;
        Ok(row.into())
    }

    async fn update_payment(
        &self,
        id: Uuid,
        patch: PaymentPatch,
    ) -> Result<PaymentRecord, CrmError> {
        payments::update_payment(&self.pool, id, patch)
            .await
            .map(PaymentRecord::from)
            .map_err(|e| e.into_crm("payment", id))
    }

    async fn delete_payment(&self, id: Uuid) -> Result<(), CrmError> {
        payments::delete_payment(&self.pool, id)
            .await
            .map_err(|e| e.into_crm("payment", id))
    }
}

#[async_trait]
impl CrmStore for PgStore {
    async fn health_check(&self) -> Result<(), CrmError> {
        health_check(&self.pool).await?;
        Ok(())
    }
}
