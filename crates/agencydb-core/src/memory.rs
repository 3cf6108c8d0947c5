//! In-process store used by tests and the server's router tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
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
use crate::proposals::{NewProposal, Proposal, ProposalFilter, ProposalPatch, ProposalStage};
use crate::revenue::{NewRevenueEntry, RevenueEntry, RevenueFilter, RevenuePatch};
use crate::store::{
    BrandStore, CollaborationStore, CreatorStore, CrmStore, EventStore, PaymentStore,
    ProposalStore, RevenueStore,
};
use crate::CrmError;

/// Every table behind its own `RwLock`. Each call takes one lock, so
/// multi-step operations interleave exactly as they would against a database.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    proposals: RwLock<HashMap<Uuid, Proposal>>,
    brands: RwLock<HashMap<Uuid, Brand>>,
    creators: RwLock<HashMap<Uuid, Creator>>,
    /// Keyed by creator, in insertion order.
    creator_platforms: RwLock<HashMap<Uuid, Vec<CreatorPlatform>>>,
    events: RwLock<HashMap<Uuid, Event>>,
    participations: RwLock<HashMap<Uuid, Participation>>,
    collaborations: RwLock<HashMap<Uuid, Collaboration>>,
    revenue: RwLock<HashMap<Uuid, RevenueEntry>>,
    payments: RwLock<HashMap<Uuid, PaymentRecord>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn remove_or_not_found<T>(
    table: &mut HashMap<Uuid, T>,
    entity: &'static str,
    id: Uuid,
) -> Result<(), CrmError> {
    table
        .remove(&id)
        .map(|_| ())
        .ok_or(CrmError::not_found(entity, id))
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

#[async_trait]
impl ProposalStore for InMemoryStore {
    async fn get_proposal(&self, id: Uuid) -> Result<Proposal, CrmError> {
        self.proposals
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CrmError::not_found("proposal", id))
    }

    async fn find_proposals(&self, filter: &ProposalFilter) -> Result<Vec<Proposal>, CrmError> {
        let mut found: Vec<Proposal> = self
            .proposals
            .read()
            .await
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn insert_proposal(&self, new: NewProposal) -> Result<Proposal, CrmError> {
        let now = Utc::now();
        let proposal = Proposal {
            id: Uuid::new_v4(),
            brand_name: new.brand_name,
            sector: new.sector,
            target_demographic: new.target_demographic,
            contact_email: new.contact_email,
            phone: new.phone,
            website: new.website,
            agent: new.agent,
            priority: new.priority,
            notes: new.notes,
            suggested_creators: new.suggested_creators,
            referrer: new.referrer,
            contact_date: new.contact_date,
            last_action_date: new.last_action_date,
            stage: new.stage.unwrap_or(ProposalStage::ToContact),
            linked_brand_id: None,
            created_at: now,
            updated_at: now,
        };
        self.proposals
            .write()
            .await
            .insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    async fn update_proposal(&self, id: Uuid, patch: ProposalPatch) -> Result<Proposal, CrmError> {
        let mut table = self.proposals.write().await;
        let proposal = table
            .get_mut(&id)
            .ok_or(CrmError::not_found("proposal", id))?;
        patch.apply(proposal);
        proposal.updated_at = Utc::now();
        Ok(proposal.clone())
    }

    async fn delete_proposal(&self, id: Uuid) -> Result<(), CrmError> {
        remove_or_not_found(&mut *self.proposals.write().await, "proposal", id)
    }
}

// ---------------------------------------------------------------------------
// Brands
// ---------------------------------------------------------------------------

#[async_trait]
impl BrandStore for InMemoryStore {
    async fn get_brand(&self, id: Uuid) -> Result<Brand, CrmError> {
        self.brands
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CrmError::not_found("brand", id))
    }

    async fn find_brands(&self, filter: &BrandFilter) -> Result<Vec<Brand>, CrmError> {
        let mut found: Vec<Brand> = self
            .brands
            .read()
            .await
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(found)
    }

    async fn insert_brand(&self, new: NewBrand) -> Result<Brand, CrmError> {
        let now = Utc::now();
        let brand = Brand {
            id: Uuid::new_v4(),
            name: new.name,
            sector: new.sector,
            target_demographic: new.target_demographic,
            contact_email: new.contact_email,
            phone: new.phone,
            website: new.website,
            agent: new.agent,
            priority: new.priority,
            notes: new.notes,
            suggested_creators: new.suggested_creators,
            referrer: new.referrer,
            contact_date: new.contact_date,
            status: new.status,
            origin_proposal_id: new.origin_proposal_id,
            created_at: now,
            updated_at: now,
        };
        self.brands.write().await.insert(brand.id, brand.clone());
        Ok(brand)
    }

    async fn update_brand(&self, id: Uuid, patch: BrandPatch) -> Result<Brand, CrmError> {
        let mut table = self.brands.write().await;
        let brand = table.get_mut(&id).ok_or(CrmError::not_found("brand", id))?;
        patch.apply(brand);
        brand.updated_at = Utc::now();
        Ok(brand.clone())
    }

    async fn delete_brand(&self, id: Uuid) -> Result<(), CrmError> {
        remove_or_not_found(&mut *self.brands.write().await, "brand", id)
    }
}

// ---------------------------------------------------------------------------
// Creators
// ---------------------------------------------------------------------------

#[async_trait]
impl CreatorStore for InMemoryStore {
    async fn get_creator(&self, id: Uuid) -> Result<Creator, CrmError> {
        self.creators
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CrmError::not_found("creator", id))
    }

    async fn find_creators(&self, filter: &CreatorFilter) -> Result<Vec<Creator>, CrmError> {
        let mut found: Vec<Creator> = self
            .creators
            .read()
            .await
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn insert_creator(&self, new: NewCreator) -> Result<Creator, CrmError> {
        let now = Utc::now();
        let creator = Creator {
            id: Uuid::new_v4(),
            name: new.name,
            full_name: new.full_name,
            status: new.status,
            tier: new.tier,
            topic: new.topic,
            email: new.email,
            phone: new.phone,
            agent: new.agent,
            contract_type: new.contract_type,
            commission_pct: new.commission_pct,
            collaboration_start: new.collaboration_start,
            contract_signed_date: new.contract_signed_date,
            contract_end: new.contract_end,
            media_kit: new.media_kit,
            media_kit_updated: new.media_kit_updated,
            adv_category: new.adv_category,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        self.creators
            .write()
            .await
            .insert(creator.id, creator.clone());
        Ok(creator)
    }

    async fn update_creator(&self, id: Uuid, patch: CreatorPatch) -> Result<Creator, CrmError> {
        let mut table = self.creators.write().await;
        let creator = table.get_mut(&id).ok_or(CrmError::not_found("creator", id))?;
        patch.apply(creator);
        creator.updated_at = Utc::now();
        Ok(creator.clone())
    }

    async fn delete_creator(&self, id: Uuid) -> Result<(), CrmError> {
        remove_or_not_found(&mut *self.creators.write().await, "creator", id)?;
        self.creator_platforms.write().await.remove(&id);
        self.participations
            .write()
            .await
            .retain(|_, p| p.creator_id != id);
        Ok(())
    }

    async fn find_creator_platforms(
        &self,
        creator_id: Uuid,
    ) -> Result<Vec<CreatorPlatform>, CrmError> {
        Ok(self
            .creator_platforms
            .read()
            .await
            .get(&creator_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_creator_platforms(
        &self,
        creator_id: Uuid,
        platforms: Vec<NewCreatorPlatform>,
    ) -> Result<Vec<CreatorPlatform>, CrmError> {
        let now = Utc::now();
        let saved: Vec<CreatorPlatform> = platforms
            .into_iter()
            .map(|p| CreatorPlatform {
                id: Uuid::new_v4(),
                creator_id,
                platform: p.platform,
                tier: p.tier,
                fees: p.fees,
                notes: p.notes,
                created_at: now,
            })
            .collect();
        self.creator_platforms
            .write()
            .await
            .insert(creator_id, saved.clone());
        Ok(saved)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[async_trait]
impl EventStore for InMemoryStore {
    async fn get_event(&self, id: Uuid) -> Result<Event, CrmError> {
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CrmError::not_found("event", id))
    }

    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<Event>, CrmError> {
        let mut found: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        // Latest start first, undated last.
        found.sort_by(|a, b| {
            a.start_date
                .is_none()
                .cmp(&b.start_date.is_none())
                .then(b.start_date.cmp(&a.start_date))
                .then(b.created_at.cmp(&a.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn insert_event(&self, new: NewEvent) -> Result<Event, CrmError> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: new.name,
            kind: new.kind,
            start_date: new.start_date,
            end_date: new.end_date,
            location: new.location,
            city: new.city,
            description: new.description,
            link: new.link,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        self.events.write().await.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Event, CrmError> {
        let mut table = self.events.write().await;
        let event = table.get_mut(&id).ok_or(CrmError::not_found("event", id))?;
        patch.apply(event);
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), CrmError> {
        remove_or_not_found(&mut *self.events.write().await, "event", id)?;
        self.participations
            .write()
            .await
            .retain(|_, p| p.event_id != id);
        Ok(())
    }

    async fn get_participation(&self, id: Uuid) -> Result<Participation, CrmError> {
        self.participations
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CrmError::not_found("participation", id))
    }

    async fn find_participations(
        &self,
        filter: &ParticipationFilter,
    ) -> Result<Vec<Participation>, CrmError> {
        let mut found: Vec<Participation> = self
            .participations
            .read()
            .await
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn insert_participation(
        &self,
        event_id: Uuid,
        new: NewParticipation,
    ) -> Result<Participation, CrmError> {
        let mut table = self.participations.write().await;
        if table
            .values()
            .any(|p| p.event_id == event_id && p.creator_id == new.creator_id)
        {
            return Err(CrmError::Conflict(format!(
                "creator {} already takes part in event {event_id}",
                new.creator_id
            )));
        }
        let now = Utc::now();
        let participation = Participation {
            id: Uuid::new_v4(),
            event_id,
            creator_id: new.creator_id,
            contract_type: new.contract_type,
            activities: new.activities,
            fee: new.fee,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        table.insert(participation.id, participation.clone());
        Ok(participation)
    }

    async fn update_participation(
        &self,
        id: Uuid,
        patch: ParticipationPatch,
    ) -> Result<Participation, CrmError> {
        let mut table = self.participations.write().await;
        let participation = table
            .get_mut(&id)
            .ok_or(CrmError::not_found("participation", id))?;
        patch.apply(participation);
        participation.updated_at = Utc::now();
        Ok(participation.clone())
    }

    async fn delete_participation(&self, id: Uuid) -> Result<(), CrmError> {
        remove_or_not_found(&mut *self.participations.write().await, "participation", id)
    }
}

// ---------------------------------------------------------------------------
// Collaborations
// ---------------------------------------------------------------------------

#[async_trait]
impl CollaborationStore for InMemoryStore {
    async fn get_collaboration(&self, id: Uuid) -> Result<Collaboration, CrmError> {
        self.collaborations
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CrmError::not_found("collaboration", id))
    }

    async fn find_collaborations(
        &self,
        filter: &CollaborationFilter,
    ) -> Result<Vec<Collaboration>, CrmError> {
        let mut found: Vec<Collaboration> = self
            .collaborations
            .read()
            .await
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn insert_collaboration(
        &self,
        new: NewCollaboration,
    ) -> Result<Collaboration, CrmError> {
        let now = Utc::now();
        let collaboration = Collaboration {
            id: Uuid::new_v4(),
            creator_id: new.creator_id,
            brand_name: new.brand_name,
            status: new.status,
            is_paid: new.is_paid,
            payment_amount: new.payment_amount,
            management_fee: new.management_fee,
            contract_signed_date: new.contract_signed_date,
            publication_date: new.publication_date,
            agent: new.agent,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        self.collaborations
            .write()
            .await
            .insert(collaboration.id, collaboration.clone());
        Ok(collaboration)
    }

    async fn update_collaboration(
        &self,
        id: Uuid,
        patch: CollaborationPatch,
    ) -> Result<Collaboration, CrmError> {
        let mut table = self.collaborations.write().await;
        let collaboration = table
            .get_mut(&id)
            .ok_or(CrmError::not_found("collaboration", id))?;
        patch.apply(collaboration);
        collaboration.updated_at = Utc::now();
        Ok(collaboration.clone())
    }

    /// Drops the collaboration's synced revenue row with it.
    async fn delete_collaboration(&self, id: Uuid) -> Result<(), CrmError> {
        remove_or_not_found(&mut *self.collaborations.write().await, "collaboration", id)?;
        self.revenue
            .write()
            .await
            .retain(|_, entry| entry.source_collaboration_id != Some(id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Revenue
// ---------------------------------------------------------------------------

#[async_trait]
impl RevenueStore for InMemoryStore {
    async fn get_revenue(&self, id: Uuid) -> Result<RevenueEntry, CrmError> {
        self.revenue
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CrmError::not_found("revenue entry", id))
    }

    async fn find_revenue(&self, filter: &RevenueFilter) -> Result<Vec<RevenueEntry>, CrmError> {
        let mut found: Vec<RevenueEntry> = self
            .revenue
            .read()
            .await
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.month
                .cmp(&b.month)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn insert_revenue(&self, new: NewRevenueEntry) -> Result<RevenueEntry, CrmError> {
        let now = Utc::now();
        let entry = RevenueEntry {
            id: Uuid::new_v4(),
            creator_id: new.creator_id,
            month: new.month,
            amount: new.amount,
            invoiced: new.invoiced,
            notes: new.notes,
            source_collaboration_id: new.source_collaboration_id,
            created_at: now,
            updated_at: now,
        };
        self.revenue.write().await.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_revenue(
        &self,
        id: Uuid,
        patch: RevenuePatch,
    ) -> Result<RevenueEntry, CrmError> {
        let mut table = self.revenue.write().await;
        let entry = table
            .get_mut(&id)
            .ok_or(CrmError::not_found("revenue entry", id))?;
        patch.apply(entry);
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_revenue(&self, id: Uuid) -> Result<(), CrmError> {
        remove_or_not_found(&mut *self.revenue.write().await, "revenue entry", id)
    }
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn get_payment(&self, id: Uuid) -> Result<PaymentRecord, CrmError> {
        self.payments
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CrmError::not_found("payment", id))
    }

    async fn find_payments(&self, filter: &PaymentFilter) -> Result<Vec<PaymentRecord>, CrmError> {
        let mut found: Vec<PaymentRecord> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.month
                .cmp(&a.month)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn insert_payment(&self, new: NewPayment) -> Result<PaymentRecord, CrmError> {
        let now = Utc::now();
        let payment = PaymentRecord {
            id: Uuid::new_v4(),
            creator_id: new.creator_id,
            month: new.month,
            payment_type: new.payment_type,
            amount_paid: new.amount_paid,
            invoice_number: new.invoice_number,
            invoice_date: new.invoice_date,
            invoice_link: new.invoice_link,
            verified: new.verified,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        self.payments
            .write()
            .await
            .insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn update_payment(
        &self,
        id: Uuid,
        patch: PaymentPatch,
    ) -> Result<PaymentRecord, CrmError> {
        let mut table = self.payments.write().await;
        let payment = table
            .get_mut(&id)
            .ok_or(CrmError::not_found("payment", id))?;
        if let Some(verified) = patch.verified {
            payment.verified = verified;
        }
        payment.updated_at = Utc::now();
        Ok(payment.clone())
    }

    async fn delete_payment(&self, id: Uuid) -> Result<(), CrmError> {
        remove_or_not_found(&mut *self.payments.write().await, "payment", id)
    }
}

#[async_trait]
impl CrmStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), CrmError> {
        Ok(())
    }
}
