//! Domain model and business rules for the agency CRM.
//!
//! Everything here talks to persistence through the traits in [`store`], so
//! the same rules run against [`InMemoryStore`] in tests and Postgres in
//! production.

pub mod app_config;
pub mod brands;
pub mod collaborations;
pub mod config;
pub mod conversion;
pub mod creators;
pub mod discrepancies;
mod error;
pub mod events;
pub mod ledger;
pub mod memory;
pub mod payments;
pub mod pipeline;
pub mod proposals;
pub mod revenue;
pub mod revenue_sync;
pub mod session;
pub mod store;

pub use app_config::{ApiKeyGrant, AppConfig, Environment};
pub use brands::{Brand, BrandFilter, BrandPatch, BrandStatus, NewBrand};
pub use collaborations::{
    create_collaboration, update_collaboration, Collaboration, CollaborationFilter,
    CollaborationPatch, CollaborationStats, CollaborationStatus, CollaborationUpdate,
    NewCollaboration,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use conversion::{convert_to_brand, Conversion};
pub use creators::{
    create_creator, delete_creator, ensure_creator, fee_fields, save_creator_platforms,
    update_creator, Creator, CreatorFilter, CreatorPatch, CreatorPlatform, FeeField, NewCreator,
    NewCreatorPlatform, Tier, GENERIC_FEE, PLATFORM_FEES,
};
pub use discrepancies::{detect_discrepancies, find_discrepancies, Discrepancy};
pub use error::{ConfigError, CrmError};
pub use events::{
    add_participation, create_event, creator_events, event_detail, update_event, Activity,
    CreatorEvent, Event, EventDetail, EventFilter, EventPatch, NewEvent, NewParticipation,
    Participation, ParticipationFilter, ParticipationPatch, RosterEntry,
};
pub use ledger::{
    delete_revenue, record_manual_revenue, top_creators, CreatorTotal, MonthTotal, MonthlyTotals,
};
pub use memory::InMemoryStore;
pub use payments::{
    record_payment, toggle_payment_verified, NewPayment, PaymentFilter, PaymentPatch,
    PaymentRecord, PaymentStats,
};
pub use pipeline::{move_to_stage, PipelineBoard, PipelineColumn, PipelineStats, StageMove};
pub use proposals::{NewProposal, Priority, Proposal, ProposalFilter, ProposalPatch, ProposalStage};
pub use revenue::{NewRevenueEntry, RevenueEntry, RevenueFilter, RevenuePatch, YearMonth};
pub use revenue_sync::{
    resync_all, sync_from_collaboration, ResyncFailure, ResyncReport, SyncOutcome,
};
pub use session::{CurrentUser, Role};
pub use store::{
    BrandStore, CollaborationStore, CreatorStore, CrmStore, EventStore, PaymentStore,
    ProposalStore, RevenueStore,
};
