//! Creator/brand marketplace: campaigns, creator profiles, scored applications, and
//! partnerships.
//!
//! Services are synchronous over the repository traits and take an explicit
//! [`RequestContext`]. Only the model-backed operations are async. Fit scoring runs off the
//! request path through a [`ScoringScheduler`].

pub mod accounts;
pub mod applications;
pub mod auth;
pub mod campaigns;
pub mod domain;
pub mod error;
pub mod memory;
pub mod model;
pub mod partnerships;
pub mod profiles;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod storage;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::task::JoinHandle;

pub use accounts::AccountService;
pub use applications::{
    ApplicantView, ApplicationService, ApplicationWithCampaign, SubmissionGate,
    SubmissionPayload,
};
pub use auth::RequestContext;
pub use campaigns::{CampaignDraft, CampaignExtraction, CampaignPatch, CampaignService};
pub use error::{Entity, Forbidden, MarketplaceError, Precondition};
pub use memory::MemoryStore;
pub use model::{CannedModel, OpenAiClient, StructuredModel};
pub use partnerships::{NewPartnership, PartnershipDetails, PartnershipService};
pub use profiles::{ProfileInput, ProfileService, ProfileSuggestions, SuggestionRequest};
pub use repository::{MarketplaceStore, RepositoryError};
pub use router::{marketplace_router, IDENTITY_HEADER};
pub use scoring::{ScoringQueue, ScoringScheduler, ScoringWorker};
pub use storage::{MemoryObjectStorage, ObjectStorage};

/// Every marketplace service wired over one store.
pub struct Marketplace<S> {
    pub accounts: AccountService<S>,
    pub campaigns: CampaignService<S>,
    pub profiles: ProfileService<S>,
    pub submissions: SubmissionGate<S>,
    pub applications: ApplicationService<S>,
    pub partnerships: PartnershipService<S>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl<S> Marketplace<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        model: Arc<dyn StructuredModel>,
        storage: Arc<dyn ObjectStorage>,
        scheduler: Arc<dyn ScoringScheduler>,
    ) -> Self {
        Self {
            accounts: AccountService::new(Arc::clone(&store)),
            campaigns: CampaignService::new(Arc::clone(&store), Arc::clone(&model)),
            profiles: ProfileService::new(Arc::clone(&store), model),
            submissions: SubmissionGate::new(Arc::clone(&store), Arc::clone(&storage), scheduler),
            applications: ApplicationService::new(Arc::clone(&store), Arc::clone(&storage)),
            partnerships: PartnershipService::new(store),
            storage,
        }
    }

    /// Wire the services with an in-process [`ScoringQueue`] sharing the same store and model.
    ///
    /// Must be called from within a tokio runtime; the returned handle is the queue dispatcher.
    pub fn with_scoring_queue(
        store: Arc<S>,
        model: Arc<dyn StructuredModel>,
        storage: Arc<dyn ObjectStorage>,
    ) -> (Self, JoinHandle<()>) {
        let worker = Arc::new(ScoringWorker::new(Arc::clone(&store), Arc::clone(&model)));
        let (queue, dispatcher) = ScoringQueue::start(worker);
        let marketplace = Self::new(store, model, storage, Arc::new(queue));
        (marketplace, dispatcher)
    }
}
