use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::worker::ScoringWorker;
use crate::marketplace::domain::ApplicationId;
use crate::marketplace::repository::MarketplaceStore;

/// Accepts scoring jobs without blocking the caller or reporting their outcome.
pub trait ScoringScheduler: Send + Sync {
    fn schedule(&self, application: ApplicationId);
}

/// Unbounded in-process queue. Every job runs on its own task, at most once.
#[derive(Clone)]
pub struct ScoringQueue {
    sender: mpsc::UnboundedSender<ApplicationId>,
}

impl ScoringQueue {
    /// Spawn the dispatcher. Must be called from within a tokio runtime.
    ///
    /// The dispatcher stops once every queue handle has been dropped.
    pub fn start<S>(worker: Arc<ScoringWorker<S>>) -> (Self, JoinHandle<()>)
    where
        S: MarketplaceStore + 'static,
    {
        let (sender, mut receiver) = mpsc::unbounded_channel::<ApplicationId>();

        let dispatcher = tokio::spawn(async move {
            while let Some(application_id) = receiver.recv().await {
                let worker = Arc::clone(&worker);
                tokio::spawn(async move {
                    if let Err(err) = worker.score(&application_id).await {
                        warn!(
                            application_id = %application_id,
                            error = %err,
                            "fit scoring failed; application left unscored"
                        );
                    }
                });
            }
            debug!("scoring queue drained");
        });

        (Self { sender }, dispatcher)
    }
}

impl ScoringScheduler for ScoringQueue {
    fn schedule(&self, application: ApplicationId) {
        debug!(application_id = %application, "scoring job queued");
        if let Err(rejected) = self.sender.send(application) {
            warn!(application_id = %rejected.0, "scoring queue closed; job dropped");
        }
    }
}
