use std::sync::Arc;

use tracing::{debug, info};

use super::prompt::render_prompt;
use super::result::FitScoreResult;
use crate::marketplace::domain::{Application, ApplicationId, Campaign, CreatorProfile};
use crate::marketplace::error::Entity;
use crate::marketplace::model::{generate, AgentProfile, ModelError, StructuredModel};
use crate::marketplace::repository::{MarketplaceStore, RepositoryError};

pub const FIT_SCORING_AGENT: AgentProfile = AgentProfile {
    name: "Application Fit Scorer",
    instructions: "You are a partnership analyst who evaluates creator-brand collaborations.\n\
\n\
Judge how well a creator's profile and submission fit a company's campaign requirements. Weigh:\n\
1. Relevance of the creator's niche and content to the campaign goals.\n\
2. Audience match with the campaign's target market.\n\
3. Relevant past work or collaborations.\n\
4. Professionalism and care in the submission.\n\
5. Genuine interest in the partnership.\n\
6. The unique value the creator brings.\n\
\n\
Scoring guidelines:\n\
- 90-100: perfect fit, highly recommended\n\
- 75-89: excellent fit, strong candidate\n\
- 60-74: good fit, worth considering\n\
- 45-59: moderate fit, potential with concerns\n\
- 30-44: poor fit, significant misalignment\n\
- 0-29: not suitable for this campaign\n\
\n\
Be fair, objective, and constructive.",
};

/// Everything the scorer reads, loaded once per job.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSnapshot {
    pub application: Application,
    pub campaign: Campaign,
    pub profile: CreatorProfile,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("{0} missing while loading scoring snapshot")]
    MissingRecord(Entity),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Scores one application per call and persists the result onto it.
pub struct ScoringWorker<S> {
    store: Arc<S>,
    model: Arc<dyn StructuredModel>,
}

impl<S> ScoringWorker<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, model: Arc<dyn StructuredModel>) -> Self {
        Self { store, model }
    }

    pub fn load_snapshot(&self, id: &ApplicationId) -> Result<ScoringSnapshot, ScoringError> {
        let application = self
            .store
            .fetch_application(id)?
            .ok_or(ScoringError::MissingRecord(Entity::Application))?;
        let campaign = self
            .store
            .fetch_campaign(&application.campaign_id)?
            .ok_or(ScoringError::MissingRecord(Entity::Campaign))?;
        let profile = self
            .store
            .fetch_profile(&application.creator_profile_id)?
            .ok_or(ScoringError::MissingRecord(Entity::Profile))?;

        Ok(ScoringSnapshot {
            application,
            campaign,
            profile,
        })
    }

    /// Load, score, and persist. Nothing is written unless the model output validates.
    pub async fn score(&self, id: &ApplicationId) -> Result<FitScoreResult, ScoringError> {
        let snapshot = self.load_snapshot(id)?;
        let prompt = render_prompt(&snapshot);
        debug!(application_id = %id, prompt_chars = prompt.len(), "scoring application");

        let result: FitScoreResult =
            generate(self.model.as_ref(), &FIT_SCORING_AGENT, &prompt, Some(id.as_str())).await?;

        self.store
            .record_fit_score(id, result.score, result.compose_reasoning())?;
        info!(
            application_id = %id,
            score = result.score,
            recommendation = result.recommendation.label(),
            "fit score recorded"
        );

        Ok(result)
    }
}
