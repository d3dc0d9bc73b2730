use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::marketplace::auth::{require_role, RequestContext};
use crate::marketplace::domain::{
    now_millis, AccountRole, Application, ApplicationId, ApplicationStatus, CampaignId,
    CampaignStatus, UploadedFile,
};
use crate::marketplace::error::{Entity, Forbidden, MarketplaceError, Precondition};
use crate::marketplace::repository::{MarketplaceStore, RepositoryError};
use crate::marketplace::scoring::ScoringScheduler;
use crate::marketplace::storage::ObjectStorage;

/// Submission content as sent by a creator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub uploaded_files: Option<Vec<UploadedFile>>,
}

/// Validates a creator's submission, inserts the application, and schedules scoring.
///
/// Checks run in a fixed order and all of them happen before the single insert:
/// creator role, complete profile, no earlier application, campaign exists and is
/// active, and finally submission content. Uploaded files must reference blobs the
/// object storage actually holds.
pub struct SubmissionGate<S> {
    store: Arc<S>,
    storage: Arc<dyn ObjectStorage>,
    scheduler: Arc<dyn ScoringScheduler>,
}

impl<S> SubmissionGate<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        storage: Arc<dyn ObjectStorage>,
        scheduler: Arc<dyn ScoringScheduler>,
    ) -> Self {
        Self {
            store,
            storage,
            scheduler,
        }
    }

    pub fn submit(
        &self,
        ctx: &RequestContext,
        campaign_id: &CampaignId,
        payload: SubmissionPayload,
    ) -> Result<Application, MarketplaceError> {
        let creator = require_role(
            self.store.as_ref(),
            ctx,
            AccountRole::Creator,
            Forbidden::CreatorsApplyOnly,
        )?;

        let profile = self
            .store
            .profile_for_user(&creator)?
            .filter(|profile| profile.is_complete)
            .ok_or(Precondition::IncompleteProfile)?;

        if self
            .store
            .find_application(campaign_id, &creator)?
            .is_some()
        {
            return Err(Precondition::AlreadyApplied.into());
        }

        let campaign = self
            .store
            .fetch_campaign(campaign_id)?
            .ok_or(MarketplaceError::NotFound(Entity::Campaign))?;
        if campaign.status != CampaignStatus::Active {
            return Err(Precondition::CampaignNotAccepting.into());
        }

        let (video_url, uploaded_files) = normalize_content(payload)?;
        for file in uploaded_files.iter().flatten() {
            if self.storage.url_for(&file.storage_id)?.is_none() {
                return Err(Precondition::UnknownUpload.into());
            }
        }

        let application = Application {
            id: ApplicationId::generate(),
            campaign_id: campaign.id.clone(),
            creator_id: creator.clone(),
            creator_profile_id: profile.id.clone(),
            status: ApplicationStatus::Pending,
            video_url,
            uploaded_files,
            fit_score: None,
            fit_reasoning: None,
            applied_at: now_millis(),
        };

        // The store's (campaign, creator) index catches a submission racing past the check above.
        let stored = self
            .store
            .insert_application(application)
            .map_err(|err| match err {
                RepositoryError::Conflict => MarketplaceError::from(Precondition::AlreadyApplied),
                other => other.into(),
            })?;

        info!(
            application_id = %stored.id,
            campaign_id = %stored.campaign_id,
            creator_id = %stored.creator_id,
            has_video = stored.video_url.is_some(),
            file_count = stored.uploaded_files.as_ref().map_or(0, Vec::len),
            "application submitted"
        );
        self.scheduler.schedule(stored.id.clone());

        Ok(stored)
    }
}

/// Blank URLs and empty file lists count as absent; at least one kind of content must remain.
fn normalize_content(
    payload: SubmissionPayload,
) -> Result<(Option<String>, Option<Vec<UploadedFile>>), Precondition> {
    let video_url = payload
        .video_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    let uploaded_files = payload.uploaded_files.filter(|files| !files.is_empty());

    if video_url.is_none() && uploaded_files.is_none() {
        return Err(Precondition::MissingSubmission);
    }

    if let Some(url) = video_url.as_deref() {
        if !is_web_url(url) {
            return Err(Precondition::InvalidVideoUrl);
        }
    }

    Ok((video_url, uploaded_files))
}

fn is_web_url(candidate: &str) -> bool {
    reqwest::Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}
