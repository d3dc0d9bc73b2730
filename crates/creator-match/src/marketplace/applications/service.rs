use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::ranking::rank_for_review;
use crate::marketplace::auth::{require_campaign_owner, RequestContext};
use crate::marketplace::domain::{
    Application, ApplicationId, ApplicationStatus, Campaign, CampaignId, CreatorProfile,
    StorageId, UserAccount,
};
use crate::marketplace::error::{Entity, MarketplaceError};
use crate::marketplace::partnerships::ensure_partnership;
use crate::marketplace::repository::MarketplaceStore;
use crate::marketplace::storage::{ObjectStorage, UploadTicket};

/// A creator's application alongside the campaign it targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithCampaign {
    #[serde(flatten)]
    pub application: Application,
    pub campaign: Option<Campaign>,
}

/// An applicant as seen by the campaign owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantView {
    #[serde(flatten)]
    pub application: Application,
    pub profile: Option<CreatorProfile>,
    pub creator: Option<UserAccount>,
}

impl AsRef<Application> for ApplicantView {
    fn as_ref(&self) -> &Application {
        &self.application
    }
}

/// Read paths and review actions over submitted applications.
pub struct ApplicationService<S> {
    store: Arc<S>,
    storage: Arc<dyn ObjectStorage>,
}

impl<S> ApplicationService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { store, storage }
    }

    pub fn get_by_creator(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ApplicationWithCampaign>, MarketplaceError> {
        let Some(user) = ctx.identity() else {
            return Ok(Vec::new());
        };

        self.store
            .applications_for_creator(user)?
            .into_iter()
            .map(|application| -> Result<_, MarketplaceError> {
                let campaign = self.store.fetch_campaign(&application.campaign_id)?;
                Ok(ApplicationWithCampaign {
                    application,
                    campaign,
                })
            })
            .collect()
    }

    pub fn get_by_campaign(
        &self,
        ctx: &RequestContext,
        campaign_id: &CampaignId,
    ) -> Result<Vec<ApplicantView>, MarketplaceError> {
        let user = ctx.require_identity()?;
        require_campaign_owner(self.store.as_ref(), user, campaign_id, "view applicants")?;

        self.store
            .applications_for_campaign(campaign_id)?
            .into_iter()
            .map(|application| self.applicant(application))
            .collect()
    }

    /// Applicants in review order, best fit first.
    pub fn get_ranked_by_campaign(
        &self,
        ctx: &RequestContext,
        campaign_id: &CampaignId,
    ) -> Result<Vec<ApplicantView>, MarketplaceError> {
        let mut applicants = self.get_by_campaign(ctx, campaign_id)?;
        rank_for_review(&mut applicants);
        Ok(applicants)
    }

    pub fn has_applied(
        &self,
        ctx: &RequestContext,
        campaign_id: &CampaignId,
    ) -> Result<bool, MarketplaceError> {
        Ok(self.get_application(ctx, campaign_id)?.is_some())
    }

    pub fn get_application(
        &self,
        ctx: &RequestContext,
        campaign_id: &CampaignId,
    ) -> Result<Option<Application>, MarketplaceError> {
        match ctx.identity() {
            Some(user) => Ok(self.store.find_application(campaign_id, user)?),
            None => Ok(None),
        }
    }

    /// Set the review status; selecting an application also forms its partnership.
    pub fn update_status(
        &self,
        ctx: &RequestContext,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), MarketplaceError> {
        let user = ctx.require_identity()?;
        let application = self
            .store
            .fetch_application(application_id)?
            .ok_or(MarketplaceError::NotFound(Entity::Application))?;
        require_campaign_owner(
            self.store.as_ref(),
            user,
            &application.campaign_id,
            "update this application",
        )?;

        self.store.set_application_status(application_id, status)?;
        info!(
            application_id = %application_id,
            status = status.label(),
            "application status updated"
        );

        if status == ApplicationStatus::Selected {
            ensure_partnership(
                self.store.as_ref(),
                &application.campaign_id,
                &application.creator_id,
                application_id,
            )?;
        }

        Ok(())
    }

    pub fn generate_upload_url(
        &self,
        ctx: &RequestContext,
    ) -> Result<UploadTicket, MarketplaceError> {
        ctx.require_identity()?;
        Ok(self.storage.generate_upload_url()?)
    }

    pub fn file_url(&self, storage_id: &StorageId) -> Result<Option<String>, MarketplaceError> {
        Ok(self.storage.url_for(storage_id)?)
    }

    fn applicant(&self, application: Application) -> Result<ApplicantView, MarketplaceError> {
        let profile = self.store.fetch_profile(&application.creator_profile_id)?;
        let creator = self.store.fetch_user(&application.creator_id)?;
        Ok(ApplicantView {
            application,
            profile,
            creator,
        })
    }
}
