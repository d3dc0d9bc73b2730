use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::auth::{require_campaign_owner, RequestContext};
use super::domain::{
    now_millis, Application, ApplicationId, ApplicationStatus, Campaign, CampaignId,
    CreatorProfile, Partnership, PartnershipId, PartnershipStatus, UserAccount, UserId,
};
use super::error::{Entity, Forbidden, MarketplaceError, Precondition};
use super::repository::{MarketplaceStore, PartnershipRepository, RepositoryError};

/// Manual partnership request from a campaign owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPartnership {
    pub campaign_id: CampaignId,
    pub application_id: ApplicationId,
}

/// A partnership with the records a reviewer needs next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnershipDetails {
    #[serde(flatten)]
    pub partnership: Partnership,
    pub creator: Option<UserAccount>,
    pub application: Option<Application>,
    pub profile: Option<CreatorProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<Campaign>,
}

/// Insert a pending partnership for an application unless one already exists.
pub(crate) fn ensure_partnership<R>(
    store: &R,
    campaign_id: &CampaignId,
    creator_id: &UserId,
    application_id: &ApplicationId,
) -> Result<PartnershipId, RepositoryError>
where
    R: PartnershipRepository + ?Sized,
{
    if let Some(existing) = store.partnership_for_application(application_id)? {
        debug!(partnership_id = %existing.id, application_id = %application_id, "partnership already exists");
        return Ok(existing.id);
    }

    let partnership = Partnership {
        id: PartnershipId::generate(),
        campaign_id: campaign_id.clone(),
        creator_id: creator_id.clone(),
        application_id: application_id.clone(),
        status: PartnershipStatus::Pending,
        created_at: now_millis(),
    };

    match store.insert_partnership(partnership) {
        Ok(stored) => {
            info!(partnership_id = %stored.id, application_id = %application_id, "partnership created");
            Ok(stored.id)
        }
        // Lost a race with another selection of the same application.
        Err(RepositoryError::Conflict) => store
            .partnership_for_application(application_id)?
            .map(|existing| existing.id)
            .ok_or(RepositoryError::Conflict),
        Err(other) => Err(other),
    }
}

pub struct PartnershipService<S> {
    store: Arc<S>,
}

impl<S> PartnershipService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Idempotent creation used when an application is selected.
    pub fn create_for_selected(
        &self,
        campaign_id: &CampaignId,
        creator_id: &UserId,
        application_id: &ApplicationId,
    ) -> Result<PartnershipId, MarketplaceError> {
        Ok(ensure_partnership(
            self.store.as_ref(),
            campaign_id,
            creator_id,
            application_id,
        )?)
    }

    pub fn create(
        &self,
        ctx: &RequestContext,
        request: NewPartnership,
    ) -> Result<Partnership, MarketplaceError> {
        let user = ctx.require_identity()?;
        let campaign = require_campaign_owner(
            self.store.as_ref(),
            user,
            &request.campaign_id,
            "create partnerships for this campaign",
        )?;

        let application = self
            .store
            .fetch_application(&request.application_id)?
            .filter(|application| application.campaign_id == campaign.id)
            .ok_or(MarketplaceError::NotFound(Entity::Application))?;
        if application.status != ApplicationStatus::Selected {
            return Err(Precondition::ApplicationNotSelected.into());
        }
        if self
            .store
            .partnership_for_application(&application.id)?
            .is_some()
        {
            return Err(Precondition::PartnershipExists.into());
        }

        let partnership = Partnership {
            id: PartnershipId::generate(),
            campaign_id: campaign.id,
            creator_id: application.creator_id,
            application_id: application.id,
            status: PartnershipStatus::Pending,
            created_at: now_millis(),
        };

        let stored = self
            .store
            .insert_partnership(partnership)
            .map_err(|err| match err {
                RepositoryError::Conflict => Precondition::PartnershipExists.into(),
                other => MarketplaceError::from(other),
            })?;
        info!(partnership_id = %stored.id, campaign_id = %stored.campaign_id, "partnership created manually");
        Ok(stored)
    }

    /// Partnerships of an owned campaign, newest first.
    pub fn get_by_campaign(
        &self,
        ctx: &RequestContext,
        campaign_id: &CampaignId,
    ) -> Result<Vec<PartnershipDetails>, MarketplaceError> {
        let user = ctx.require_identity()?;
        require_campaign_owner(
            self.store.as_ref(),
            user,
            campaign_id,
            "view partnerships for this campaign",
        )?;

        let mut details = self
            .store
            .partnerships_for_campaign(campaign_id)?
            .into_iter()
            .map(|partnership| self.details(partnership, None))
            .collect::<Result<Vec<_>, _>>()?;
        details.sort_by(|a, b| b.partnership.created_at.cmp(&a.partnership.created_at));
        Ok(details)
    }

    /// Visible to the campaign owner and the partnered creator.
    pub fn get(
        &self,
        ctx: &RequestContext,
        id: &PartnershipId,
    ) -> Result<Option<PartnershipDetails>, MarketplaceError> {
        let user = ctx.require_identity()?;
        let Some(partnership) = self.store.fetch_partnership(id)? else {
            return Ok(None);
        };

        let campaign = self
            .store
            .fetch_campaign(&partnership.campaign_id)?
            .ok_or(MarketplaceError::NotFound(Entity::Campaign))?;
        if &campaign.company_id != user && &partnership.creator_id != user {
            return Err(Forbidden::NotOwner("view this partnership").into());
        }

        self.details(partnership, Some(campaign)).map(Some)
    }

    pub fn update_status(
        &self,
        ctx: &RequestContext,
        id: &PartnershipId,
        status: PartnershipStatus,
    ) -> Result<(), MarketplaceError> {
        let user = ctx.require_identity()?;
        let partnership = self
            .store
            .fetch_partnership(id)?
            .ok_or(MarketplaceError::NotFound(Entity::Partnership))?;

        let owned = self
            .store
            .fetch_campaign(&partnership.campaign_id)?
            .is_some_and(|campaign| &campaign.company_id == user);
        if !owned {
            return Err(Forbidden::NotOwner("update this partnership").into());
        }

        self.store.set_partnership_status(id, status)?;
        info!(partnership_id = %id, status = status.label(), "partnership status updated");
        Ok(())
    }

    /// Zero for anonymous callers and for anyone but the campaign owner.
    pub fn count_by_campaign(
        &self,
        ctx: &RequestContext,
        campaign_id: &CampaignId,
    ) -> Result<usize, MarketplaceError> {
        let Some(user) = ctx.identity() else {
            return Ok(0);
        };
        let owned = self
            .store
            .fetch_campaign(campaign_id)?
            .is_some_and(|campaign| &campaign.company_id == user);
        if !owned {
            return Ok(0);
        }

        Ok(self.store.partnerships_for_campaign(campaign_id)?.len())
    }

    fn details(
        &self,
        partnership: Partnership,
        campaign: Option<Campaign>,
    ) -> Result<PartnershipDetails, MarketplaceError> {
        let creator = self.store.fetch_user(&partnership.creator_id)?;
        let application = self.store.fetch_application(&partnership.application_id)?;
        let profile = match &application {
            Some(application) => self.store.fetch_profile(&application.creator_profile_id)?,
            None => None,
        };

        Ok(PartnershipDetails {
            partnership,
            creator,
            application,
            profile,
            campaign,
        })
    }
}
