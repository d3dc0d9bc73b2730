//! Campaign authoring for companies and discovery for creators.

mod extraction;

pub use extraction::{CampaignExtraction, CAMPAIGN_EXTRACTION_SCHEMA, CAMPAIGN_STRATEGIST_AGENT};

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::{require_campaign_owner, require_role, RequestContext};
use super::domain::{AccountRole, Campaign, CampaignId, CampaignStatus};
use super::error::{Forbidden, MarketplaceError, Precondition};
use super::model::{generate, StructuredModel};
use super::repository::MarketplaceStore;
use extraction::extraction_prompt;

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Fields a company supplies when publishing a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
    pub title: String,
    pub description: String,
    pub criteria: String,
    pub budget: f64,
    pub deadline: String,
    /// Defaults to draft; only draft or active are accepted.
    #[serde(default)]
    pub status: Option<CampaignStatus>,
}

/// Partial edit; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub criteria: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub deadline: Option<String>,
}

pub struct CampaignService<S> {
    store: Arc<S>,
    model: Arc<dyn StructuredModel>,
}

impl<S> CampaignService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, model: Arc<dyn StructuredModel>) -> Self {
        Self { store, model }
    }

    pub fn create(
        &self,
        ctx: &RequestContext,
        draft: CampaignDraft,
    ) -> Result<Campaign, MarketplaceError> {
        let company = require_role(
            self.store.as_ref(),
            ctx,
            AccountRole::Company,
            Forbidden::CompaniesCreateOnly,
        )?;

        let status = draft.status.unwrap_or(CampaignStatus::Draft);
        if status == CampaignStatus::Closed {
            return Err(
                Precondition::InvalidCampaign("New campaigns must start as draft or active").into(),
            );
        }

        let campaign = Campaign {
            id: CampaignId::generate(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            criteria: draft.criteria,
            budget: draft.budget,
            deadline: draft.deadline.trim().to_string(),
            status,
            company_id: company,
        };
        validate_campaign(&campaign)?;

        let stored = self.store.insert_campaign(campaign)?;
        info!(
            campaign_id = %stored.id,
            company_id = %stored.company_id,
            status = stored.status.label(),
            "campaign created"
        );
        Ok(stored)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &CampaignId,
        patch: CampaignPatch,
    ) -> Result<Campaign, MarketplaceError> {
        let user = ctx.require_identity()?;
        let mut campaign =
            require_campaign_owner(self.store.as_ref(), user, id, "update this campaign")?;

        if let Some(title) = patch.title {
            campaign.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            campaign.description = description;
        }
        if let Some(criteria) = patch.criteria {
            campaign.criteria = criteria;
        }
        if let Some(budget) = patch.budget {
            campaign.budget = budget;
        }
        if let Some(deadline) = patch.deadline {
            campaign.deadline = deadline.trim().to_string();
        }
        validate_campaign(&campaign)?;

        self.store.update_campaign(campaign.clone())?;
        info!(campaign_id = %campaign.id, "campaign updated");
        Ok(campaign)
    }

    pub fn update_status(
        &self,
        ctx: &RequestContext,
        id: &CampaignId,
        status: CampaignStatus,
    ) -> Result<Campaign, MarketplaceError> {
        let user = ctx.require_identity()?;
        let mut campaign =
            require_campaign_owner(self.store.as_ref(), user, id, "update this campaign")?;

        if campaign.status == status {
            return Ok(campaign);
        }
        if !campaign.status.can_transition_to(status) {
            return Err(Precondition::InvalidCampaignTransition {
                from: campaign.status,
                to: status,
            }
            .into());
        }

        let previous = campaign.status;
        campaign.status = status;
        self.store.update_campaign(campaign.clone())?;
        info!(
            campaign_id = %campaign.id,
            from = previous.label(),
            to = status.label(),
            "campaign status changed"
        );
        Ok(campaign)
    }

    /// The calling company's own campaigns.
    pub fn list(&self, ctx: &RequestContext) -> Result<Vec<Campaign>, MarketplaceError> {
        let company = require_role(
            self.store.as_ref(),
            ctx,
            AccountRole::Company,
            Forbidden::CompaniesListOnly,
        )?;
        Ok(self.store.campaigns_by_company(&company)?)
    }

    pub fn list_active(&self, ctx: &RequestContext) -> Result<Vec<Campaign>, MarketplaceError> {
        if ctx.identity().is_none() {
            return Ok(Vec::new());
        }
        Ok(self.store.campaigns_by_status(CampaignStatus::Active)?)
    }

    pub fn get(&self, id: &CampaignId) -> Result<Option<Campaign>, MarketplaceError> {
        Ok(self.store.fetch_campaign(id)?)
    }

    /// Propose campaign fields from pasted text. The company reviews them before creating.
    pub async fn extract_from_document(
        &self,
        ctx: &RequestContext,
        document: &str,
    ) -> Result<CampaignExtraction, MarketplaceError> {
        let company = require_role(
            self.store.as_ref(),
            ctx,
            AccountRole::Company,
            Forbidden::CompaniesCreateOnly,
        )?;
        if document.trim().is_empty() {
            return Err(Precondition::InvalidCampaign("Campaign document is empty").into());
        }

        let prompt = extraction_prompt(document.trim());
        let extraction: CampaignExtraction =
            generate(self.model.as_ref(), &CAMPAIGN_STRATEGIST_AGENT, &prompt, None)
                .await
                .map_err(|source| MarketplaceError::Model {
                    context: "Failed to extract campaign details",
                    source,
                })?;

        info!(company_id = %company, title = %extraction.title, "campaign details extracted");
        Ok(extraction)
    }
}

fn validate_campaign(campaign: &Campaign) -> Result<(), Precondition> {
    if campaign.title.is_empty() {
        return Err(Precondition::InvalidCampaign("Campaign title is required"));
    }
    if !campaign.budget.is_finite() || campaign.budget <= 0.0 {
        return Err(Precondition::InvalidCampaign(
            "Budget must be greater than zero",
        ));
    }
    if NaiveDate::parse_from_str(&campaign.deadline, DEADLINE_FORMAT).is_err() {
        return Err(Precondition::InvalidCampaign(
            "Deadline must be a date in YYYY-MM-DD format",
        ));
    }
    Ok(())
}
