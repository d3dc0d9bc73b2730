//! Creator profiles: one per creator, upserted, plus model-drafted suggestions.

mod suggestions;

pub use suggestions::{
    BioOption, BioStyle, ProfileSuggestions, SuggestionRequest, PROFILE_EXPERT_AGENT,
    PROFILE_SUGGESTIONS_SCHEMA,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::auth::{require_role, RequestContext};
use super::domain::{AccountRole, CreatorProfile, CreatorProfileId, SocialMediaLink, UserId};
use super::error::{Forbidden, MarketplaceError};
use super::model::{generate, StructuredModel};
use super::repository::{MarketplaceStore, RepositoryError};
use suggestions::suggestion_prompt;

/// Profile fields a creator submits; the owning user comes from the request context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub name: String,
    pub bio: String,
    #[serde(default)]
    pub social_media_links: Vec<SocialMediaLink>,
    pub is_complete: bool,
}

pub struct ProfileService<S> {
    store: Arc<S>,
    model: Arc<dyn StructuredModel>,
}

impl<S> ProfileService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, model: Arc<dyn StructuredModel>) -> Self {
        Self { store, model }
    }

    /// Insert the caller's profile or overwrite the existing one in place.
    pub fn create_or_update(
        &self,
        ctx: &RequestContext,
        input: ProfileInput,
    ) -> Result<CreatorProfile, MarketplaceError> {
        let creator = require_role(
            self.store.as_ref(),
            ctx,
            AccountRole::Creator,
            Forbidden::CreatorsProfileOnly,
        )?;

        let profile = match self.store.profile_for_user(&creator)? {
            Some(existing) => self.overwrite(existing, input)?,
            None => {
                let inserted = self.store.insert_profile(CreatorProfile {
                    id: CreatorProfileId::generate(),
                    user_id: creator.clone(),
                    name: input.name.clone(),
                    bio: input.bio.clone(),
                    social_media_links: input.social_media_links.clone(),
                    is_complete: input.is_complete,
                });
                match inserted {
                    Ok(profile) => profile,
                    // A concurrent save created the row first; this save becomes the update.
                    Err(RepositoryError::Conflict) => {
                        let existing = self
                            .store
                            .profile_for_user(&creator)?
                            .ok_or(RepositoryError::Conflict)?;
                        self.overwrite(existing, input)?
                    }
                    Err(other) => return Err(other.into()),
                }
            }
        };

        info!(
            profile_id = %profile.id,
            user_id = %profile.user_id,
            is_complete = profile.is_complete,
            "creator profile saved"
        );
        Ok(profile)
    }

    fn overwrite(
        &self,
        existing: CreatorProfile,
        input: ProfileInput,
    ) -> Result<CreatorProfile, MarketplaceError> {
        let updated = CreatorProfile {
            id: existing.id,
            user_id: existing.user_id,
            name: input.name,
            bio: input.bio,
            social_media_links: input.social_media_links,
            is_complete: input.is_complete,
        };
        self.store.update_profile(updated.clone())?;
        Ok(updated)
    }

    pub fn get(&self, user: &UserId) -> Result<Option<CreatorProfile>, MarketplaceError> {
        Ok(self.store.profile_for_user(user)?)
    }

    pub fn is_complete(&self, user: &UserId) -> Result<bool, MarketplaceError> {
        Ok(self
            .store
            .profile_for_user(user)?
            .is_some_and(|profile| profile.is_complete))
    }

    pub fn current(&self, ctx: &RequestContext) -> Result<Option<CreatorProfile>, MarketplaceError> {
        match ctx.identity() {
            Some(user) => self.get(user),
            None => Ok(None),
        }
    }

    pub async fn generate_suggestions(
        &self,
        ctx: &RequestContext,
        request: SuggestionRequest,
    ) -> Result<ProfileSuggestions, MarketplaceError> {
        let creator = require_role(
            self.store.as_ref(),
            ctx,
            AccountRole::Creator,
            Forbidden::CreatorsSuggestOnly,
        )?;

        let prompt = suggestion_prompt(&request);
        generate::<ProfileSuggestions>(self.model.as_ref(), &PROFILE_EXPERT_AGENT, &prompt, None)
            .await
            .map_err(|source| {
                warn!(user_id = %creator, error = %source, "profile suggestions failed");
                MarketplaceError::Model {
                    context: "Failed to generate profile suggestions",
                    source,
                }
            })
    }
}
