use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::domain::CampaignStatus;
use super::model::ModelError;
use super::repository::RepositoryError;
use super::storage::StorageError;

/// Entities named in not-found failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Campaign,
    Application,
    Partnership,
    Profile,
    Account,
    File,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Entity::Campaign => "Campaign",
            Entity::Application => "Application",
            Entity::Partnership => "Partnership",
            Entity::Profile => "Creator profile",
            Entity::Account => "Account",
            Entity::File => "File",
        };
        f.write_str(label)
    }
}

/// Role and ownership failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Forbidden {
    #[error("Only creators can apply to campaigns")]
    CreatorsApplyOnly,
    #[error("Only companies can create campaigns")]
    CompaniesCreateOnly,
    #[error("Only companies can view their campaigns")]
    CompaniesListOnly,
    #[error("Only creators can create profiles")]
    CreatorsProfileOnly,
    #[error("Only creators can generate profile suggestions")]
    CreatorsSuggestOnly,
    #[error("Not authorized to {0}")]
    NotOwner(&'static str),
}

/// Business rule failures surfaced to the caller before any mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Precondition {
    #[error("Please complete your profile before applying")]
    IncompleteProfile,
    #[error("You have already applied to this campaign")]
    AlreadyApplied,
    #[error("This campaign is not accepting applications")]
    CampaignNotAccepting,
    #[error("Please provide either a video URL or upload files")]
    MissingSubmission,
    #[error("Please provide a valid video URL")]
    InvalidVideoUrl,
    #[error("Uploaded file not found; please upload it again")]
    UnknownUpload,
    #[error("Cannot move a campaign from {} to {}", .from.label(), .to.label())]
    InvalidCampaignTransition {
        from: CampaignStatus,
        to: CampaignStatus,
    },
    #[error("{0}")]
    InvalidCampaign(&'static str),
    #[error("Can only create partnerships for selected applications")]
    ApplicationNotSelected,
    #[error("Partnership already exists for this application")]
    PartnershipExists,
}

#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
    #[error(transparent)]
    Precondition(#[from] Precondition),
    #[error("{0} not found")]
    NotFound(Entity),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{context}: {source}")]
    Model {
        context: &'static str,
        #[source]
        source: ModelError,
    },
}

impl MarketplaceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MarketplaceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            MarketplaceError::Forbidden(_) => StatusCode::FORBIDDEN,
            MarketplaceError::Precondition(
                Precondition::AlreadyApplied | Precondition::PartnershipExists,
            ) => StatusCode::CONFLICT,
            MarketplaceError::Precondition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MarketplaceError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketplaceError::Model { .. } => StatusCode::BAD_GATEWAY,
            MarketplaceError::Storage(StorageError::InvalidUploadToken) => StatusCode::NOT_FOUND,
            MarketplaceError::Repository(_) | MarketplaceError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
