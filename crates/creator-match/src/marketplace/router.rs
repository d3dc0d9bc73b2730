use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequestParts, Path, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::applications::SubmissionPayload;
use super::auth::RequestContext;
use super::campaigns::CampaignDraft;
use super::campaigns::CampaignPatch;
use super::domain::{
    AccountRole, ApplicationId, ApplicationStatus, CampaignId, CampaignStatus, PartnershipId,
    PartnershipStatus, StorageId, UserId,
};
use super::error::{Entity, MarketplaceError};
use super::partnerships::NewPartnership;
use super::profiles::{ProfileInput, SuggestionRequest};
use super::repository::MarketplaceStore;
use super::Marketplace;

/// Header carrying the caller's already-authenticated identity.
pub const IDENTITY_HEADER: &str = "x-user-id";

/// Largest blob accepted by the upload endpoint.
const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

type Shared<S> = State<Arc<Marketplace<S>>>;
type ApiResult<T> = Result<T, MarketplaceError>;

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(UserId::from);

        Ok(identity
            .map(RequestContext::authenticated)
            .unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct StatusChange<T> {
    status: T,
}

#[derive(Debug, Deserialize)]
struct RoleChange {
    role: AccountRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionRequest {
    document_text: String,
}

/// Router exposing every marketplace operation under `/api/v1`.
pub fn marketplace_router<S>(marketplace: Arc<Marketplace<S>>) -> Router
where
    S: MarketplaceStore + 'static,
{
    Router::new()
        .route("/api/v1/account", get(current_user::<S>))
        .route("/api/v1/account/role", put(set_role::<S>))
        .route(
            "/api/v1/campaigns",
            get(list_campaigns::<S>).post(create_campaign::<S>),
        )
        .route("/api/v1/campaigns/active", get(list_active_campaigns::<S>))
        .route("/api/v1/campaigns/extract", post(extract_campaign::<S>))
        .route(
            "/api/v1/campaigns/:campaign_id",
            get(get_campaign::<S>).patch(update_campaign::<S>),
        )
        .route(
            "/api/v1/campaigns/:campaign_id/status",
            put(update_campaign_status::<S>),
        )
        .route(
            "/api/v1/campaigns/:campaign_id/applications",
            get(campaign_applications::<S>).post(submit_application::<S>),
        )
        .route(
            "/api/v1/campaigns/:campaign_id/applications/ranked",
            get(ranked_applications::<S>),
        )
        .route(
            "/api/v1/campaigns/:campaign_id/applications/mine",
            get(my_campaign_application::<S>),
        )
        .route("/api/v1/campaigns/:campaign_id/applied", get(has_applied::<S>))
        .route(
            "/api/v1/campaigns/:campaign_id/partnerships",
            get(campaign_partnerships::<S>),
        )
        .route(
            "/api/v1/campaigns/:campaign_id/partnerships/count",
            get(count_partnerships::<S>),
        )
        .route("/api/v1/applications/mine", get(my_applications::<S>))
        .route(
            "/api/v1/applications/:application_id/status",
            put(update_application_status::<S>),
        )
        .route(
            "/api/v1/profiles/me",
            get(current_profile::<S>).put(save_profile::<S>),
        )
        .route("/api/v1/profiles/suggestions", post(suggest_profile::<S>))
        .route("/api/v1/profiles/:user_id", get(get_profile::<S>))
        .route(
            "/api/v1/profiles/:user_id/complete",
            get(profile_complete::<S>),
        )
        .route("/api/v1/partnerships", post(create_partnership::<S>))
        .route(
            "/api/v1/partnerships/:partnership_id",
            get(get_partnership::<S>),
        )
        .route(
            "/api/v1/partnerships/:partnership_id/status",
            put(update_partnership_status::<S>),
        )
        .route("/api/v1/uploads", post(generate_upload_url::<S>))
        .route(
            "/api/v1/uploads/:token",
            post(store_upload::<S>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/files/:storage_id", get(file_url::<S>))
        .route("/api/v1/files/:storage_id/content", get(file_content::<S>))
        .with_state(marketplace)
}

async fn current_user<S>(State(marketplace): Shared<S>, ctx: RequestContext) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let account = marketplace.accounts.current_user(&ctx)?;
    Ok(Json(account).into_response())
}

async fn set_role<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Json(change): Json<RoleChange>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let account = marketplace.accounts.set_role(&ctx, change.role)?;
    Ok(Json(account).into_response())
}

async fn list_campaigns<S>(State(marketplace): Shared<S>, ctx: RequestContext) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    Ok(Json(marketplace.campaigns.list(&ctx)?).into_response())
}

async fn create_campaign<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Json(draft): Json<CampaignDraft>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let campaign = marketplace.campaigns.create(&ctx, draft)?;
    Ok((StatusCode::CREATED, Json(campaign)).into_response())
}

async fn list_active_campaigns<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    Ok(Json(marketplace.campaigns.list_active(&ctx)?).into_response())
}

async fn extract_campaign<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Json(request): Json<ExtractionRequest>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let extraction = marketplace
        .campaigns
        .extract_from_document(&ctx, &request.document_text)
        .await?;
    Ok(Json(extraction).into_response())
}

async fn get_campaign<S>(
    State(marketplace): Shared<S>,
    Path(campaign_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let campaign = marketplace
        .campaigns
        .get(&CampaignId(campaign_id))?
        .ok_or(MarketplaceError::NotFound(Entity::Campaign))?;
    Ok(Json(campaign).into_response())
}

async fn update_campaign<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(campaign_id): Path<String>,
    Json(patch): Json<CampaignPatch>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let campaign = marketplace
        .campaigns
        .update(&ctx, &CampaignId(campaign_id), patch)?;
    Ok(Json(campaign).into_response())
}

async fn update_campaign_status<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(campaign_id): Path<String>,
    Json(change): Json<StatusChange<CampaignStatus>>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let campaign =
        marketplace
            .campaigns
            .update_status(&ctx, &CampaignId(campaign_id), change.status)?;
    Ok(Json(campaign).into_response())
}

async fn submit_application<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(campaign_id): Path<String>,
    Json(payload): Json<SubmissionPayload>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let application = marketplace
        .submissions
        .submit(&ctx, &CampaignId(campaign_id), payload)?;
    Ok((StatusCode::CREATED, Json(application)).into_response())
}

async fn campaign_applications<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(campaign_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let applicants = marketplace
        .applications
        .get_by_campaign(&ctx, &CampaignId(campaign_id))?;
    Ok(Json(applicants).into_response())
}

async fn ranked_applications<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(campaign_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let applicants = marketplace
        .applications
        .get_ranked_by_campaign(&ctx, &CampaignId(campaign_id))?;
    Ok(Json(applicants).into_response())
}

async fn my_campaign_application<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(campaign_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let application = marketplace
        .applications
        .get_application(&ctx, &CampaignId(campaign_id))?;
    Ok(Json(application).into_response())
}

async fn has_applied<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(campaign_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let applied = marketplace
        .applications
        .has_applied(&ctx, &CampaignId(campaign_id))?;
    Ok(Json(json!({ "hasApplied": applied })).into_response())
}

async fn campaign_partnerships<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(campaign_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let partnerships = marketplace
        .partnerships
        .get_by_campaign(&ctx, &CampaignId(campaign_id))?;
    Ok(Json(partnerships).into_response())
}

async fn count_partnerships<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(campaign_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let count = marketplace
        .partnerships
        .count_by_campaign(&ctx, &CampaignId(campaign_id))?;
    Ok(Json(json!({ "count": count })).into_response())
}

async fn my_applications<S>(State(marketplace): Shared<S>, ctx: RequestContext) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    Ok(Json(marketplace.applications.get_by_creator(&ctx)?).into_response())
}

async fn update_application_status<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(application_id): Path<String>,
    Json(change): Json<StatusChange<ApplicationStatus>>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    marketplace
        .applications
        .update_status(&ctx, &ApplicationId(application_id), change.status)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn current_profile<S>(State(marketplace): Shared<S>, ctx: RequestContext) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    Ok(Json(marketplace.profiles.current(&ctx)?).into_response())
}

async fn save_profile<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Json(input): Json<ProfileInput>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let profile = marketplace.profiles.create_or_update(&ctx, input)?;
    Ok(Json(profile).into_response())
}

async fn suggest_profile<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Json(request): Json<SuggestionRequest>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let suggestions = marketplace
        .profiles
        .generate_suggestions(&ctx, request)
        .await?;
    Ok(Json(suggestions).into_response())
}

async fn get_profile<S>(
    State(marketplace): Shared<S>,
    Path(user_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let profile = marketplace
        .profiles
        .get(&UserId(user_id))?
        .ok_or(MarketplaceError::NotFound(Entity::Profile))?;
    Ok(Json(profile).into_response())
}

async fn profile_complete<S>(
    State(marketplace): Shared<S>,
    Path(user_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let complete = marketplace.profiles.is_complete(&UserId(user_id))?;
    Ok(Json(json!({ "isComplete": complete })).into_response())
}

async fn create_partnership<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Json(request): Json<NewPartnership>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let partnership = marketplace.partnerships.create(&ctx, request)?;
    Ok((StatusCode::CREATED, Json(partnership)).into_response())
}

async fn get_partnership<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(partnership_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let partnership = marketplace
        .partnerships
        .get(&ctx, &PartnershipId(partnership_id))?
        .ok_or(MarketplaceError::NotFound(Entity::Partnership))?;
    Ok(Json(partnership).into_response())
}

async fn update_partnership_status<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
    Path(partnership_id): Path<String>,
    Json(change): Json<StatusChange<PartnershipStatus>>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    marketplace
        .partnerships
        .update_status(&ctx, &PartnershipId(partnership_id), change.status)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn generate_upload_url<S>(
    State(marketplace): Shared<S>,
    ctx: RequestContext,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let ticket = marketplace.applications.generate_upload_url(&ctx)?;
    Ok(Json(ticket).into_response())
}

async fn store_upload<S>(
    State(marketplace): Shared<S>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream");
    let storage_id = marketplace
        .storage
        .store(&token, content_type, body.to_vec())?;
    Ok((StatusCode::CREATED, Json(json!({ "storageId": storage_id }))).into_response())
}

async fn file_url<S>(
    State(marketplace): Shared<S>,
    Path(storage_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let url = marketplace.applications.file_url(&StorageId(storage_id))?;
    Ok(Json(json!({ "url": url })).into_response())
}

async fn file_content<S>(
    State(marketplace): Shared<S>,
    Path(storage_id): Path<String>,
) -> ApiResult<Response>
where
    S: MarketplaceStore + 'static,
{
    let blob = marketplace
        .storage
        .fetch(&StorageId(storage_id))?
        .ok_or(MarketplaceError::NotFound(Entity::File))?;
    Ok(([(header::CONTENT_TYPE, blob.content_type)], blob.bytes).into_response())
}
