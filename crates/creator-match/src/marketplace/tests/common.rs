use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::marketplace::campaigns::CampaignDraft;
use crate::marketplace::domain::{
    AccountRole, Application, ApplicationId, ApplicationStatus, Campaign, CampaignId,
    CampaignStatus, CreatorProfileId, SocialMediaLink, UploadedFile, UserAccount, UserId,
};
use crate::marketplace::memory::MemoryStore;
use crate::marketplace::model::{CannedModel, StructuredModel};
use crate::marketplace::profiles::ProfileInput;
use crate::marketplace::repository::{ApplicationRepository, UserDirectory};
use crate::marketplace::scoring::ScoringScheduler;
use crate::marketplace::storage::MemoryObjectStorage;
use crate::marketplace::applications::SubmissionPayload;
use crate::marketplace::{marketplace_router, Marketplace, RequestContext, IDENTITY_HEADER};

pub(super) const COMPANY: &str = "company-1";
pub(super) const OTHER_COMPANY: &str = "company-2";
pub(super) const CREATOR: &str = "creator-1";
pub(super) const OTHER_CREATOR: &str = "creator-2";
pub(super) const PUBLIC_URL: &str = "http://marketplace.test";

/// Scheduler double that only remembers what it was asked to score.
#[derive(Default)]
pub(super) struct RecordingScheduler {
    jobs: Mutex<Vec<ApplicationId>>,
}

impl RecordingScheduler {
    pub(super) fn jobs(&self) -> Vec<ApplicationId> {
        self.jobs.lock().expect("jobs lock").clone()
    }
}

impl ScoringScheduler for RecordingScheduler {
    fn schedule(&self, application: ApplicationId) {
        self.jobs.lock().expect("jobs lock").push(application);
    }
}

pub(super) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub model: Arc<CannedModel>,
    pub scheduler: Arc<RecordingScheduler>,
    pub marketplace: Arc<Marketplace<MemoryStore>>,
}

pub(super) fn fixture() -> Fixture {
    fixture_with_model(CannedModel::offline())
}

pub(super) fn fixture_with_model(model: CannedModel) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let model = Arc::new(model);
    let scheduler = Arc::new(RecordingScheduler::default());
    let dyn_model: Arc<dyn StructuredModel> = model.clone();

    let marketplace = Marketplace::new(
        Arc::clone(&store),
        dyn_model,
        Arc::new(MemoryObjectStorage::new(PUBLIC_URL)),
        scheduler.clone(),
    );

    for (id, role) in [
        (COMPANY, AccountRole::Company),
        (OTHER_COMPANY, AccountRole::Company),
        (CREATOR, AccountRole::Creator),
        (OTHER_CREATOR, AccountRole::Creator),
    ] {
        store
            .upsert_user(UserAccount {
                id: UserId::from(id),
                name: Some(format!("{id} name")),
                email: Some(format!("{id}@example.com")),
                role: Some(role),
            })
            .expect("seed account");
    }

    Fixture {
        store,
        model,
        scheduler,
        marketplace: Arc::new(marketplace),
    }
}

pub(super) fn as_user(id: &str) -> RequestContext {
    RequestContext::authenticated(UserId::from(id))
}

pub(super) fn draft(status: Option<CampaignStatus>) -> CampaignDraft {
    CampaignDraft {
        title: "Summer Fitness Push".to_string(),
        description: "Promote our new plant protein line to active audiences.".to_string(),
        criteria: "- 10k+ followers\n- Fitness or nutrition niche".to_string(),
        budget: 5000.0,
        deadline: "2030-06-30".to_string(),
        status,
    }
}

pub(super) fn profile_input(is_complete: bool) -> ProfileInput {
    ProfileInput {
        name: "Jordan Lee".to_string(),
        bio: "Strength coach sharing ten-minute home workouts.".to_string(),
        social_media_links: vec![SocialMediaLink {
            platform: "TikTok".to_string(),
            url: "https://tiktok.com/@jordan".to_string(),
        }],
        is_complete,
    }
}

pub(super) fn video(url: &str) -> SubmissionPayload {
    SubmissionPayload {
        video_url: Some(url.to_string()),
        uploaded_files: None,
    }
}

impl Fixture {
    pub(super) fn campaign(&self, owner: &str, status: CampaignStatus) -> Campaign {
        let initial = match status {
            CampaignStatus::Draft => CampaignStatus::Draft,
            _ => CampaignStatus::Active,
        };
        let campaign = self
            .marketplace
            .campaigns
            .create(&as_user(owner), draft(Some(initial)))
            .expect("create campaign");
        if status == CampaignStatus::Closed {
            return self
                .marketplace
                .campaigns
                .update_status(&as_user(owner), &campaign.id, CampaignStatus::Closed)
                .expect("close campaign");
        }
        campaign
    }

    pub(super) fn complete_profile(&self, creator: &str) {
        self.marketplace
            .profiles
            .create_or_update(&as_user(creator), profile_input(true))
            .expect("save profile");
    }

    /// Onboard `creator` and submit a video to `campaign`.
    pub(super) fn apply(&self, creator: &str, campaign: &CampaignId) -> Application {
        self.complete_profile(creator);
        self.marketplace
            .submissions
            .submit(
                &as_user(creator),
                campaign,
                video("https://www.tiktok.com/@creator/video/1"),
            )
            .expect("submit application")
    }

    /// Push a small blob through the upload flow and describe it as a submission file.
    pub(super) fn upload(&self, filename: &str) -> UploadedFile {
        let ticket = self
            .marketplace
            .storage
            .generate_upload_url()
            .expect("upload ticket");
        let token = ticket.upload_url.rsplit('/').next().expect("token segment");
        let storage_id = self
            .marketplace
            .storage
            .store(token, "video/mp4", vec![0; 16])
            .expect("blob stored");
        UploadedFile {
            storage_id,
            filename: filename.to_string(),
            file_type: "video/mp4".to_string(),
            file_size: 16,
        }
    }

    /// Insert an application directly, bypassing the gate, with a fixed timestamp and score.
    pub(super) fn seed_application(
        &self,
        id: &str,
        campaign: &CampaignId,
        applied_at: i64,
        fit_score: Option<f64>,
    ) -> Application {
        self.store
            .insert_application(Application {
                id: ApplicationId::from(id),
                campaign_id: campaign.clone(),
                creator_id: UserId::from(id),
                creator_profile_id: CreatorProfileId::from(id),
                status: ApplicationStatus::Pending,
                video_url: Some(format!("https://example.com/{id}")),
                uploaded_files: None,
                fit_score,
                fit_reasoning: fit_score.map(|score| format!("scored {score}")),
                applied_at,
            })
            .expect("seed application")
    }

    pub(super) fn router(&self) -> Router {
        marketplace_router(Arc::clone(&self.marketplace))
    }
}

pub(super) fn fit_score_reply(score: f64) -> Value {
    json!({
        "score": score,
        "reasoning": "The creator's fitness niche and short-form video cadence line up closely with the campaign's focus on active, health-minded audiences.",
        "strengths": ["Strong niche alignment", "Consistent posting"],
        "concerns": ["Audience size is modest"],
        "recommendation": "recommend"
    })
}

pub(super) async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header(IDENTITY_HEADER, user);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("encode body"))),
        None => request.body(Body::empty()),
    }
    .expect("build request");

    router.clone().oneshot(request).await.expect("router response")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn assert_error(response: Response, status: StatusCode, message: &str) {
    assert_eq!(response.status(), status);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], message);
}
