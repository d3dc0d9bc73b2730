use super::common::*;

use crate::marketplace::applications::SubmissionPayload;
use crate::marketplace::domain::{
    ApplicationStatus, CampaignId, CampaignStatus, StorageId, UploadedFile,
};
use crate::marketplace::error::{Entity, Forbidden, MarketplaceError, Precondition};
use crate::marketplace::repository::ApplicationRepository;
use crate::marketplace::RequestContext;

fn assert_precondition(result: Result<impl std::fmt::Debug, MarketplaceError>, expected: Precondition) {
    match result {
        Err(MarketplaceError::Precondition(found)) => assert_eq!(found, expected),
        other => panic!("expected {expected:?}, got {other:?}"),
    }
}

#[test]
fn accepted_submission_is_pending_unscored_and_scheduled_once() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);

    let application = fixture.apply(CREATOR, &campaign.id);

    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.campaign_id, campaign.id);
    assert!(application.fit_score.is_none());
    assert!(application.fit_reasoning.is_none());
    assert_eq!(fixture.scheduler.jobs(), vec![application.id.clone()]);

    let stored = fixture
        .store
        .fetch_application(&application.id)
        .expect("fetch")
        .expect("stored");
    assert_eq!(stored, application);
}

#[test]
fn anonymous_callers_are_not_authenticated() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);

    let result = fixture.marketplace.submissions.submit(
        &RequestContext::anonymous(),
        &campaign.id,
        video("https://youtu.be/abc"),
    );
    assert!(matches!(result, Err(MarketplaceError::NotAuthenticated)));
}

#[test]
fn companies_cannot_apply() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);

    let result = fixture.marketplace.submissions.submit(
        &as_user(OTHER_COMPANY),
        &campaign.id,
        video("https://youtu.be/abc"),
    );
    assert!(matches!(
        result,
        Err(MarketplaceError::Forbidden(Forbidden::CreatorsApplyOnly))
    ));
}

#[test]
fn missing_or_incomplete_profile_blocks_submission() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);

    let result = fixture.marketplace.submissions.submit(
        &as_user(CREATOR),
        &campaign.id,
        video("https://youtu.be/abc"),
    );
    assert_precondition(result, Precondition::IncompleteProfile);

    fixture
        .marketplace
        .profiles
        .create_or_update(&as_user(CREATOR), profile_input(false))
        .expect("save draft profile");
    let result = fixture.marketplace.submissions.submit(
        &as_user(CREATOR),
        &campaign.id,
        video("https://youtu.be/abc"),
    );
    assert_precondition(result, Precondition::IncompleteProfile);
}

#[test]
fn second_submission_is_rejected_without_side_effects() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);
    let first = fixture.apply(CREATOR, &campaign.id);

    let result = fixture.marketplace.submissions.submit(
        &as_user(CREATOR),
        &campaign.id,
        video("https://youtu.be/second"),
    );
    assert_precondition(result, Precondition::AlreadyApplied);

    let stored = fixture
        .store
        .applications_for_campaign(&campaign.id)
        .expect("list");
    assert_eq!(stored.len(), 1);
    assert_eq!(fixture.scheduler.jobs(), vec![first.id]);
}

#[test]
fn unknown_campaign_is_not_found() {
    let fixture = fixture();
    fixture.complete_profile(CREATOR);

    let result = fixture.marketplace.submissions.submit(
        &as_user(CREATOR),
        &CampaignId::from("missing"),
        video("https://youtu.be/abc"),
    );
    match result {
        Err(err @ MarketplaceError::NotFound(Entity::Campaign)) => {
            assert_eq!(err.to_string(), "Campaign not found")
        }
        other => panic!("expected campaign not found, got {other:?}"),
    }
}

#[test]
fn draft_and_closed_campaigns_do_not_accept_applications() {
    let fixture = fixture();
    fixture.complete_profile(CREATOR);

    for status in [CampaignStatus::Draft, CampaignStatus::Closed] {
        let campaign = fixture.campaign(COMPANY, status);
        let result = fixture.marketplace.submissions.submit(
            &as_user(CREATOR),
            &campaign.id,
            video("https://youtu.be/abc"),
        );
        assert_precondition(result, Precondition::CampaignNotAccepting);
    }
    assert!(fixture.scheduler.jobs().is_empty());
}

#[test]
fn submission_needs_a_video_or_files() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);
    fixture.complete_profile(CREATOR);

    for payload in [
        SubmissionPayload::default(),
        SubmissionPayload {
            video_url: Some("  ".to_string()),
            uploaded_files: Some(Vec::new()),
        },
    ] {
        let result = fixture
            .marketplace
            .submissions
            .submit(&as_user(CREATOR), &campaign.id, payload);
        assert_precondition(result, Precondition::MissingSubmission);
    }
}

#[test]
fn malformed_video_url_is_rejected_before_insert() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);
    fixture.complete_profile(CREATOR);

    let result = fixture.marketplace.submissions.submit(
        &as_user(CREATOR),
        &campaign.id,
        video("not a url"),
    );
    assert_precondition(result, Precondition::InvalidVideoUrl);
    assert!(fixture
        .store
        .applications_for_campaign(&campaign.id)
        .expect("list")
        .is_empty());
    assert!(fixture.scheduler.jobs().is_empty());
}

#[test]
fn uploaded_files_alone_are_accepted() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);
    fixture.complete_profile(CREATOR);
    let file = fixture.upload("draft-cut.mp4");

    let application = fixture
        .marketplace
        .submissions
        .submit(
            &as_user(CREATOR),
            &campaign.id,
            SubmissionPayload {
                video_url: None,
                uploaded_files: Some(vec![file.clone()]),
            },
        )
        .expect("files accepted");

    assert!(application.video_url.is_none());
    assert_eq!(application.uploaded_files, Some(vec![file]));
}

#[test]
fn files_must_reference_stored_uploads() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);
    fixture.complete_profile(CREATOR);
    let stored = fixture.upload("take-1.mp4");
    let never_uploaded = UploadedFile {
        storage_id: StorageId::from("never-uploaded"),
        filename: "take-2.mp4".to_string(),
        file_type: "video/mp4".to_string(),
        file_size: 48_000_000,
    };

    let result = fixture.marketplace.submissions.submit(
        &as_user(CREATOR),
        &campaign.id,
        SubmissionPayload {
            video_url: None,
            uploaded_files: Some(vec![stored, never_uploaded]),
        },
    );
    match result {
        Err(err @ MarketplaceError::Precondition(Precondition::UnknownUpload)) => {
            assert_eq!(err.to_string(), "Uploaded file not found; please upload it again");
            assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        }
        other => panic!("expected unknown upload, got {other:?}"),
    }
    assert!(fixture
        .store
        .applications_for_campaign(&campaign.id)
        .expect("applications")
        .is_empty());
    assert!(fixture.scheduler.jobs().is_empty());
}

#[test]
fn empty_file_list_is_stored_as_absent() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);
    fixture.complete_profile(CREATOR);

    let application = fixture
        .marketplace
        .submissions
        .submit(
            &as_user(CREATOR),
            &campaign.id,
            SubmissionPayload {
                video_url: Some("https://youtu.be/abc".to_string()),
                uploaded_files: Some(Vec::new()),
            },
        )
        .expect("video accepted");
    assert!(application.uploaded_files.is_none());
}

#[test]
fn earlier_checks_win_when_several_fail() {
    let fixture = fixture();
    let draft = fixture.campaign(COMPANY, CampaignStatus::Draft);

    // Incomplete profile, inactive campaign, and no content: the profile check runs first.
    let result = fixture.marketplace.submissions.submit(
        &as_user(CREATOR),
        &draft.id,
        SubmissionPayload::default(),
    );
    assert_precondition(result, Precondition::IncompleteProfile);

    // With a profile, the inactive campaign is reported before the missing content.
    fixture.complete_profile(CREATOR);
    let result = fixture.marketplace.submissions.submit(
        &as_user(CREATOR),
        &draft.id,
        SubmissionPayload::default(),
    );
    assert_precondition(result, Precondition::CampaignNotAccepting);
}

#[test]
fn different_creators_may_apply_to_the_same_campaign() {
    let fixture = fixture();
    let campaign = fixture.campaign(COMPANY, CampaignStatus::Active);

    let first = fixture.apply(CREATOR, &campaign.id);
    let second = fixture.apply(OTHER_CREATOR, &campaign.id);

    assert_ne!(first.id, second.id);
    assert_eq!(fixture.scheduler.jobs(), vec![first.id, second.id]);
}
