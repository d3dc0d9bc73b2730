use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(
    /// Identity of an authenticated account (company or creator).
    UserId
);
record_id!(CampaignId);
record_id!(CreatorProfileId);
record_id!(
    /// Identifier of a submitted application; also the scoring job key.
    ApplicationId
);
record_id!(PartnershipId);
record_id!(
    /// Opaque handle to a blob held by the object storage boundary.
    StorageId
);

/// Milliseconds since the Unix epoch, the timestamp unit of every record.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Company,
    Creator,
}

impl AccountRole {
    pub const fn label(self) -> &'static str {
        match self {
            AccountRole::Company => "company",
            AccountRole::Creator => "creator",
        }
    }
}

/// Account record behind an identity; `role` stays unset until onboarding picks one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AccountRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Closed,
}

impl CampaignStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Closed => "closed",
        }
    }

    /// Lifecycle is draft -> active -> closed, with closed -> active to reopen.
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        matches!(
            (self, next),
            (CampaignStatus::Draft, CampaignStatus::Active)
                | (CampaignStatus::Active, CampaignStatus::Closed)
                | (CampaignStatus::Closed, CampaignStatus::Active)
        ) || self == next
    }
}

/// A company's call for creator submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub title: String,
    pub description: String,
    pub criteria: String,
    pub budget: f64,
    pub deadline: String,
    pub status: CampaignStatus,
    pub company_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMediaLink {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    pub id: CreatorProfileId,
    pub user_id: UserId,
    pub name: String,
    pub bio: String,
    pub social_media_links: Vec<SocialMediaLink>,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Selected,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Descriptor for a blob the creator uploaded before submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub storage_id: StorageId,
    pub filename: String,
    pub file_type: String,
    pub file_size: u64,
}

/// A creator's submission against a campaign.
///
/// `fit_score` and `fit_reasoning` stay unset until the scoring worker patches them, and
/// remain unset forever when scoring fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub campaign_id: CampaignId,
    pub creator_id: UserId,
    pub creator_profile_id: CreatorProfileId,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_files: Option<Vec<UploadedFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_reasoning: Option<String>,
    pub applied_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipStatus {
    Pending,
    Negotiating,
    Approved,
    Active,
    Completed,
}

impl PartnershipStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PartnershipStatus::Pending => "pending",
            PartnershipStatus::Negotiating => "negotiating",
            PartnershipStatus::Approved => "approved",
            PartnershipStatus::Active => "active",
            PartnershipStatus::Completed => "completed",
        }
    }
}

/// Formed once an application is marked selected; one per application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partnership {
    pub id: PartnershipId,
    pub campaign_id: CampaignId,
    pub creator_id: UserId,
    pub application_id: ApplicationId,
    pub status: PartnershipStatus,
    pub created_at: i64,
}
