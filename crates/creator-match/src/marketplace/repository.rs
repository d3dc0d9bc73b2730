use super::domain::{
    Application, ApplicationId, ApplicationStatus, Campaign, CampaignId, CampaignStatus,
    CreatorProfile, CreatorProfileId, Partnership, PartnershipId, PartnershipStatus, UserAccount,
    UserId,
};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Identity to account lookup used for role checks.
pub trait UserDirectory: Send + Sync {
    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn upsert_user(&self, account: UserAccount) -> Result<(), RepositoryError>;
}

pub trait CampaignRepository: Send + Sync {
    fn insert_campaign(&self, campaign: Campaign) -> Result<Campaign, RepositoryError>;
    fn update_campaign(&self, campaign: Campaign) -> Result<(), RepositoryError>;
    fn fetch_campaign(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError>;
    fn campaigns_by_company(&self, company: &UserId) -> Result<Vec<Campaign>, RepositoryError>;
    fn campaigns_by_status(&self, status: CampaignStatus)
        -> Result<Vec<Campaign>, RepositoryError>;
}

/// Creator profiles; at most one per user.
pub trait ProfileRepository: Send + Sync {
    fn insert_profile(&self, profile: CreatorProfile) -> Result<CreatorProfile, RepositoryError>;
    fn update_profile(&self, profile: CreatorProfile) -> Result<(), RepositoryError>;
    fn fetch_profile(
        &self,
        id: &CreatorProfileId,
    ) -> Result<Option<CreatorProfile>, RepositoryError>;
    fn profile_for_user(&self, user: &UserId) -> Result<Option<CreatorProfile>, RepositoryError>;
}

/// Application storage. Inserts are keyed by the (campaign, creator) pair as well as the id.
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn find_application(
        &self,
        campaign: &CampaignId,
        creator: &UserId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn applications_for_campaign(
        &self,
        campaign: &CampaignId,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn applications_for_creator(&self, creator: &UserId)
        -> Result<Vec<Application>, RepositoryError>;
    fn set_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RepositoryError>;
    /// Overwrites both score fields in a single patch.
    fn record_fit_score(
        &self,
        id: &ApplicationId,
        score: f64,
        reasoning: String,
    ) -> Result<(), RepositoryError>;
}

pub trait PartnershipRepository: Send + Sync {
    fn insert_partnership(&self, partnership: Partnership)
        -> Result<Partnership, RepositoryError>;
    fn fetch_partnership(&self, id: &PartnershipId)
        -> Result<Option<Partnership>, RepositoryError>;
    fn partnership_for_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Partnership>, RepositoryError>;
    fn partnerships_for_campaign(
        &self,
        campaign: &CampaignId,
    ) -> Result<Vec<Partnership>, RepositoryError>;
    fn set_partnership_status(
        &self,
        id: &PartnershipId,
        status: PartnershipStatus,
    ) -> Result<(), RepositoryError>;
}

/// Every table the marketplace services read and write.
pub trait MarketplaceStore:
    UserDirectory + CampaignRepository + ProfileRepository + ApplicationRepository + PartnershipRepository
{
}

impl<T> MarketplaceStore for T where
    T: UserDirectory
        + CampaignRepository
        + ProfileRepository
        + ApplicationRepository
        + PartnershipRepository
{
}
