use std::sync::{Mutex, MutexGuard};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Campaign, CampaignId, CampaignStatus,
    CreatorProfile, CreatorProfileId, Partnership, PartnershipId, PartnershipStatus, UserAccount,
    UserId,
};
use super::repository::{
    ApplicationRepository, CampaignRepository, PartnershipRepository, ProfileRepository,
    RepositoryError, UserDirectory,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserAccount>,
    campaigns: Vec<Campaign>,
    profiles: Vec<CreatorProfile>,
    applications: Vec<Application>,
    partnerships: Vec<Partnership>,
}

/// Process-local store backing the API service and tests. Rows keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl UserDirectory for MemoryStore {
    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|user| &user.id == id).cloned())
    }

    fn upsert_user(&self, account: UserAccount) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.users.iter_mut().find(|user| user.id == account.id) {
            Some(existing) => *existing = account,
            None => tables.users.push(account),
        }
        Ok(())
    }
}

impl CampaignRepository for MemoryStore {
    fn insert_campaign(&self, campaign: Campaign) -> Result<Campaign, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.campaigns.iter().any(|row| row.id == campaign.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.campaigns.push(campaign.clone());
        Ok(campaign)
    }

    fn update_campaign(&self, campaign: Campaign) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let row = tables
            .campaigns
            .iter_mut()
            .find(|row| row.id == campaign.id)
            .ok_or(RepositoryError::NotFound)?;
        *row = campaign;
        Ok(())
    }

    fn fetch_campaign(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.campaigns.iter().find(|row| &row.id == id).cloned())
    }

    fn campaigns_by_company(&self, company: &UserId) -> Result<Vec<Campaign>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .campaigns
            .iter()
            .filter(|row| &row.company_id == company)
            .cloned()
            .collect())
    }

    fn campaigns_by_status(
        &self,
        status: CampaignStatus,
    ) -> Result<Vec<Campaign>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .campaigns
            .iter()
            .filter(|row| row.status == status)
            .cloned()
            .collect())
    }
}

impl ProfileRepository for MemoryStore {
    fn insert_profile(&self, profile: CreatorProfile) -> Result<CreatorProfile, RepositoryError> {
        let mut tables = self.tables()?;
        if tables
            .profiles
            .iter()
            .any(|row| row.id == profile.id || row.user_id == profile.user_id)
        {
            return Err(RepositoryError::Conflict);
        }
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    fn update_profile(&self, profile: CreatorProfile) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let row = tables
            .profiles
            .iter_mut()
            .find(|row| row.id == profile.id)
            .ok_or(RepositoryError::NotFound)?;
        *row = profile;
        Ok(())
    }

    fn fetch_profile(
        &self,
        id: &CreatorProfileId,
    ) -> Result<Option<CreatorProfile>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.profiles.iter().find(|row| &row.id == id).cloned())
    }

    fn profile_for_user(&self, user: &UserId) -> Result<Option<CreatorProfile>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .profiles
            .iter()
            .find(|row| &row.user_id == user)
            .cloned())
    }
}

impl ApplicationRepository for MemoryStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.tables()?;
        let duplicate = tables.applications.iter().any(|row| {
            row.id == application.id
                || (row.campaign_id == application.campaign_id
                    && row.creator_id == application.creator_id)
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        tables.applications.push(application.clone());
        Ok(application)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.applications.iter().find(|row| &row.id == id).cloned())
    }

    fn find_application(
        &self,
        campaign: &CampaignId,
        creator: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .applications
            .iter()
            .find(|row| &row.campaign_id == campaign && &row.creator_id == creator)
            .cloned())
    }

    fn applications_for_campaign(
        &self,
        campaign: &CampaignId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .applications
            .iter()
            .filter(|row| &row.campaign_id == campaign)
            .cloned()
            .collect())
    }

    fn applications_for_creator(
        &self,
        creator: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .applications
            .iter()
            .filter(|row| &row.creator_id == creator)
            .cloned()
            .collect())
    }

    fn set_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let row = tables
            .applications
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.status = status;
        Ok(())
    }

    fn record_fit_score(
        &self,
        id: &ApplicationId,
        score: f64,
        reasoning: String,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let row = tables
            .applications
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.fit_score = Some(score);
        row.fit_reasoning = Some(reasoning);
        Ok(())
    }
}

impl PartnershipRepository for MemoryStore {
    fn insert_partnership(
        &self,
        partnership: Partnership,
    ) -> Result<Partnership, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.partnerships.iter().any(|row| {
            row.id == partnership.id || row.application_id == partnership.application_id
        }) {
            return Err(RepositoryError::Conflict);
        }
        tables.partnerships.push(partnership.clone());
        Ok(partnership)
    }

    fn fetch_partnership(
        &self,
        id: &PartnershipId,
    ) -> Result<Option<Partnership>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.partnerships.iter().find(|row| &row.id == id).cloned())
    }

    fn partnership_for_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Partnership>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .partnerships
            .iter()
            .find(|row| &row.application_id == application)
            .cloned())
    }

    fn partnerships_for_campaign(
        &self,
        campaign: &CampaignId,
    ) -> Result<Vec<Partnership>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .partnerships
            .iter()
            .filter(|row| &row.campaign_id == campaign)
            .cloned()
            .collect())
    }

    fn set_partnership_status(
        &self,
        id: &PartnershipId,
        status: PartnershipStatus,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let row = tables
            .partnerships
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.status = status;
        Ok(())
    }
}
