use super::domain::{AccountRole, Campaign, CampaignId, UserId};
use super::error::{Entity, Forbidden, MarketplaceError};
use super::repository::{CampaignRepository, UserDirectory};

/// Request-scoped caller identity handed to every service call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    identity: Option<UserId>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(user: UserId) -> Self {
        Self {
            identity: Some(user),
        }
    }

    pub fn identity(&self) -> Option<&UserId> {
        self.identity.as_ref()
    }

    pub fn require_identity(&self) -> Result<&UserId, MarketplaceError> {
        self.identity
            .as_ref()
            .ok_or(MarketplaceError::NotAuthenticated)
    }
}

/// Fetch a campaign and require that `user` owns it.
pub(crate) fn require_campaign_owner<R>(
    campaigns: &R,
    user: &UserId,
    campaign_id: &CampaignId,
    action: &'static str,
) -> Result<Campaign, MarketplaceError>
where
    R: CampaignRepository + ?Sized,
{
    let campaign = campaigns
        .fetch_campaign(campaign_id)?
        .ok_or(MarketplaceError::NotFound(Entity::Campaign))?;
    if &campaign.company_id != user {
        return Err(Forbidden::NotOwner(action).into());
    }
    Ok(campaign)
}

/// Require an authenticated caller whose account carries `role`.
pub(crate) fn require_role<D>(
    directory: &D,
    ctx: &RequestContext,
    role: AccountRole,
    denied: Forbidden,
) -> Result<UserId, MarketplaceError>
where
    D: UserDirectory + ?Sized,
{
    let user = ctx.require_identity()?;
    let account = directory.fetch_user(user)?;
    match account.and_then(|account| account.role) {
        Some(found) if found == role => Ok(user.clone()),
        _ => Err(denied.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::domain::{CampaignStatus, UserAccount};
    use crate::marketplace::memory::MemoryStore;

    fn store_with(role: Option<AccountRole>) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert_user(UserAccount {
                id: UserId::from("user-1"),
                name: None,
                email: None,
                role,
            })
            .expect("seed user");
        store
    }

    #[test]
    fn anonymous_callers_are_rejected_before_role_lookup() {
        let store = store_with(Some(AccountRole::Creator));
        let result = require_role(
            &store,
            &RequestContext::anonymous(),
            AccountRole::Creator,
            Forbidden::CreatorsApplyOnly,
        );
        assert!(matches!(result, Err(MarketplaceError::NotAuthenticated)));
    }

    #[test]
    fn missing_role_is_forbidden() {
        let store = store_with(None);
        let ctx = RequestContext::authenticated(UserId::from("user-1"));
        let result = require_role(
            &store,
            &ctx,
            AccountRole::Creator,
            Forbidden::CreatorsApplyOnly,
        );
        assert!(matches!(
            result,
            Err(MarketplaceError::Forbidden(Forbidden::CreatorsApplyOnly))
        ));
    }

    #[test]
    fn matching_role_returns_identity() {
        let store = store_with(Some(AccountRole::Company));
        let ctx = RequestContext::authenticated(UserId::from("user-1"));
        let user = require_role(
            &store,
            &ctx,
            AccountRole::Company,
            Forbidden::CompaniesCreateOnly,
        )
        .expect("company allowed");
        assert_eq!(user, UserId::from("user-1"));
    }

    #[test]
    fn campaign_owner_check_distinguishes_missing_from_foreign() {
        let store = store_with(Some(AccountRole::Company));
        store
            .insert_campaign(Campaign {
                id: CampaignId::from("cmp-1"),
                title: "Launch".to_string(),
                description: "Launch campaign".to_string(),
                criteria: "Any".to_string(),
                budget: 100.0,
                deadline: "2030-01-01".to_string(),
                status: CampaignStatus::Draft,
                company_id: UserId::from("user-1"),
            })
            .expect("seed campaign");

        let owner = UserId::from("user-1");
        let stranger = UserId::from("user-2");
        assert!(require_campaign_owner(&store, &owner, &CampaignId::from("cmp-1"), "view applicants").is_ok());
        assert!(matches!(
            require_campaign_owner(&store, &stranger, &CampaignId::from("cmp-1"), "view applicants"),
            Err(MarketplaceError::Forbidden(Forbidden::NotOwner("view applicants")))
        ));
        assert!(matches!(
            require_campaign_owner(&store, &owner, &CampaignId::from("missing"), "view applicants"),
            Err(MarketplaceError::NotFound(Entity::Campaign))
        ));
    }
}
