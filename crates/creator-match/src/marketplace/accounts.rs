use std::sync::Arc;

use tracing::info;

use super::auth::RequestContext;
use super::domain::{AccountRole, UserAccount};
use super::error::MarketplaceError;
use super::repository::UserDirectory;

pub struct AccountService<S> {
    store: Arc<S>,
}

impl<S> AccountService<S>
where
    S: UserDirectory + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The caller's account, or `None` for anonymous callers and identities with no record yet.
    pub fn current_user(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<UserAccount>, MarketplaceError> {
        match ctx.identity() {
            Some(user) => Ok(self.store.fetch_user(user)?),
            None => Ok(None),
        }
    }

    /// Assign the caller's role, creating the account record on first use.
    pub fn set_role(
        &self,
        ctx: &RequestContext,
        role: AccountRole,
    ) -> Result<UserAccount, MarketplaceError> {
        let user = ctx.require_identity()?;
        let mut account = self.store.fetch_user(user)?.unwrap_or_else(|| UserAccount {
            id: user.clone(),
            name: None,
            email: None,
            role: None,
        });

        let previous = account.role.replace(role);
        self.store.upsert_user(account.clone())?;
        info!(
            user_id = %account.id,
            role = role.label(),
            previous = previous.map(AccountRole::label),
            "account role set"
        );
        Ok(account)
    }
}
