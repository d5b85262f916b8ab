//! Supplies the signed-in user id that scopes every store call.

use crate::database::models::UserId;

pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

/// A fixed identity, e.g. read from configuration.
#[derive(Debug, Clone, Copy)]
pub struct StaticIdentity(pub Option<UserId>);

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.0
    }
}
