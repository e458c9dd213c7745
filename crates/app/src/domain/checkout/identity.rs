//! Who is checking out.

use async_trait::async_trait;
use mockall::automock;
use roastery::orders::UserId;

/// The signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: Option<String>,
}

#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The current user, `None` when nobody is signed in.
    async fn current_user(&self) -> Option<Identity>;
}

/// Identity fixed at startup, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    identity: Option<Identity>,
}

impl StaticIdentity {
    #[must_use]
    pub fn new(identity: Option<Identity>) -> Self {
        Self { identity }
    }

    /// Nobody signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Option<Identity> {
        self.identity.clone()
    }
}
