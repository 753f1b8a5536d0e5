use crate::domain::value_objects::AccountId;

/// Current caller identity. Sign-in and sign-out are edge events triggered
/// outside the core; consumers re-read this on every call rather than caching
/// the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Guest,
    Account(AccountId),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Account(_))
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        match self {
            Identity::Guest => None,
            Identity::Account(id) => Some(id),
        }
    }
}

/// Injected session context. Replaces ambient who-am-I state so the read-path
/// branching stays explicit and testable without a real session provider.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Identity;
}
