//! Who is signed in.
//!
//! The host application owns authentication; the core only asks for the
//! current user id and refuses to touch user-owned data without one.

use crate::error::WorkflowError;

/// Source of the signed-in user's id.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<String>;
}

/// Identity fixed at construction. Used by the FFI layer and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedIdentity {
    user_id: Option<String>,
}

impl FixedIdentity {
    pub fn signed_in(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_user(&self) -> Option<String> {
        self.user_id.clone()
    }
}

/// Current user id, or [`WorkflowError::NotSignedIn`].
pub fn require_user(identity: &dyn IdentityProvider) -> Result<String, WorkflowError> {
    identity
        .current_user()
        .filter(|id| !id.trim().is_empty())
        .ok_or(WorkflowError::NotSignedIn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_user() {
        assert_eq!(
            require_user(&FixedIdentity::signed_in("user-1")).unwrap(),
            "user-1"
        );
        assert!(matches!(
            require_user(&FixedIdentity::anonymous()),
            Err(WorkflowError::NotSignedIn)
        ));
        assert!(matches!(
            require_user(&FixedIdentity::signed_in("  ")),
            Err(WorkflowError::NotSignedIn)
        ));
    }
}
