//! Authenticated caller identity.
//!
//! Identity provisioning is an external collaborator: the presentation
//! layer resolves a session into a [`Caller`] and hands it to every
//! engine operation. The engine only checks roles and participation.

use gavel_core::{AuthError, GavelResult, ProfileId, UserRole};

/// The authenticated identity behind an engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub profile_id: ProfileId,
    pub role: UserRole,
}

impl Caller {
    pub fn new(profile_id: ProfileId, role: UserRole) -> Self {
        Self { profile_id, role }
    }

    /// Require the judge/admin role for claim-side operations.
    pub(crate) fn require_claim_role(&self, action: &str) -> GavelResult<()> {
        if self.role.can_claim_questions() {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                caller: self.profile_id,
                action: action.to_string(),
            }
            .into())
        }
    }
}

/// Resolve an optional session identity into a caller, rejecting
/// anonymous requests before any engine work happens.
pub fn require_caller(caller: Option<Caller>) -> GavelResult<Caller> {
    caller.ok_or_else(|| AuthError::NotAuthenticated.into())
}
