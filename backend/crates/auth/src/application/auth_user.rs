//! Authenticated caller
//!
//! Resolved once by the bearer middleware and passed explicitly into the
//! services that act on behalf of a user.

use kernel::id::UserId;

use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

impl AuthUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// `Unauthenticated` when no caller was resolved.
pub(crate) fn require(caller: Option<&AuthUser>) -> AuthResult<&AuthUser> {
    caller.ok_or(AuthError::Unauthenticated)
}
