//! Cache key namespaces

use kernel::id::UserId;

/// Shadow of the active session of a user.
pub fn session(user_id: &UserId) -> String {
    format!("sess:{user_id}")
}

/// Shadow of the public profile of a user.
pub fn user(user_id: &UserId) -> String {
    format!("user:{user_id}")
}
