//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration as StdDuration;

use chrono::Duration;
use platform::password::{HashCost, PasswordHashing};

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret shared by access and refresh tokens
    pub jwt_secret: String,
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (30 days)
    pub refresh_token_ttl: Duration,
    /// How long `sess:<user id>` stays cached; shorter than the session itself
    pub session_cache_ttl: StdDuration,
    /// How long `user:<user id>` stays cached
    pub user_cache_ttl: StdDuration,
    /// Argon2 cost for new hashes
    pub hash_cost: HashCost,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(30),
            session_cache_ttl: StdDuration::from_secs(30 * 60),
            user_cache_ttl: StdDuration::from_secs(15 * 60),
            hash_cost: HashCost::default(),
            password_pepper: None,
        }
    }

    /// Config with a random signing secret (for development)
    ///
    /// Tokens do not survive a restart.
    pub fn development() -> Self {
        Self::new(hex::encode(rand::random::<[u8; 32]>()))
    }

    pub fn password_hashing(&self) -> PasswordHashing {
        PasswordHashing::new(self.hash_cost, self.password_pepper.clone())
    }
}
