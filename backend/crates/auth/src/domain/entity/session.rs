//! Session Entity
//!
//! One login instance of a user: device metadata plus the refresh token
//! that can mint new access tokens while the session lives.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{SessionId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::model::SessionRecord;
use crate::error::{AuthError, AuthResult};

/// Absolute lifetime of a session.
pub const SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub ip: String,
    /// Human readable agent, e.g. "Chrome on macOS".
    pub agent: String,
    pub refresh_token: String,
    pub active: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an active session expiring in [`SESSION_TTL_DAYS`].
    ///
    /// All of `user_id`, `ip`, `agent` and `refresh_token` must be non-empty.
    pub fn new(
        user_id: UserId,
        ip: impl Into<String>,
        agent: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> AuthResult<Self> {
        Self::new_at(user_id, ip.into(), agent.into(), refresh_token.into(), Utc::now())
    }

    pub(crate) fn new_at(
        user_id: UserId,
        ip: String,
        agent: String,
        refresh_token: String,
        now: DateTime<Utc>,
    ) -> AuthResult<Self> {
        let required = [
            ("user id", user_id.as_str()),
            ("ip", ip.as_str()),
            ("agent", agent.as_str()),
            ("refresh token", refresh_token.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AuthError::InvalidEntity(format!("session {field} is required")));
        }

        Ok(Self {
            id: SessionId::new(),
            user_id,
            ip,
            agent,
            refresh_token,
            active: true,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            created_at: now,
            updated_at: now,
        })
    }

    /// Expired once `expires_at` is strictly in the past.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.updated_at = Utc::now();
    }

    pub fn change_refresh_token(&mut self, token: impl Into<String>) {
        self.refresh_token = token.into();
        self.updated_at = Utc::now();
    }

    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id.to_string(),
            user_id: self.user_id.to_string(),
            ip: self.ip.clone(),
            agent: self.agent.clone(),
            refresh_token: self.refresh_token.clone(),
            active: self.active,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn from_record(record: SessionRecord) -> Self {
        Self {
            id: SessionId::from_db(record.id),
            user_id: UserId::from_db(record.user_id),
            ip: record.ip,
            agent: record.agent,
            refresh_token: record.refresh_token,
            active: record.active,
            expires_at: record.expires_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Client-safe view of a session. Also the shape cached under `sess:<user id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub user_id: UserId,
    pub agent: String,
    pub ip: String,
    pub active: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            user_id: session.user_id.clone(),
            agent: session.agent.clone(),
            ip: session.ip.clone(),
            active: session.active,
            expires_at: session.expires_at,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}
