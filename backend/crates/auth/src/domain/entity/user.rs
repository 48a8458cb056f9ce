//! User Entity
//!
//! Identity record. Created disabled at registration and enabled by
//! activation; `locked` is set administratively and blocks login for good.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;
use serde::{Deserialize, Serialize};

use crate::domain::model::UserRecord;
use crate::domain::value_object::{Email, UserName};
use crate::error::{AuthError, AuthResult};

const NAME_MAX_LENGTH: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: UserName,
    pub email: Email,
    /// Never leaves the service layer.
    pub password: HashedPassword,
    pub avatar_url: Option<String>,
    pub enabled: bool,
    pub locked: bool,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not yet activated user.
    pub fn new(
        name: impl AsRef<str>,
        username: UserName,
        email: Email,
        password: HashedPassword,
        avatar_url: Option<String>,
    ) -> AuthResult<Self> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(AuthError::InvalidEntity("name is required".into()));
        }
        if name.chars().count() > NAME_MAX_LENGTH {
            return Err(AuthError::InvalidEntity(format!(
                "name must be at most {NAME_MAX_LENGTH} characters"
            )));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidEntity("password is required".into()));
        }
        let avatar_url = avatar_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            name: name.to_string(),
            username,
            email,
            password,
            avatar_url,
            enabled: false,
            locked: false,
            activated_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_activated(&self) -> bool {
        self.enabled
    }

    pub fn activate(&mut self) {
        let now = Utc::now();
        self.enabled = true;
        self.activated_at = Some(now);
        self.updated_at = now;
    }

    pub fn lock(&mut self) {
        self.locked = true;
        self.updated_at = Utc::now();
    }

    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id.to_string(),
            name: self.name.clone(),
            username: self.username.to_string(),
            email: self.email.to_string(),
            password: self.password.as_phc_string().to_string(),
            avatar_url: self.avatar_url.clone(),
            enabled: self.enabled,
            locked: self.locked,
            activated_at: self.activated_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn from_record(record: UserRecord) -> Self {
        Self {
            id: UserId::from_db(record.id),
            name: record.name,
            username: UserName::from_db(record.username),
            email: Email::from_db(record.email),
            password: HashedPassword::from_stored(record.password),
            avatar_url: record.avatar_url,
            enabled: record.enabled,
            locked: record.locked,
            activated_at: record.activated_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Public view of a user. Cached under `user:<user id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub enabled: bool,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            avatar_url: user.avatar_url.clone(),
            enabled: user.enabled,
            locked: user.locked,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
