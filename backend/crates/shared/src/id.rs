//! Common ID Types
//!
//! Opaque, prefixed identifiers shared by every domain.
//!
//! Layout: `<prefix>_<24 hex chars>`, where the hex encodes 4 bytes of
//! big-endian seconds since [`ID_EPOCH`] followed by 8 random bytes.
//! Ids sort roughly by creation time but are neither sequential nor guessable.

use std::fmt;
use std::marker::PhantomData;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Custom epoch (2023-11-14T22:13:20Z) for the timestamp part.
pub const ID_EPOCH: u64 = 1_700_000_000;

const TIME_BYTES: usize = 4;
const RANDOM_BYTES: usize = 8;
const HEX_LEN: usize = (TIME_BYTES + RANDOM_BYTES) * 2;

/// Per-entity prefix.
pub trait IdMarker {
    const PREFIX: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("expected prefix `{expected}`")]
    WrongPrefix { expected: &'static str },
    #[error("malformed identifier")]
    Malformed,
}

/// Generic typed ID wrapper
///
/// ```
/// use kernel::id::SessionId;
///
/// let id = SessionId::new();
/// assert!(id.as_str().starts_with("sess_"));
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: IdMarker> Id<T> {
    /// Generate a fresh id for the current second.
    pub fn new() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(ID_EPOCH);
        Self::generate_at(secs)
    }

    fn generate_at(unix_secs: u64) -> Self {
        // Wraps after ~136 years.
        let since_epoch = unix_secs.saturating_sub(ID_EPOCH) as u32;

        let mut raw = [0u8; TIME_BYTES + RANDOM_BYTES];
        raw[..TIME_BYTES].copy_from_slice(&since_epoch.to_be_bytes());
        raw[TIME_BYTES..].copy_from_slice(&rand::random::<[u8; RANDOM_BYTES]>());

        Self {
            value: format!("{}_{}", T::PREFIX, hex::encode(raw)),
            _marker: PhantomData,
        }
    }

    /// Parse an id received from a client, checking prefix and shape.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let body = raw
            .strip_prefix(T::PREFIX)
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or(IdError::WrongPrefix {
                expected: T::PREFIX,
            })?;

        let well_formed = body.len() == HEX_LEN
            && body
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(IdError::Malformed);
        }

        Ok(Self::from_db(raw.to_owned()))
    }

    /// Seconds since the Unix epoch encoded in the id, if well formed.
    pub fn timestamp(&self) -> Option<u64> {
        let body = self.value.split_once('_')?.1;
        let bytes = hex::decode(body.get(..TIME_BYTES * 2)?).ok()?;
        let secs = u32::from_be_bytes(bytes.try_into().ok()?);
        Some(u64::from(secs) + ID_EPOCH)
    }
}

impl<T> Id<T> {
    /// Wrap a value loaded from storage without validation.
    pub fn from_db(value: String) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T: IdMarker> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impls so that `T` needs no bounds.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::from_db(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    use super::IdMarker;

    pub struct Session;
    pub struct User;
    pub struct Stop;

    impl IdMarker for Session {
        const PREFIX: &'static str = "sess";
    }

    impl IdMarker for User {
        const PREFIX: &'static str = "user";
    }

    impl IdMarker for Stop {
        const PREFIX: &'static str = "stop";
    }
}

pub type SessionId = Id<markers::Session>;
pub type UserId = Id<markers::User>;
pub type StopId = Id<markers::Stop>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_shape() {
        let id = UserId::new();
        let (prefix, body) = id.as_str().split_once('_').unwrap();
        assert_eq!(prefix, "user");
        assert_eq!(body.len(), HEX_LEN);
        assert!(UserId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_ids_are_not_sequential() {
        let a = SessionId::generate_at(ID_EPOCH + 42);
        let b = SessionId::generate_at(ID_EPOCH + 42);
        assert_ne!(a, b);
        assert_eq!(a.timestamp(), Some(ID_EPOCH + 42));
    }

    #[test]
    fn test_parse_rejects_foreign_prefix() {
        let session = SessionId::new();
        assert_eq!(
            UserId::parse(session.as_str()),
            Err(IdError::WrongPrefix { expected: "user" })
        );
        assert_eq!(UserId::parse("user_xyz"), Err(IdError::Malformed));
    }

    #[test]
    fn test_serde_is_a_plain_string() {
        let id = StopId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: StopId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
