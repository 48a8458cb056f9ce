//! Password Hashing and Verification
//!
//! - Argon2id hashing with tunable cost (memory-hard slow hash)
//! - Optional application-wide pepper
//! - Zeroization of clear text
//! - Constant-time comparison that never errors
//!
//! Registration goes through [`ClearTextPassword::new`], which enforces the
//! password policy. Login goes through [`ClearTextPassword::for_verification`],
//! which only normalizes: a password that violates today's policy must still
//! be answered with a plain mismatch.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("password contains invalid control characters")]
    InvalidCharacter,

    #[error("password is too common or follows a predictable pattern")]
    CommonPattern,
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password, NFKC-normalized and erased from memory on drop.
///
/// Not `Clone`; `Debug` is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize and validate a password chosen at registration.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let candidate = Self::for_verification(raw);
        let normalized = candidate.0.as_str();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Code points, not bytes
        let char_count = normalized.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && !matches!(ch, '\t' | '\n'))
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(candidate)
    }

    /// Normalize a password presented at login, without policy checks.
    pub fn for_verification(raw: String) -> Self {
        let raw = Zeroizing::new(raw);
        Self(raw.nfkc().collect())
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(self.0.as_bytes().to_vec());
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap a PHC string loaded from storage.
    ///
    /// Malformed values are accepted here and simply never match.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_phc_string(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([HASH])")
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashCost {
    /// OWASP baseline: m=19 MiB, t=2, p=1.
    pub const RECOMMENDED: Self = Self {
        memory_kib: 19 * 1024,
        iterations: 2,
        parallelism: 1,
    };

    /// Smallest cost argon2 accepts. Tests only.
    pub const MINIMAL: Self = Self {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
}

impl Default for HashCost {
    fn default() -> Self {
        Self::RECOMMENDED
    }
}

/// Hashes and verifies passwords with a fixed cost and optional pepper.
#[derive(Clone)]
pub struct PasswordHashing {
    cost: HashCost,
    pepper: Option<Zeroizing<Vec<u8>>>,
}

impl PasswordHashing {
    pub fn new(cost: HashCost, pepper: Option<Vec<u8>>) -> Self {
        Self {
            cost,
            pepper: pepper.map(Zeroizing::new),
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordHashError> {
        let params = Params::new(
            self.cost.memory_kib,
            self.cost.iterations,
            self.cost.parallelism,
            None,
        )
        .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// One-way salted hash.
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let input = password.peppered(self.pepper.as_deref().map(Vec::as_slice));
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()?
            .hash_password(&input, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword(hash.to_string()))
    }

    /// Constant-time check. `false` on mismatch or malformed hash.
    ///
    /// Cost parameters are read from the stored hash, so hashes made with an
    /// older [`HashCost`] keep verifying.
    pub fn matches(&self, password: &ClearTextPassword, hashed: &HashedPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(&hashed.0) else {
            return false;
        };
        let input = password.peppered(self.pepper.as_deref().map(Vec::as_slice));

        Argon2::default().verify_password(&input, &parsed).is_ok()
    }
}

impl fmt::Debug for PasswordHashing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHashing")
            .field("cost", &self.cost)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];
    if KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "abcdefgh",
        "letmein1",
        "welcome1",
        "admin123",
        "iloveyou",
        "sunshine",
        "princess",
        "football",
        "baseball",
        "trustno1",
        "senha123",
        "ufba2024",
    ];
    COMMON_PASSWORDS.contains(&lower.as_str())
}

fn is_sequential_numbers(s: &str) -> bool {
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 4 || digits.len() != s.chars().count() {
        return false;
    }

    let ascending = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let descending = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);
    ascending || descending
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hashing(pepper: Option<&[u8]>) -> PasswordHashing {
        PasswordHashing::new(HashCost::MINIMAL, pepper.map(<[u8]>::to_vec))
    }

    #[test]
    fn test_policy_rejections() {
        assert!(matches!(
            ClearTextPassword::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        ));
        assert!(matches!(
            ClearTextPassword::new("a1".repeat(MAX_PASSWORD_LENGTH)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        assert!(matches!(
            ClearTextPassword::new("          ".to_string()),
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
        assert!(matches!(
            ClearTextPassword::new("bad\u{0007}password!".to_string()),
            Err(PasswordPolicyError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_common_patterns() {
        for weak in ["password123", "qwerty-lover", "12345678", "98765432", "zzzzzzzz"] {
            assert!(
                matches!(
                    ClearTextPassword::new(weak.to_string()),
                    Err(PasswordPolicyError::CommonPattern)
                ),
                "{weak} should be rejected"
            );
        }
        assert!(ClearTextPassword::new("Ponto de Onibus 42!".to_string()).is_ok());
    }

    #[test]
    fn test_nfkc_normalization_makes_forms_equivalent() {
        let hashing = hashing(None);
        // U+FF21 (fullwidth A) normalizes to "A"
        let registered = ClearTextPassword::new("\u{FF21}lmost-there9".to_string()).unwrap();
        let hashed = hashing.hash(&registered).unwrap();

        let typed = ClearTextPassword::for_verification("Almost-there9".to_string());
        assert!(hashing.matches(&typed, &hashed));
    }

    #[test]
    fn test_hash_and_match() {
        let hashing = hashing(None);
        let password = ClearTextPassword::for_verification("Correct#Horse7".to_string());
        let hashed = hashing.hash(&password).unwrap();

        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
        assert!(hashing.matches(&password, &hashed));

        let wrong = ClearTextPassword::for_verification("Correct#Horse8".to_string());
        assert!(!hashing.matches(&wrong, &hashed));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hashing = hashing(None);
        let password = ClearTextPassword::for_verification("Correct#Horse7".to_string());
        let a = hashing.hash(&password).unwrap();
        let b = hashing.hash(&password).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_pepper_must_match() {
        let peppered = hashing(Some(b"server-pepper"));
        let password = ClearTextPassword::for_verification("Correct#Horse7".to_string());
        let hashed = peppered.hash(&password).unwrap();

        assert!(peppered.matches(&password, &hashed));
        assert!(!hashing(None).matches(&password, &hashed));
        assert!(!hashing(Some(b"other")).matches(&password, &hashed));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let hashing = hashing(None);
        let password = ClearTextPassword::for_verification("whatever-it-is".to_string());
        assert!(!hashing.matches(&password, &HashedPassword::from_stored("not_a_phc")));
        assert!(!hashing.matches(&password, &HashedPassword::from_stored("")));
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::for_verification("secret-value".to_string());
        let output = format!("{:?}", password);
        assert!(output.contains("REDACTED"));
        assert!(!output.contains("secret-value"));
    }
}
