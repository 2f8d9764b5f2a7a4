//! API keys
//!
//! Keys are 32 random alphanumeric characters shown to the user once. Only
//! the SHA-256 hash and a short prefix are stored.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::error::DomainError;

pub const API_KEY_LENGTH: usize = 32;

/// Characters kept in clear for identifying a key in listings and logs
const KEY_PREFIX_LENGTH: usize = 6;

/// Stored API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyRecord {
    pub id: Uuid,
    pub user_mail: String,
    pub key_hash: String,
    pub key_prefix: String,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
}

impl ApiKeyRecord {
    /// Generate a fresh key for `user_mail`. Returns the plaintext key and its record.
    pub fn issue(user_mail: &str, now: DateTime<Utc>) -> (String, Self) {
        let key = generate_api_key();
        let record = Self {
            id: Uuid::new_v4(),
            user_mail: user_mail.to_string(),
            key_hash: hash_api_key(&key),
            key_prefix: key.chars().take(KEY_PREFIX_LENGTH).collect(),
            created_at: now,
            revoked: false,
        };
        (key, record)
    }
}

pub fn generate_api_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_LENGTH)
        .map(char::from)
        .collect()
}

/// Hex-encoded SHA-256 of the key.
pub fn hash_api_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

pub fn validate_api_key_format(key: &str) -> Result<(), DomainError> {
    if key.len() == API_KEY_LENGTH && key.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(DomainError::MalformedApiKey)
    }
}

/// Trim and lowercase an email address after a basic shape check.
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(DomainError::InvalidEmail(raw.to_string()))
    }
}
