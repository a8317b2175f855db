//! Credential hashing and session token capabilities.

pub mod password;
pub mod token;

pub use password::{generate_salt, hash_password, verify_password, Argon2Credentials};
pub use token::{SessionToken, SignedSessionTokens, SESSION_LIFETIME_SECS};

use crate::error::AppError;

/// One-way credential storage: `hash` output is opaque and only `verify` can check it.
pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AppError>;

    fn verify(&self, stored_hash: &str, password: &str) -> Result<bool, AppError>;
}

/// Issues and decodes self-contained session tokens carrying a user id and expiry.
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, subject: i64) -> Result<SessionToken, AppError>;

    /// Returns the subject, or `Unauthorized` for malformed, forged or expired tokens.
    fn decode(&self, token: &str) -> Result<i64, AppError>;
}
