use argon2::Argon2;
use base64_simd::STANDARD;
use rand::Rng;
use subtle::ConstantTimeEq;

use crate::crypto::CredentialVerifier;
use crate::error::AppError;

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> [u8; 32] {
    rand::thread_rng().gen()
}

/// Hash a password with Argon2id using the provided salt
pub fn hash_password(password: &str, salt: &[u8]) -> Result<[u8; 32], AppError> {
    let argon2 = Argon2::default();
    let mut hash = [0u8; 32];

    argon2
        .hash_password_into(password.as_bytes(), salt, &mut hash)
        .map_err(|e| AppError::Crypto(format!("Password hashing failed: {}", e)))?;

    Ok(hash)
}

/// Verify a password against a stored hash and salt. The comparison is constant-time.
pub fn verify_password(password: &str, stored_hash: &[u8; 32], salt: &[u8]) -> Result<bool, AppError> {
    let computed_hash = hash_password(password, salt)?;
    Ok(computed_hash.as_slice().ct_eq(stored_hash.as_slice()).into())
}

/// Argon2id credentials, stored as `base64(salt)$base64(hash)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Credentials;

impl CredentialVerifier for Argon2Credentials {
    fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = generate_salt();
        let hash = hash_password(password, &salt)?;

        Ok(format!(
            "{}${}",
            STANDARD.encode_to_string(salt.as_slice()),
            STANDARD.encode_to_string(hash.as_slice()),
        ))
    }

    fn verify(&self, stored_hash: &str, password: &str) -> Result<bool, AppError> {
        let (salt_b64, hash_b64) = stored_hash
            .split_once('$')
            .ok_or_else(|| AppError::Crypto("Malformed credential hash".to_string()))?;

        let salt = STANDARD
            .decode_to_vec(salt_b64)
            .map_err(|e| AppError::Crypto(format!("Invalid credential salt: {}", e)))?;

        let hash: [u8; 32] = STANDARD
            .decode_to_vec(hash_b64)
            .map_err(|e| AppError::Crypto(format!("Invalid credential hash: {}", e)))?
            .try_into()
            .map_err(|_| AppError::Crypto("Invalid stored hash length".to_string()))?;

        verify_password(password, &hash, &salt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify() {
        let password = "test_password_123";
        let salt = generate_salt();

        let hash = hash_password(password, &salt).unwrap();
        assert!(verify_password(password, &hash, &salt).unwrap());
        assert!(!verify_password("wrong_password", &hash, &salt).unwrap());
    }

    #[test]
    fn test_verify_rejects_single_bit_difference() {
        let salt = generate_salt();
        let mut hash = hash_password("pw", &salt).unwrap();
        hash[31] ^= 0x01;

        assert!(!verify_password("pw", &hash, &salt).unwrap());
    }

    #[test]
    fn test_credentials_never_contain_plaintext() {
        let credentials = Argon2Credentials;
        let stored = credentials.hash("pw1").unwrap();

        assert!(!stored.contains("pw1"));
        assert!(credentials.verify(&stored, "pw1").unwrap());
        assert!(!credentials.verify(&stored, "pw2").unwrap());
    }

    #[test]
    fn test_same_password_salted_differently() {
        let credentials = Argon2Credentials;
        let first = credentials.hash("hunter2").unwrap();
        let second = credentials.hash("hunter2").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_stored_hash() {
        let credentials = Argon2Credentials;
        assert!(matches!(
            credentials.verify("no-separator", "pw"),
            Err(AppError::Crypto(_))
        ));
    }
}
