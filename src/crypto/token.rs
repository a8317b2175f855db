use base64_simd::URL_SAFE_NO_PAD;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::crypto::SessionIssuer;
use crate::error::AppError;

/// Sessions live for a fixed 30 minutes from issuance.
pub const SESSION_LIFETIME_SECS: i64 = 30 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: i64,
}

/// Ed25519-signed tokens of the form `base64url(claims).base64url(signature)`.
///
/// The key pair lives only in memory, so a restart invalidates every token.
pub struct SignedSessionTokens {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl SignedSessionTokens {
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();

        Self {
            signing_key,
            verifying_key,
        }
    }

    pub fn issue_at(&self, subject: i64, now: i64) -> Result<SessionToken, AppError> {
        let claims = Claims {
            sub: subject,
            exp: now + SESSION_LIFETIME_SECS,
        };

        let payload = serde_json::to_vec(&claims)
            .map_err(|e| AppError::Crypto(format!("Failed to encode claims: {}", e)))?;
        let signature = self.signing_key.sign(&payload);

        let token = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode_to_string(payload.as_slice()),
            URL_SAFE_NO_PAD.encode_to_string(signature.to_bytes().as_slice()),
        );

        Ok(SessionToken {
            token,
            expires_at: claims.exp,
        })
    }

    pub fn decode_at(&self, token: &str, now: i64) -> Result<i64, AppError> {
        let invalid = || AppError::Unauthorized("Invalid token".to_string());

        let (payload_b64, signature_b64) = token.split_once('.').ok_or_else(invalid)?;

        let payload = URL_SAFE_NO_PAD
            .decode_to_vec(payload_b64)
            .map_err(|_| invalid())?;
        let signature_bytes = URL_SAFE_NO_PAD
            .decode_to_vec(signature_b64)
            .map_err(|_| invalid())?;
        let signature = Signature::from_slice(&signature_bytes).map_err(|_| invalid())?;

        self.verifying_key
            .verify(&payload, &signature)
            .map_err(|_| invalid())?;

        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| invalid())?;

        if claims.exp <= now {
            return Err(AppError::Unauthorized("Session expired".to_string()));
        }

        Ok(claims.sub)
    }
}

impl SessionIssuer for SignedSessionTokens {
    fn issue(&self, subject: i64) -> Result<SessionToken, AppError> {
        self.issue_at(subject, chrono::Utc::now().timestamp())
    }

    fn decode(&self, token: &str) -> Result<i64, AppError> {
        self.decode_at(token, chrono::Utc::now().timestamp())
    }
}
