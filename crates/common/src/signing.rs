//! HMAC-signed opaque tokens.
//!
//! Wraps a value into `base64(value).base64(hmac-sha256)` so it can travel
//! through URLs and cookies without exposing raw database identifiers or
//! accepting tampered ones back. Used for walkthrough result links and the
//! session cookie payload.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies opaque string tokens.
#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> AppResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::Internal(format!("Invalid signing key: {e}")))
    }

    /// Sign a value into an opaque URL-safe token.
    pub fn sign(&self, value: &str) -> AppResult<String> {
        let payload = URL_SAFE_NO_PAD.encode(value.as_bytes());
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    /// Verify a token and return the original value.
    ///
    /// Any structural defect, signature mismatch or encoding problem comes
    /// back as [`AppError::InvalidToken`]; callers never learn which.
    pub fn unsign(&self, token: &str) -> AppResult<String> {
        let (payload, signature) = token.split_once('.').ok_or(AppError::InvalidToken)?;

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AppError::InvalidToken)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature_bytes)
            .map_err(|_| AppError::InvalidToken)?;

        let value = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AppError::InvalidToken)?;

        String::from_utf8(value).map_err(|_| AppError::InvalidToken)
    }
}
