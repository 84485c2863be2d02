//! Signed-cookie session.
//!
//! The session carries identifiers only — the current walkthrough and the
//! completed bucket. The aggregate itself is always reloaded from the
//! database, so the cookie can never drift from the persisted truth. The
//! JSON payload is HMAC-signed; a missing, tampered or undecodable cookie
//! degrades to an empty session.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use profilingpoll_common::{AppError, AppResult, TokenSigner};
use serde::{Deserialize, Serialize};

/// Per-visitor session state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// The in-progress walkthrough, if any.
    #[serde(default)]
    pub current_walkthrough: Option<String>,

    /// Walkthroughs finished during this session.
    #[serde(default)]
    pub completed_walkthroughs: Vec<String>,
}

impl Session {
    /// Read the session from the cookie jar.
    #[must_use]
    pub fn load(jar: &CookieJar, signer: &TokenSigner, cookie_name: &str) -> Self {
        let Some(cookie) = jar.get(cookie_name) else {
            return Self::default();
        };
        match signer
            .unsign(cookie.value())
            .ok()
            .and_then(|payload| serde_json::from_str(&payload).ok())
        {
            Some(session) => session,
            None => {
                tracing::debug!("Discarding undecodable session cookie");
                Self::default()
            }
        }
    }

    /// Write the session back into the cookie jar.
    pub fn store(
        &self,
        jar: CookieJar,
        signer: &TokenSigner,
        cookie_name: &str,
    ) -> AppResult<CookieJar> {
        let payload = serde_json::to_string(self)
            .map_err(|e| AppError::Internal(format!("Failed to serialize session: {e}")))?;
        let value = signer.sign(&payload)?;

        let cookie = Cookie::build((cookie_name.to_string(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();

        Ok(jar.add(cookie))
    }

    /// Move a walkthrough from "current" into the completed bucket.
    pub fn complete(&mut self, walkthrough_id: &str) {
        if self.current_walkthrough.as_deref() == Some(walkthrough_id) {
            self.current_walkthrough = None;
        }
        if !self
            .completed_walkthroughs
            .iter()
            .any(|id| id == walkthrough_id)
        {
            self.completed_walkthroughs.push(walkthrough_id.to_string());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const COOKIE: &str = "pp_session";

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret")
    }

    #[test]
    fn test_absent_cookie_is_empty_session() {
        let session = Session::load(&CookieJar::new(), &signer(), COOKIE);
        assert!(session.current_walkthrough.is_none());
        assert!(session.completed_walkthroughs.is_empty());
    }

    #[test]
    fn test_store_load_round_trip() {
        let signer = signer();
        let session = Session {
            current_walkthrough: Some("w1".to_string()),
            completed_walkthroughs: vec!["w0".to_string()],
        };

        let jar = session.store(CookieJar::new(), &signer, COOKIE).unwrap();
        let loaded = Session::load(&jar, &signer, COOKIE);

        assert_eq!(loaded.current_walkthrough.as_deref(), Some("w1"));
        assert_eq!(loaded.completed_walkthroughs, vec!["w0".to_string()]);
    }

    #[test]
    fn test_tampered_cookie_degrades_to_empty() {
        let signer = signer();
        let session = Session {
            current_walkthrough: Some("w1".to_string()),
            completed_walkthroughs: Vec::new(),
        };
        let jar = session.store(CookieJar::new(), &signer, COOKIE).unwrap();

        let tampered = format!("{}x", jar.get(COOKIE).unwrap().value());
        let jar = jar.add(Cookie::new(COOKIE, tampered));

        let loaded = Session::load(&jar, &signer, COOKIE);
        assert!(loaded.current_walkthrough.is_none());
    }

    #[test]
    fn test_complete_moves_current_to_bucket() {
        let mut session = Session {
            current_walkthrough: Some("w1".to_string()),
            completed_walkthroughs: Vec::new(),
        };

        session.complete("w1");
        assert!(session.current_walkthrough.is_none());
        assert_eq!(session.completed_walkthroughs, vec!["w1".to_string()]);

        // Completing again must not duplicate the entry.
        session.complete("w1");
        assert_eq!(session.completed_walkthroughs.len(), 1);
    }
}
