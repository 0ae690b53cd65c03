//! Anonymous sign-up and ID-token lifecycle.
//!
//! The device authenticates as an anonymous Firebase user:
//!
//! 1. `POST identitytoolkit …/accounts:signUp?key=<api key>` with
//!    `{"returnSecureToken": true}` → `idToken`, `refreshToken`, `expiresIn`
//! 2. Every database request carries `?auth=<idToken>`
//! 3. Shortly before `expiresIn` elapses the device exchanges the refresh
//!    token at `securetoken …/token` for a fresh ID token
//!
//! Sign-up is attempted exactly once at boot.  Refresh failures only make
//! the client report "not ready" until a later refresh succeeds.

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

const SIGN_UP_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signUp";
const REFRESH_ENDPOINT: &str = "https://securetoken.googleapis.com/v1/token";

pub fn sign_up_url(api_key: &str) -> String {
    format!("{SIGN_UP_ENDPOINT}?key={api_key}")
}

pub fn refresh_url(api_key: &str) -> String {
    format!("{REFRESH_ENDPOINT}?key={api_key}")
}

/// Form-encoded body for the token refresh endpoint.
pub fn refresh_body(refresh_token: &str) -> String {
    format!("grant_type=refresh_token&refresh_token={refresh_token}")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub return_secure_token: bool,
}

impl Default for SignUpRequest {
    fn default() -> Self {
        Self {
            return_secure_token: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub id_token: String,
    pub refresh_token: String,
    /// Lifetime in seconds, sent as a decimal string.
    pub expires_in: String,
    #[serde(default)]
    pub local_id: String,
}

/// The secure-token endpoint answers in snake_case.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

/// Error envelope returned by the Google identity endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

/// Extract the server's error message (e.g. `ADMIN_ONLY_OPERATION`) for logging.
pub fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ApiErrorResponse>(body)
        .ok()
        .map(|e| e.error.message)
}

/// Live credentials of the anonymous user.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub uid: String,
    id_token: String,
    refresh_token: String,
    /// Monotonic deadline (milliseconds since boot).
    expires_at_ms: u64,
}

fn parse_lifetime_ms(expires_in: &str) -> Result<u64, RemoteError> {
    expires_in
        .trim()
        .parse::<u64>()
        .map(|secs| secs.saturating_mul(1000))
        .map_err(|_| RemoteError::Malformed("expiresIn"))
}

impl AuthSession {
    pub fn from_sign_up(resp: SignUpResponse, now_ms: u64) -> Result<Self, RemoteError> {
        if resp.id_token.is_empty() {
            return Err(RemoteError::Malformed("empty idToken"));
        }
        let lifetime = parse_lifetime_ms(&resp.expires_in)?;
        Ok(Self {
            uid: resp.local_id,
            id_token: resp.id_token,
            refresh_token: resp.refresh_token,
            expires_at_ms: now_ms.saturating_add(lifetime),
        })
    }

    /// Install a refreshed token pair.
    pub fn apply_refresh(&mut self, resp: RefreshResponse, now_ms: u64) -> Result<(), RemoteError> {
        if resp.id_token.is_empty() {
            return Err(RemoteError::Malformed("empty id_token"));
        }
        let lifetime = parse_lifetime_ms(&resp.expires_in)?;
        self.id_token = resp.id_token;
        self.refresh_token = resp.refresh_token;
        self.expires_at_ms = now_ms.saturating_add(lifetime);
        Ok(())
    }

    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// True once `now` is within `margin_secs` of expiry.
    pub fn needs_refresh(&self, now_ms: u64, margin_secs: u32) -> bool {
        now_ms.saturating_add(u64::from(margin_secs) * 1000) >= self.expires_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(expires_in: &str) -> SignUpResponse {
        serde_json::from_str(&format!(
            r#"{{"kind":"identitytoolkit#SignupNewUserResponse","idToken":"id-1",
                "refreshToken":"rt-1","expiresIn":"{expires_in}","localId":"uid-9"}}"#
        ))
        .unwrap()
    }

    #[test]
    fn sign_up_request_is_camel_case() {
        let body = serde_json::to_string(&SignUpRequest::default()).unwrap();
        assert_eq!(body, r#"{"returnSecureToken":true}"#);
    }

    #[test]
    fn session_from_sign_up() {
        let s = AuthSession::from_sign_up(sign_up("3600"), 10_000).unwrap();
        assert_eq!(s.id_token(), "id-1");
        assert_eq!(s.refresh_token(), "rt-1");
        assert_eq!(s.uid, "uid-9");
        assert!(!s.is_expired(10_000 + 3_599_999));
        assert!(s.is_expired(10_000 + 3_600_000));
    }

    #[test]
    fn refresh_margin() {
        let s = AuthSession::from_sign_up(sign_up("3600"), 0).unwrap();
        assert!(!s.needs_refresh(3_000_000, 300));
        assert!(s.needs_refresh(3_300_000, 300));
    }

    #[test]
    fn bad_lifetime_rejected() {
        let err = AuthSession::from_sign_up(sign_up("soon"), 0).unwrap_err();
        assert_eq!(err, RemoteError::Malformed("expiresIn"));
    }

    #[test]
    fn refresh_replaces_tokens() {
        let mut s = AuthSession::from_sign_up(sign_up("3600"), 0).unwrap();
        let resp: RefreshResponse = serde_json::from_str(
            r#"{"id_token":"id-2","refresh_token":"rt-2","expires_in":"3600","user_id":"uid-9"}"#,
        )
        .unwrap();
        s.apply_refresh(resp, 3_400_000).unwrap();
        assert_eq!(s.id_token(), "id-2");
        assert!(!s.needs_refresh(3_400_000, 300));
    }

    #[test]
    fn error_envelope_message() {
        let body = br#"{"error":{"code":400,"message":"ADMIN_ONLY_OPERATION","errors":[]}}"#;
        assert_eq!(error_message(body).as_deref(), Some("ADMIN_ONLY_OPERATION"));
        assert_eq!(error_message(b"<html>"), None);
    }

    #[test]
    fn endpoint_urls() {
        assert!(sign_up_url("KEY").ends_with("accounts:signUp?key=KEY"));
        assert!(refresh_url("KEY").ends_with("/v1/token?key=KEY"));
        assert_eq!(
            refresh_body("abc"),
            "grant_type=refresh_token&refresh_token=abc"
        );
    }
}
