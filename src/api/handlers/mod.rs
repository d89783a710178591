//! API handlers and shared utilities for the gateway.
//!
//! This module organizes the route handlers and provides the response
//! envelope, the bearer-token principal resolution used by self-service
//! endpoints, and small request helpers.

pub mod admin;
pub mod auth;
pub mod comment;
pub mod goods;
pub mod health;
pub mod notice;
pub mod orders;
pub mod root;
pub mod session;
pub mod user;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::{gate, AuthError, AuthState, Principal};

/// Uniform response envelope: `code` signals the success/failure class,
/// `data` carries the payload when there is one.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Envelope {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: "ok".to_string(),
            data: Some(data),
        }
    }

    #[must_use]
    pub fn ack(message: &str) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: message.to_string(),
            data: None,
        }
    }

    #[must_use]
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self {
            code: status.as_u16(),
            message: message.to_string(),
            data: None,
        }
    }
}

// Predicate failures and auth errors become terminal enveloped responses; the
// handler behind the gate never runs partially.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            // Full cause goes to the log, never to the caller.
            error!("internal error: {err:?}");
        }
        let status = self.status();
        (status, Json(Envelope::error(status, &self.to_string()))).into_response()
    }
}

/// Resolve the bearer token into a principal, or fail with 401.
///
/// # Errors
/// Returns `NotAuthenticated` when the token is missing, unknown, or expired.
pub(crate) async fn require_auth(
    headers: &HeaderMap,
    state: &AuthState,
) -> Result<Principal, AuthError> {
    let token = gate::bearer_token(headers).ok_or(AuthError::NotAuthenticated)?;
    state.authenticator().current_principal(&token).await
}

/// Basic username sanity check used before touching the credential store.
pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_-]{2,32}$").is_ok_and(|re| re.is_match(username))
}

/// Basic email format check for the registration stub.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Extract a client IP from common proxy headers for login metadata.
pub(crate) fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn envelope_ok_carries_data() {
        let envelope = Envelope::ok(json!({"answer": 42}));
        assert_eq!(envelope.code, 200);
        assert_eq!(envelope.message, "ok");
        assert_eq!(envelope.data, Some(json!({"answer": 42})));
    }

    #[test]
    fn envelope_error_has_no_data() -> anyhow::Result<()> {
        let envelope = Envelope::error(StatusCode::FORBIDDEN, "forbidden");
        let value = serde_json::to_value(&envelope)?;
        assert_eq!(value.get("code"), Some(&json!(403)));
        assert_eq!(value.get("data"), None);
        Ok(())
    }

    #[test]
    fn valid_username_accepts_reasonable_names() {
        assert!(valid_username("admin"));
        assert!(valid_username("user_42"));
        assert!(!valid_username("a"));
        assert!(!valid_username("has space"));
        assert!(!valid_username(""));
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn extract_client_ip_prefers_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 5.6.7.8"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(extract_client_ip(&headers), Some("1.2.3.4".to_string()));
    }

    #[test]
    fn extract_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(extract_client_ip(&headers), Some("9.9.9.9".to_string()));
    }

    #[test]
    fn extract_client_ip_none_when_missing() {
        assert_eq!(extract_client_ip(&HeaderMap::new()), None);
    }
}
