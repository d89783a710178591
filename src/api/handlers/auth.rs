//! Authentication endpoints: login, registration stub, session probe, self
//! info, and logout.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::{extract_client_ip, require_auth, valid_email, valid_username, Envelope};
use crate::auth::{gate, token::LoginDevice, AuthState};

const DEFAULT_DEVICE: &str = "web";

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(register))
        .routes(routes!(session))
        .routes(routes!(me))
        .routes(routes!(logout))
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Device tag recorded in the token session, e.g. "web" or "app".
    pub device: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = Envelope),
        (status = 401, description = "Invalid username or password", body = Envelope)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(Envelope::error(StatusCode::BAD_REQUEST, "Missing payload")),
        )
            .into_response();
    };

    let password = SecretString::from(request.password);
    let device = LoginDevice::new(
        request.device.unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
        extract_client_ip(&headers),
    );

    match state
        .authenticator()
        .login(&request.username, &password, device)
        .await
    {
        Ok(issued) => Json(Envelope::ok(json!({
            "token": issued.token,
            "username": issued.principal.login_id,
            "role": issued.principal.role,
            "permissions": issued.principal.permissions,
        })))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration acknowledged", body = Envelope),
        (status = 400, description = "Invalid registration input", body = Envelope)
    ),
    tag = "auth"
)]
// Registration is a stub: input is validated, nothing is persisted. The
// credential store is immutable after bootstrap.
pub async fn register(payload: Option<Json<RegisterRequest>>) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(Envelope::error(StatusCode::BAD_REQUEST, "Missing payload")),
        );
    };

    if !valid_username(&request.username) {
        return (
            StatusCode::BAD_REQUEST,
            Json(Envelope::error(StatusCode::BAD_REQUEST, "Invalid username")),
        );
    }
    if !valid_email(&request.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(Envelope::error(StatusCode::BAD_REQUEST, "Invalid email")),
        );
    }

    debug!(username = %request.username, "registration acknowledged");
    (StatusCode::OK, Json(Envelope::ack("registration accepted")))
}

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Login state of the presented token", body = Envelope)
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let token = gate::bearer_token(&headers);
    let is_login = match &token {
        Some(token) => state.authenticator().is_login(token).await,
        None => false,
    };
    Json(Envelope::ok(json!({
        "is_login": is_login,
        "token": token,
    })))
}

#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Resolved principal", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tag = "auth"
)]
pub async fn me(headers: HeaderMap, state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    match require_auth(&headers, &state).await {
        Ok(principal) => Json(Envelope::ok(json!({
            "login_id": principal.login_id,
            "role": principal.role,
            "permissions": principal.permissions,
        })))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 200, description = "Token invalidated", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let Some(token) = gate::bearer_token(&headers) else {
        return crate::auth::AuthError::NotAuthenticated.into_response();
    };
    match state.authenticator().logout(&token).await {
        Ok(()) => Json(Envelope::ack("logged out")).into_response(),
        Err(err) => err.into_response(),
    }
}
