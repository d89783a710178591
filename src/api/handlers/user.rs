//! User module: mock directory payloads behind the `user` permission.

use axum::{extract::Extension, response::IntoResponse, Json};
use serde_json::json;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::Envelope;
use crate::auth::{gate::RoutePredicate, Principal};

#[must_use]
pub fn requirement() -> RoutePredicate {
    RoutePredicate::require_permission(&["user"])
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list))
        .routes(routes!(profile))
}

#[utoipa::path(
    get,
    path = "/v1/user/list",
    responses(
        (status = 200, description = "User directory", body = Envelope),
        (status = 401, description = "Not authenticated", body = Envelope),
        (status = 403, description = "Missing the user permission", body = Envelope)
    ),
    tag = "user"
)]
pub async fn list(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "users": [
            {"login_id": "admin", "role": "admin"},
            {"login_id": "super", "role": "super-admin"},
            {"login_id": "user", "role": "user"},
            {"login_id": "trade", "role": "user"},
        ],
        "viewer": principal.login_id,
    })))
}

#[utoipa::path(
    get,
    path = "/v1/user/profile",
    responses(
        (status = 200, description = "Profile of the caller", body = Envelope),
        (status = 401, description = "Not authenticated", body = Envelope),
        (status = 403, description = "Missing the user permission", body = Envelope)
    ),
    tag = "user"
)]
pub async fn profile(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "login_id": principal.login_id,
        "role": principal.role,
        "permissions": principal.permissions,
        "nickname": format!("{}@pordisto", principal.login_id),
    })))
}
