//! Admin module: requires an admin-class role AND the `admin` permission.
//!
//! This is the one route group with a conjunction predicate; both halves must
//! pass or the gate rejects with 403 before any handler here runs.

use axum::{extract::Extension, response::IntoResponse, Json};
use serde_json::json;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::Envelope;
use crate::auth::{gate::RoutePredicate, Principal};

#[must_use]
pub fn requirement() -> RoutePredicate {
    RoutePredicate::require_both(&["admin", "super-admin"], &["admin"])
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(dashboard))
        .routes(routes!(settings))
}

#[utoipa::path(
    get,
    path = "/v1/admin/dashboard",
    responses(
        (status = 200, description = "Operator dashboard", body = Envelope),
        (status = 401, description = "Not authenticated", body = Envelope),
        (status = 403, description = "Role or permission predicate failed", body = Envelope)
    ),
    tag = "admin"
)]
pub async fn dashboard(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "operator": principal.login_id,
        "role": principal.role,
        "modules": ["user", "goods", "orders", "notice", "comment"],
        "pending_reports": 0,
    })))
}

#[utoipa::path(
    put,
    path = "/v1/admin/settings",
    responses(
        (status = 200, description = "Settings accepted", body = Envelope),
        (status = 401, description = "Not authenticated", body = Envelope),
        (status = 403, description = "Role or permission predicate failed", body = Envelope)
    ),
    tag = "admin"
)]
pub async fn settings(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "applied": true,
        "by": principal.login_id,
    })))
}
