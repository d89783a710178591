//! Notice module, gated on the `notice` permission.

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::Envelope;
use crate::auth::{gate::RoutePredicate, Principal};

#[must_use]
pub fn requirement() -> RoutePredicate {
    RoutePredicate::require_permission(&["notice"])
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list))
        .routes(routes!(publish))
        .routes(routes!(remove))
}

#[utoipa::path(
    get,
    path = "/v1/notice/list",
    responses(
        (status = 200, description = "Published notices", body = Envelope),
        (status = 403, description = "Missing the notice permission", body = Envelope)
    ),
    tag = "notice"
)]
pub async fn list(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "notices": [
            {"id": 1, "title": "maintenance window"},
            {"id": 2, "title": "new catalog online"},
        ],
        "viewer": principal.login_id,
    })))
}

#[utoipa::path(
    post,
    path = "/v1/notice",
    responses(
        (status = 200, description = "Notice published", body = Envelope),
        (status = 403, description = "Missing the notice permission", body = Envelope)
    ),
    tag = "notice"
)]
pub async fn publish(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "published": {"id": 3, "title": "draft"},
        "by": principal.login_id,
    })))
}

#[utoipa::path(
    delete,
    path = "/v1/notice/{id}",
    params(("id" = u64, Path, description = "Notice id")),
    responses(
        (status = 200, description = "Notice removed", body = Envelope),
        (status = 403, description = "Missing the notice permission", body = Envelope)
    ),
    tag = "notice"
)]
pub async fn remove(Extension(principal): Extension<Principal>, Path(id): Path<u64>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "removed": id,
        "by": principal.login_id,
    })))
}
