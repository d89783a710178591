//! Comment module, gated on the `comment` permission.

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
    RoutePredicate::require_permission(&["comment"])
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list))
        .routes(routes!(publish))
        .routes(routes!(remove))
}

#[utoipa::path(
    get,
    path = "/v1/comment/list",
    responses(
        (status = 200, description = "Recent comments", body = Envelope),
        (status = 403, description = "Missing the comment permission", body = Envelope)
    ),
    tag = "comment"
)]
pub async fn list(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "comments": [
            {"id": 1, "body": "arrived quickly", "author": "user"},
            {"id": 2, "body": "exactly as described", "author": "trade"},
        ],
        "viewer": principal.login_id,
    })))
}

#[utoipa::path(
    post,
    path = "/v1/comment",
    responses(
        (status = 200, description = "Comment published", body = Envelope),
        (status = 403, description = "Missing the comment permission", body = Envelope)
    ),
    tag = "comment"
)]
pub async fn publish(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "published": {"id": 3},
        "by": principal.login_id,
    })))
}

#[utoipa::path(
    delete,
    path = "/v1/comment/{id}",
    params(("id" = u64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment removed", body = Envelope),
        (status = 403, description = "Missing the comment permission", body = Envelope)
    ),
    tag = "comment"
)]
pub async fn remove(Extension(principal): Extension<Principal>, Path(id): Path<u64>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "removed": id,
        "by": principal.login_id,
    })))
}
