//! Goods module: mock catalog payloads behind the `goods` permission.

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
    RoutePredicate::require_permission(&["goods"])
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list))
        .routes(routes!(create))
        .routes(routes!(update, remove))
}

#[utoipa::path(
    get,
    path = "/v1/goods/list",
    responses(
        (status = 200, description = "Catalog listing", body = Envelope),
        (status = 403, description = "Missing the goods permission", body = Envelope)
    ),
    tag = "goods"
)]
pub async fn list(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "items": [
            {"id": 1, "name": "keyboard", "stock": 42},
            {"id": 2, "name": "monitor", "stock": 7},
            {"id": 3, "name": "dock", "stock": 0},
        ],
        "viewer": principal.login_id,
    })))
}

#[utoipa::path(
    post,
    path = "/v1/goods",
    responses(
        (status = 200, description = "Item created", body = Envelope),
        (status = 403, description = "Missing the goods permission", body = Envelope)
    ),
    tag = "goods"
)]
pub async fn create(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "created": {"id": 4, "name": "draft item"},
        "by": principal.login_id,
    })))
}

#[utoipa::path(
    put,
    path = "/v1/goods/{id}",
    params(("id" = u64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item updated", body = Envelope),
        (status = 403, description = "Missing the goods permission", body = Envelope)
    ),
    tag = "goods"
)]
pub async fn update(Extension(principal): Extension<Principal>, Path(id): Path<u64>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "updated": id,
        "by": principal.login_id,
    })))
}

#[utoipa::path(
    delete,
    path = "/v1/goods/{id}",
    params(("id" = u64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item removed", body = Envelope),
        (status = 403, description = "Missing the goods permission", body = Envelope)
    ),
    tag = "goods"
)]
pub async fn remove(Extension(principal): Extension<Principal>, Path(id): Path<u64>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "removed": id,
        "by": principal.login_id,
    })))
}
