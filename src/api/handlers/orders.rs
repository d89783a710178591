//! Orders module: mock order payloads behind the `orders` permission.

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
    RoutePredicate::require_permission(&["orders"])
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list))
        .routes(routes!(create))
        .routes(routes!(update, remove))
}

#[utoipa::path(
    get,
    path = "/v1/orders/list",
    responses(
        (status = 200, description = "Orders of the caller", body = Envelope),
        (status = 403, description = "Missing the orders permission", body = Envelope)
    ),
    tag = "orders"
)]
pub async fn list(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "orders": [
            {"id": 1001, "state": "paid", "owner": principal.login_id},
            {"id": 1002, "state": "shipped", "owner": principal.login_id},
        ],
    })))
}

#[utoipa::path(
    post,
    path = "/v1/orders",
    responses(
        (status = 200, description = "Order placed", body = Envelope),
        (status = 403, description = "Missing the orders permission", body = Envelope)
    ),
    tag = "orders"
)]
pub async fn create(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "placed": {"id": 1003, "state": "created"},
        "by": principal.login_id,
    })))
}

#[utoipa::path(
    put,
    path = "/v1/orders/{id}",
    params(("id" = u64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order updated", body = Envelope),
        (status = 403, description = "Missing the orders permission", body = Envelope)
    ),
    tag = "orders"
)]
pub async fn update(Extension(principal): Extension<Principal>, Path(id): Path<u64>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "updated": id,
        "by": principal.login_id,
    })))
}

#[utoipa::path(
    delete,
    path = "/v1/orders/{id}",
    params(("id" = u64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = Envelope),
        (status = 403, description = "Missing the orders permission", body = Envelope)
    ),
    tag = "orders"
)]
pub async fn remove(Extension(principal): Extension<Principal>, Path(id): Path<u64>) -> impl IntoResponse {
    Json(Envelope::ok(json!({
        "cancelled": id,
        "by": principal.login_id,
    })))
}
