//! Session attribute endpoints for the three session scopes.
//!
//! Account and token scopes require a valid bearer token; the account scope is
//! shared across every token of the login id while the token scope is private
//! to the presented token. Custom sessions are open to anonymous callers by
//! design: whoever knows the name reads and writes the same bag.

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::{require_auth, Envelope};
use crate::auth::{gate, AuthError, AuthState};

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(account_get, account_set))
        .routes(routes!(token_get, token_set))
        .routes(routes!(custom_get, custom_set))
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SetAttributeRequest {
    pub value: Value,
}

fn attribute_payload(attribute: &str, value: Option<Value>) -> Envelope {
    // Absent attributes read as null, not as an error.
    Envelope::ok(json!({
        "attribute": attribute,
        "value": value,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/session/account/{attribute}",
    params(("attribute" = String, Path, description = "Attribute name")),
    responses(
        (status = 200, description = "Attribute from the account session", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tag = "session"
)]
pub async fn account_get(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    Path(attribute): Path<String>,
) -> impl IntoResponse {
    match require_auth(&headers, &state).await {
        Ok(principal) => {
            let value = state
                .authenticator()
                .sessions()
                .for_account(&principal.login_id)
                .get(&attribute)
                .await;
            Json(attribute_payload(&attribute, value)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/v1/session/account/{attribute}",
    params(("attribute" = String, Path, description = "Attribute name")),
    request_body = SetAttributeRequest,
    responses(
        (status = 200, description = "Attribute stored", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tag = "session"
)]
pub async fn account_set(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    Path(attribute): Path<String>,
    Json(request): Json<SetAttributeRequest>,
) -> impl IntoResponse {
    match require_auth(&headers, &state).await {
        Ok(principal) => {
            state
                .authenticator()
                .sessions()
                .for_account(&principal.login_id)
                .set(&attribute, request.value)
                .await;
            Json(Envelope::ack("stored")).into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/session/token/{attribute}",
    params(("attribute" = String, Path, description = "Attribute name")),
    responses(
        (status = 200, description = "Attribute from the token session", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tag = "session"
)]
pub async fn token_get(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    Path(attribute): Path<String>,
) -> impl IntoResponse {
    // Validates the token and keys the bag by the token itself.
    if let Err(err) = require_auth(&headers, &state).await {
        return err.into_response();
    }
    let Some(token) = gate::bearer_token(&headers) else {
        return AuthError::NotAuthenticated.into_response();
    };
    let value = state
        .authenticator()
        .sessions()
        .for_token(&token)
        .get(&attribute)
        .await;
    Json(attribute_payload(&attribute, value)).into_response()
}

#[utoipa::path(
    put,
    path = "/v1/session/token/{attribute}",
    params(("attribute" = String, Path, description = "Attribute name")),
    request_body = SetAttributeRequest,
    responses(
        (status = 200, description = "Attribute stored", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tag = "session"
)]
pub async fn token_set(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    Path(attribute): Path<String>,
    Json(request): Json<SetAttributeRequest>,
) -> impl IntoResponse {
    if let Err(err) = require_auth(&headers, &state).await {
        return err.into_response();
    }
    let Some(token) = gate::bearer_token(&headers) else {
        return AuthError::NotAuthenticated.into_response();
    };
    state
        .authenticator()
        .sessions()
        .for_token(&token)
        .set(&attribute, request.value)
        .await;
    Json(Envelope::ack("stored")).into_response()
}

#[utoipa::path(
    get,
    path = "/v1/session/custom/{name}/{attribute}",
    params(
        ("name" = String, Path, description = "Session name"),
        ("attribute" = String, Path, description = "Attribute name")
    ),
    responses(
        (status = 200, description = "Attribute from the named session", body = Envelope)
    ),
    tag = "session"
)]
pub async fn custom_get(
    state: Extension<Arc<AuthState>>,
    Path((name, attribute)): Path<(String, String)>,
) -> impl IntoResponse {
    let value = state
        .authenticator()
        .sessions()
        .for_custom(&name)
        .get(&attribute)
        .await;
    Json(attribute_payload(&attribute, value))
}

#[utoipa::path(
    put,
    path = "/v1/session/custom/{name}/{attribute}",
    params(
        ("name" = String, Path, description = "Session name"),
        ("attribute" = String, Path, description = "Attribute name")
    ),
    request_body = SetAttributeRequest,
    responses(
        (status = 200, description = "Attribute stored", body = Envelope)
    ),
    tag = "session"
)]
pub async fn custom_set(
    state: Extension<Arc<AuthState>>,
    Path((name, attribute)): Path<(String, String)>,
    Json(request): Json<SetAttributeRequest>,
) -> impl IntoResponse {
    state
        .authenticator()
        .sessions()
        .for_custom(&name)
        .set(&attribute, request.value)
        .await;
    Json(Envelope::ack("stored"))
}
