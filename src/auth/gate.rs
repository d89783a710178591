//! The authorization gate: allow/deny before any handler runs.
//!
//! Per request the gate moves Unchecked → resolve token → {Anonymous,
//! Authenticated}. Anonymous callers are rejected with 401 on protected
//! routes; authenticated callers must satisfy the route's predicate or get
//! 403. On success the resolved [`Principal`] is attached to the request
//! before dispatch, so handlers never re-resolve the token.
//!
//! Two wirings are supported and must stay decision-equivalent: a central
//! [`RouteTable`] consulted by [`interceptor`], and per-route declarations run
//! through [`declared`].

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use super::authenticator::Principal;
use super::error::AuthError;
use super::AuthState;

/// Requirement attached to a route, resolved once at registration time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutePredicate {
    /// Public route, token not consulted.
    None,
    /// Principal's role must be a member of the set.
    RequireRole(BTreeSet<String>),
    /// Principal must hold every tag in the set (AND semantics).
    RequirePermission(BTreeSet<String>),
    /// Both predicates must pass.
    RequireBoth {
        roles: BTreeSet<String>,
        permissions: BTreeSet<String>,
    },
}

impl RoutePredicate {
    #[must_use]
    pub fn require_role(roles: &[&str]) -> Self {
        Self::RequireRole(tag_set(roles))
    }

    #[must_use]
    pub fn require_permission(permissions: &[&str]) -> Self {
        Self::RequirePermission(tag_set(permissions))
    }

    #[must_use]
    pub fn require_both(roles: &[&str], permissions: &[&str]) -> Self {
        Self::RequireBoth {
            roles: tag_set(roles),
            permissions: tag_set(permissions),
        }
    }

    /// Evaluate against a resolved principal.
    ///
    /// # Errors
    /// Returns `Forbidden` when the principal does not satisfy the predicate.
    pub fn evaluate(&self, principal: &Principal) -> Result<(), AuthError> {
        let allowed = match self {
            Self::None => true,
            Self::RequireRole(roles) => principal.has_any_role(roles),
            Self::RequirePermission(permissions) => principal.has_all_permissions(permissions),
            Self::RequireBoth { roles, permissions } => {
                principal.has_any_role(roles) && principal.has_all_permissions(permissions)
            }
        };
        if allowed {
            Ok(())
        } else {
            debug!(login_id = %principal.login_id, predicate = ?self, "predicate rejected principal");
            Err(AuthError::Forbidden)
        }
    }
}

fn tag_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(ToString::to_string).collect()
}

/// Central path-pattern → predicate table for the interceptor wiring.
///
/// First matching rule wins; unmatched paths are public.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    rules: Vec<(String, RoutePredicate)>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rule(mut self, pattern: &str, predicate: RoutePredicate) -> Self {
        self.rules.push((pattern.to_string(), predicate));
        self
    }

    /// The gateway's standard protection rules, one per resource module.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .rule("/v1/user/**", RoutePredicate::require_permission(&["user"]))
            .rule("/v1/goods/**", RoutePredicate::require_permission(&["goods"]))
            .rule("/v1/orders/**", RoutePredicate::require_permission(&["orders"]))
            .rule("/v1/notice/**", RoutePredicate::require_permission(&["notice"]))
            .rule("/v1/comment/**", RoutePredicate::require_permission(&["comment"]))
            .rule(
                "/v1/admin/**",
                RoutePredicate::require_both(&["admin", "super-admin"], &["admin"]),
            )
    }

    #[must_use]
    pub fn matched(&self, path: &str) -> Option<&RoutePredicate> {
        self.rules
            .iter()
            .find(|(pattern, _)| path_matches(pattern, path))
            .map(|(_, predicate)| predicate)
    }
}

/// Match a registered pattern against a request path. A trailing `/**` covers
/// the bare prefix and everything below it; anything else is an exact match.
fn path_matches(pattern: &str, path: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix("/**") {
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    } else {
        pattern == path
    }
}

/// Pull the bearer token out of the `Authorization` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolve the caller and evaluate one predicate, annotating the request with
/// the principal on success. The handler never runs on failure.
async fn authorize(
    state: &AuthState,
    request: &mut Request,
    predicate: &RoutePredicate,
) -> Result<(), AuthError> {
    if matches!(predicate, RoutePredicate::None) {
        return Ok(());
    }
    let token = bearer_token(request.headers()).ok_or(AuthError::NotAuthenticated)?;
    let principal = state.authenticator().current_principal(&token).await?;
    predicate.evaluate(&principal)?;
    request.extensions_mut().insert(principal);
    Ok(())
}

/// Interceptor wiring: one middleware over the whole router, predicate looked
/// up in the configured [`RouteTable`].
pub async fn interceptor(mut request: Request, next: Next) -> Response {
    let Some(state) = request.extensions().get::<Arc<AuthState>>().cloned() else {
        return AuthError::Internal(anyhow::anyhow!(
            "auth state missing from request extensions"
        ))
        .into_response();
    };
    let predicate = state
        .table()
        .matched(request.uri().path())
        .cloned()
        .unwrap_or(RoutePredicate::None);
    match authorize(&state, &mut request, &predicate).await {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

/// Declarative wiring: the predicate is attached next to the route it guards.
pub async fn declared(predicate: RoutePredicate, mut request: Request, next: Next) -> Response {
    let Some(state) = request.extensions().get::<Arc<AuthState>>().cloned() else {
        return AuthError::Internal(anyhow::anyhow!(
            "auth state missing from request extensions"
        ))
        .into_response();
    };
    match authorize(&state, &mut request, &predicate).await {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn principal(role: &str, permissions: &[&str]) -> Principal {
        Principal {
            login_id: "tester".to_string(),
            role: role.to_string(),
            permissions: tag_set(permissions),
        }
    }

    #[test]
    fn permission_predicate_requires_subset() {
        let predicate = RoutePredicate::require_permission(&["goods"]);
        assert!(predicate
            .evaluate(&principal("user", &["admin", "user", "goods", "orders"]))
            .is_ok());
        assert!(matches!(
            predicate.evaluate(&principal("user", &["user"])),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn multi_permission_predicate_uses_and_semantics() {
        let predicate = RoutePredicate::require_permission(&["goods", "orders"]);
        assert!(predicate
            .evaluate(&principal("user", &["goods", "orders", "user"]))
            .is_ok());
        // Holding only one of the two required tags is not enough.
        assert!(predicate
            .evaluate(&principal("user", &["goods"]))
            .is_err());
    }

    #[test]
    fn role_predicate_requires_membership() {
        let predicate = RoutePredicate::require_role(&["admin", "super-admin"]);
        assert!(predicate.evaluate(&principal("super-admin", &[])).is_ok());
        assert!(predicate.evaluate(&principal("user", &[])).is_err());
    }

    #[test]
    fn both_predicate_is_a_conjunction() {
        let predicate = RoutePredicate::require_both(&["admin", "super-admin"], &["admin"]);
        assert!(predicate
            .evaluate(&principal("admin", &["admin", "user"]))
            .is_ok());
        // Right role, missing permission.
        assert!(predicate.evaluate(&principal("admin", &["user"])).is_err());
        // Right permission, wrong role.
        assert!(predicate.evaluate(&principal("user", &["admin"])).is_err());
    }

    #[test]
    fn none_predicate_always_passes() {
        assert!(RoutePredicate::None.evaluate(&principal("", &[])).is_ok());
    }

    #[test]
    fn path_matching_covers_prefix_and_exact() {
        assert!(path_matches("/v1/goods/**", "/v1/goods/list"));
        assert!(path_matches("/v1/goods/**", "/v1/goods"));
        assert!(path_matches("/v1/goods/**", "/v1/goods/1/detail"));
        assert!(!path_matches("/v1/goods/**", "/v1/goodsmore"));
        assert!(!path_matches("/v1/goods/**", "/v1/orders/list"));
        assert!(path_matches("/health", "/health"));
        assert!(!path_matches("/health", "/health/live"));
    }

    #[test]
    fn standard_table_resolves_module_predicates() {
        let table = RouteTable::standard();
        assert_eq!(
            table.matched("/v1/goods/list"),
            Some(&RoutePredicate::require_permission(&["goods"]))
        );
        assert_eq!(
            table.matched("/v1/admin/dashboard"),
            Some(&RoutePredicate::require_both(
                &["admin", "super-admin"],
                &["admin"]
            ))
        );
        assert_eq!(table.matched("/v1/auth/login"), None);
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer xyz"));
        assert_eq!(bearer_token(&headers), Some("xyz".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
