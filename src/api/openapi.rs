//! Route registration and the generated `OpenAPI` document.
//!
//! Every documented endpoint is wired here via `.routes(routes!(...))` so it
//! is both served and present in the spec. The resource modules are attached
//! through [`app_router`], which applies the configured gate wiring.

use axum::{
    extract::Request,
    middleware::{self, Next},
    Router,
};
use utoipa::openapi::{Contact, InfoBuilder, OpenApi, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::handlers::{admin, auth, comment, goods, health, notice, orders, session, user};
use crate::auth::{
    gate::{self, RoutePredicate},
    GateMode,
};

#[must_use]
pub fn openapi() -> OpenApi {
    // Reuse the same wiring and only keep the generated document. The gate
    // mode does not change the route set, so either mode produces the spec.
    let (_router, openapi) = app_router(GateMode::Declarative);
    openapi
}

/// Resource modules and their declared requirements, one entry per group.
fn modules() -> Vec<(OpenApiRouter, RoutePredicate)> {
    vec![
        (user::router(), user::requirement()),
        (goods::router(), goods::requirement()),
        (orders::router(), orders::requirement()),
        (notice::router(), notice::requirement()),
        (comment::router(), comment::requirement()),
        (admin::router(), admin::requirement()),
    ]
}

/// Build the served router plus the `OpenAPI` document for one gate mode.
///
/// Declarative mode attaches each module's predicate next to its routes;
/// interceptor mode leaves the modules bare and layers one middleware that
/// consults the central route table. Both must decide identically.
pub(crate) fn app_router(mode: GateMode) -> (Router, OpenApi) {
    let base = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .merge(auth::router())
        .merge(session::router());
    let (mut app, mut api) = base.split_for_parts();

    for (module, predicate) in modules() {
        let (module_router, module_api) = module.split_for_parts();
        let module_router = match mode {
            GateMode::Declarative => {
                module_router.route_layer(middleware::from_fn(
                    move |request: Request, next: Next| {
                        let predicate = predicate.clone();
                        async move { gate::declared(predicate, request, next).await }
                    },
                ))
            }
            GateMode::Interceptor => module_router,
        };
        app = app.merge(module_router);
        api.merge(module_api);
    }

    if mode == GateMode::Interceptor {
        app = app.layer(middleware::from_fn(gate::interceptor));
    }

    api.tags = Some(tags());

    (app, api)
}

fn tags() -> Vec<Tag> {
    let tag = |name: &str, description: &str| {
        let mut tag = Tag::new(name);
        tag.description = Some(description.to_string());
        tag
    };
    vec![
        tag("auth", "Login, logout, and token introspection"),
        tag("session", "Account, token, and named session attributes"),
        tag("user", "User directory module"),
        tag("goods", "Catalog module"),
        tag("orders", "Orders module"),
        tag("notice", "Notice board module"),
        tag("comment", "Comment module"),
        tag("admin", "Operator module"),
        tag("health", "Liveness probe"),
    ]
}

fn cargo_openapi() -> OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors may include "Name <email>".
    let author = env!("CARGO_PKG_AUTHORS").split(';').next()?.trim();
    let (name, email) = match author.split_once('<') {
        Some((name, rest)) => (name.trim(), Some(rest.trim_end_matches('>').trim())),
        None => (author, None),
    };
    if name.is_empty() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = (!name.is_empty()).then(|| name.to_string());
    contact.email = email.filter(|email| !email.is_empty()).map(str::to_string);
    Some(contact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Pordisto"));
            assert_eq!(contact.email.as_deref(), Some("team@pordisto.dev"));
        }
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "auth"));
        assert!(tags.iter().any(|tag| tag.name == "admin"));

        assert!(spec.paths.paths.contains_key("/v1/auth/login"));
        assert!(spec.paths.paths.contains_key("/v1/auth/logout"));
        assert!(spec.paths.paths.contains_key("/v1/admin/dashboard"));
        assert!(spec.paths.paths.contains_key("/v1/goods/{id}"));
        assert!(spec
            .paths
            .paths
            .contains_key("/v1/session/custom/{name}/{attribute}"));
    }

    #[test]
    fn both_gate_modes_register_the_same_paths() {
        let (_declarative, api_a) = app_router(GateMode::Declarative);
        let (_interceptor, api_b) = app_router(GateMode::Interceptor);
        let paths_a: Vec<_> = api_a.paths.paths.keys().cloned().collect();
        let paths_b: Vec<_> = api_b.paths.paths.keys().cloned().collect();
        assert_eq!(paths_a, paths_b);
    }
}
