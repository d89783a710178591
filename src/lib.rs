//! # Pordisto (Session-Based Authorization Gateway)
//!
//! `pordisto` sits in front of a set of resource modules and decides, per
//! request, whether the caller may reach the handler behind a route. It
//! authenticates username/password credentials, issues opaque bearer tokens,
//! and evaluates role/permission predicates before any handler runs.
//!
//! ## Session Model
//!
//! Three session scopes share one key/value-with-lifecycle abstraction:
//!
//! - **Account session**: keyed by login id, shared by every token the same
//!   account holds (multi-device).
//! - **Token session**: keyed by the issued token, private to one login.
//! - **Custom session**: keyed by an arbitrary name, unrelated to any login;
//!   auth events never destroy it.
//!
//! ## Authorization
//!
//! Routes declare their requirement as a [`auth::gate::RoutePredicate`]: a
//! role set (membership), a permission set (subset, AND semantics), or both.
//! The gate supports two equivalent wirings: a central path-pattern table
//! consulted by one interceptor, or per-route declarations attached next to
//! the handlers. Both produce identical allow/deny decisions.

pub mod api;
pub mod auth;
pub mod cli;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
