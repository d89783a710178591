//! Command-line argument dispatch and server initialization.
//!
//! This module maps validated CLI arguments to the action to execute, which
//! for this binary is starting the gateway with its full configuration.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        teardown_policy: auth_opts.teardown_policy,
        gate_mode: auth_opts.gate_mode,
        credentials_file: auth_opts.credentials_file,
        frontend_base_url: auth_opts.frontend_base_url,
    }))
}
