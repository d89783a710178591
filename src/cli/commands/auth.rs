//! Auth-related CLI arguments: token TTL, teardown policy, gate mode, seeds.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

use crate::auth::{GateMode, TeardownPolicy};

pub const ARG_TOKEN_TTL: &str = "token-ttl-seconds";
pub const ARG_ACCOUNT_TEARDOWN: &str = "account-teardown";
pub const ARG_GATE_MODE: &str = "gate-mode";
pub const ARG_CREDENTIALS_FILE: &str = "credentials-file";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

pub struct Options {
    pub token_ttl_seconds: u64,
    pub teardown_policy: TeardownPolicy,
    pub gate_mode: GateMode,
    pub credentials_file: Option<PathBuf>,
    pub frontend_base_url: String,
}

impl Options {
    /// Read the auth options out of validated matches.
    ///
    /// # Errors
    /// Returns an error if an argument value does not parse.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let token_ttl_seconds = matches
            .get_one::<u64>(ARG_TOKEN_TTL)
            .copied()
            .context("missing required argument: --token-ttl-seconds")?;
        let teardown_policy = matches
            .get_one::<String>(ARG_ACCOUNT_TEARDOWN)
            .context("missing required argument: --account-teardown")?
            .parse::<TeardownPolicy>()
            .map_err(|e| anyhow::anyhow!(e))?;
        let gate_mode = matches
            .get_one::<String>(ARG_GATE_MODE)
            .context("missing required argument: --gate-mode")?
            .parse::<GateMode>()
            .map_err(|e| anyhow::anyhow!(e))?;
        let credentials_file = matches.get_one::<PathBuf>(ARG_CREDENTIALS_FILE).cloned();
        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .context("missing required argument: --frontend-base-url")?;
        Ok(Self {
            token_ttl_seconds,
            teardown_policy,
            gate_mode,
            credentials_file,
            frontend_base_url,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_TTL)
                .long(ARG_TOKEN_TTL)
                .help("Seconds an issued token stays valid")
                .default_value("43200")
                .env("PORDISTO_TOKEN_TTL_SECONDS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_ACCOUNT_TEARDOWN)
                .long(ARG_ACCOUNT_TEARDOWN)
                .help("Account session policy when the last token logs out")
                .default_value("retain")
                .env("PORDISTO_ACCOUNT_TEARDOWN")
                .value_parser(["retain", "destroy"]),
        )
        .arg(
            Arg::new(ARG_GATE_MODE)
                .long(ARG_GATE_MODE)
                .help("Gate wiring: per-route declarations or the central route table")
                .default_value("declarative")
                .env("PORDISTO_GATE_MODE")
                .value_parser(["declarative", "interceptor"]),
        )
        .arg(
            Arg::new(ARG_CREDENTIALS_FILE)
                .long(ARG_CREDENTIALS_FILE)
                .help("JSON seed credentials; built-in demo accounts when omitted")
                .env("PORDISTO_CREDENTIALS_FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend origin allowed by CORS")
                .default_value("http://localhost:8080")
                .env("PORDISTO_FRONTEND_BASE_URL"),
        )
}
