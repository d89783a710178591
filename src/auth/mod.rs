//! Authentication and authorization: credentials, tokens, the gate.

pub mod authenticator;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod token;

pub use authenticator::{Authenticator, IssuedToken, Principal};
pub use error::AuthError;

use credentials::CredentialRepository;
use gate::RouteTable;
use std::sync::Arc;

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 12 * 60 * 60;
const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:8080";

/// What happens to the account session when the last live token of a login id
/// is logged out. Deliberately configurable, never hard-coded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeardownPolicy {
    /// Keep the account session; it expires on its own.
    Retain,
    /// Destroy the account session together with the last token.
    Destroy,
}

impl std::str::FromStr for TeardownPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "retain" => Ok(Self::Retain),
            "destroy" => Ok(Self::Destroy),
            other => Err(format!("invalid teardown policy: {other}")),
        }
    }
}

/// Which of the two equivalent gate wirings the server runs with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateMode {
    /// Predicates attached next to each route group.
    Declarative,
    /// One middleware consulting the central route table.
    Interceptor,
}

impl std::str::FromStr for GateMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "declarative" => Ok(Self::Declarative),
            "interceptor" => Ok(Self::Interceptor),
            other => Err(format!("invalid gate mode: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    token_ttl_seconds: u64,
    teardown_policy: TeardownPolicy,
    gate_mode: GateMode,
    frontend_base_url: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            teardown_policy: TeardownPolicy::Retain,
            gate_mode: GateMode::Declarative,
            frontend_base_url: DEFAULT_FRONTEND_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_teardown_policy(mut self, policy: TeardownPolicy) -> Self {
        self.teardown_policy = policy;
        self
    }

    #[must_use]
    pub fn with_gate_mode(mut self, mode: GateMode) -> Self {
        self.gate_mode = mode;
        self
    }

    #[must_use]
    pub fn with_frontend_base_url(mut self, url: String) -> Self {
        self.frontend_base_url = url;
        self
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn teardown_policy(&self) -> TeardownPolicy {
        self.teardown_policy
    }

    #[must_use]
    pub fn gate_mode(&self) -> GateMode {
        self.gate_mode
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared server state: the authenticator plus the central route table.
pub struct AuthState {
    authenticator: Authenticator,
    table: RouteTable,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, credentials: Arc<dyn CredentialRepository>) -> Self {
        Self {
            authenticator: Authenticator::new(config, credentials),
            table: RouteTable::standard(),
        }
    }

    #[must_use]
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}
