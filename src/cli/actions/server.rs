use crate::api;
use crate::auth::{
    credentials::{CredentialRepository, InMemoryCredentials, SeedCredential},
    AuthConfig, AuthState, GateMode, TeardownPolicy,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub token_ttl_seconds: u64,
    pub teardown_policy: TeardownPolicy,
    pub gate_mode: GateMode,
    pub credentials_file: Option<PathBuf>,
    pub frontend_base_url: String,
}

/// Handle the server action
pub async fn handle(action: crate::cli::actions::Action) -> Result<()> {
    let crate::cli::actions::Action::Server(args) = action;

    let credentials = load_credentials(args.credentials_file.as_deref())?;

    let config = AuthConfig::new()
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_teardown_policy(args.teardown_policy)
        .with_gate_mode(args.gate_mode)
        .with_frontend_base_url(args.frontend_base_url);

    info!(gate_mode = ?args.gate_mode, "starting gateway");

    let state = Arc::new(AuthState::new(config, credentials));

    api::serve(args.port, state).await
}

fn load_credentials(path: Option<&std::path::Path>) -> Result<Arc<dyn CredentialRepository>> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
            let seeds: Vec<SeedCredential> = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid credentials file: {}", path.display()))?;
            info!(accounts = seeds.len(), "seeding credentials from file");
            Ok(Arc::new(InMemoryCredentials::from_seeds(seeds)?))
        }
        None => {
            info!("no credentials file given, seeding demo accounts");
            Ok(Arc::new(InMemoryCredentials::demo()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn load_credentials_defaults_to_demo_accounts() -> Result<()> {
        let repo = load_credentials(None)?;
        let record = repo.authenticate("admin", &SecretString::from("123456".to_string()));
        assert!(record.is_ok());
        Ok(())
    }

    #[test]
    fn load_credentials_rejects_missing_file() {
        let result = load_credentials(Some(std::path::Path::new("/nonexistent/seeds.json")));
        assert!(result.is_err());
    }
}
