//! Login/logout orchestration and session population.

use secrecy::SecretString;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::credentials::CredentialRepository;
use super::error::AuthError;
use super::token::{generate_token, LoginDevice, TokenStore};
use super::{AuthConfig, TeardownPolicy};
use crate::session::{SessionKey, SessionStore};

const CLAIM_ROLE: &str = "role";
const CLAIM_PERMISSIONS: &str = "permissions";

/// An authenticated actor with its role and permission set.
#[derive(Clone, Debug, serde::Serialize, utoipa::ToSchema)]
pub struct Principal {
    pub login_id: String,
    pub role: String,
    pub permissions: BTreeSet<String>,
}

impl Principal {
    /// Role predicate: pass when the principal's role is a member of the set.
    #[must_use]
    pub fn has_any_role(&self, roles: &BTreeSet<String>) -> bool {
        roles.contains(&self.role)
    }

    /// Permission predicate: pass when every required tag is held (AND).
    #[must_use]
    pub fn has_all_permissions(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.permissions)
    }
}

/// Result of a successful login.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub principal: Principal,
}

/// Validates credentials, issues tokens, and populates sessions.
pub struct Authenticator {
    config: AuthConfig,
    credentials: Arc<dyn CredentialRepository>,
    tokens: TokenStore,
    sessions: SessionStore,
}

impl Authenticator {
    #[must_use]
    pub fn new(config: AuthConfig, credentials: Arc<dyn CredentialRepository>) -> Self {
        let tokens = TokenStore::new(Duration::from_secs(config.token_ttl_seconds()));
        Self {
            config,
            credentials,
            tokens,
            sessions: SessionStore::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Validate credentials and issue a fresh token.
    ///
    /// On success the account session holds the role/permission claims and the
    /// token session records the device metadata. A failed login leaves no
    /// trace: no token, no session mutation.
    ///
    /// # Errors
    /// Returns `InvalidCredential` on unknown username or password mismatch.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
        device: LoginDevice,
    ) -> Result<IssuedToken, AuthError> {
        let record = self.credentials.authenticate(username, password)?;
        let token = generate_token()?;

        let account = self.sessions.for_account(&record.username);
        account.set(CLAIM_ROLE, json!(&record.role)).await;
        account
            .set(CLAIM_PERMISSIONS, json!(&record.permissions))
            .await;

        let token_session = self.sessions.for_token(&token);
        token_session.set("device", json!(&device.device)).await;
        token_session
            .set("login_ip", json!(&device.login_ip))
            .await;
        token_session
            .set("login_at", json!(device.login_at_unix))
            .await;

        self.tokens
            .insert(token.clone(), record.username.clone(), device)
            .await;

        info!(login_id = %record.username, "login succeeded");

        Ok(IssuedToken {
            token,
            principal: Principal {
                login_id: record.username,
                role: record.role,
                permissions: record.permissions,
            },
        })
    }

    /// Invalidate one token and destroy its token session.
    ///
    /// Other tokens of the same login id stay valid. When the last live token
    /// goes away, the account session is torn down or retained according to
    /// the configured [`TeardownPolicy`].
    ///
    /// # Errors
    /// Returns `NotAuthenticated` when the token is unknown or expired.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let record = self
            .tokens
            .remove(token)
            .await
            .ok_or(AuthError::NotAuthenticated)?;
        self.sessions
            .destroy(&SessionKey::Token(token.to_string()))
            .await;

        if self.tokens.live_count_for(&record.login_id).await == 0 {
            match self.config.teardown_policy() {
                TeardownPolicy::Destroy => {
                    debug!(login_id = %record.login_id, "last token gone, destroying account session");
                    self.sessions
                        .destroy(&SessionKey::Account(record.login_id.clone()))
                        .await;
                }
                TeardownPolicy::Retain => {
                    debug!(login_id = %record.login_id, "last token gone, retaining account session");
                }
            }
        }

        info!(login_id = %record.login_id, "logout");
        Ok(())
    }

    /// Pure check, no side effects beyond lazy expiry pruning.
    pub async fn is_login(&self, token: &str) -> bool {
        self.tokens.resolve(token).await.is_some()
    }

    /// Resolve a token to its principal via the account session claims.
    ///
    /// # Errors
    /// Returns `NotAuthenticated` when the token is absent or expired, or the
    /// account session no longer carries claims.
    pub async fn current_principal(&self, token: &str) -> Result<Principal, AuthError> {
        let record = self
            .tokens
            .resolve(token)
            .await
            .ok_or(AuthError::NotAuthenticated)?;
        let account = self.sessions.for_account(&record.login_id);
        let role = match account.get(CLAIM_ROLE).await {
            Some(Value::String(role)) => role,
            _ => return Err(AuthError::NotAuthenticated),
        };
        let permissions = account
            .get(CLAIM_PERMISSIONS)
            .await
            .and_then(|value| serde_json::from_value::<BTreeSet<String>>(value).ok())
            .ok_or(AuthError::NotAuthenticated)?;
        Ok(Principal {
            login_id: record.login_id,
            role,
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::InMemoryCredentials;
    use crate::auth::GateMode;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    fn device() -> LoginDevice {
        LoginDevice::new("test".to_string(), Some("127.0.0.1".to_string()))
    }

    fn authenticator(config: AuthConfig) -> anyhow::Result<Authenticator> {
        let credentials = Arc::new(InMemoryCredentials::demo()?);
        Ok(Authenticator::new(config, credentials))
    }

    #[tokio::test]
    async fn login_issues_distinct_tokens() -> anyhow::Result<()> {
        let auth = authenticator(AuthConfig::new())?;
        let first = auth.login("admin", &secret("123456"), device()).await?;
        let second = auth.login("admin", &secret("123456"), device()).await?;
        let third = auth.login("user", &secret("123456"), device()).await?;
        assert_ne!(first.token, second.token);
        assert_ne!(second.token, third.token);
        Ok(())
    }

    #[tokio::test]
    async fn failed_login_leaves_no_trace() -> anyhow::Result<()> {
        let auth = authenticator(AuthConfig::new())?;
        let result = auth.login("admin", &secret("wrong"), device()).await;
        assert!(matches!(result, Err(AuthError::InvalidCredential)));
        assert_eq!(auth.sessions().for_account("admin").keys().await.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn account_session_is_shared_across_tokens() -> anyhow::Result<()> {
        let auth = authenticator(AuthConfig::new())?;
        let t1 = auth.login("admin", &secret("123456"), device()).await?;
        let t2 = auth.login("admin", &secret("123456"), device()).await?;

        // A write through either token's account scope is visible to the other.
        auth.sessions()
            .for_account(&t1.principal.login_id)
            .set("theme", json!("dark"))
            .await;
        assert_eq!(
            auth.sessions()
                .for_account(&t2.principal.login_id)
                .get("theme")
                .await,
            Some(json!("dark"))
        );

        // Token sessions do not observe each other's writes.
        auth.sessions()
            .for_token(&t1.token)
            .set("draft", json!("mine"))
            .await;
        assert_eq!(
            auth.sessions().for_token(&t2.token).get("draft").await,
            None
        );
        Ok(())
    }

    #[tokio::test]
    async fn logout_invalidates_only_the_presented_token() -> anyhow::Result<()> {
        let auth = authenticator(AuthConfig::new())?;
        let t1 = auth.login("admin", &secret("123456"), device()).await?;
        let t2 = auth.login("admin", &secret("123456"), device()).await?;

        auth.logout(&t1.token).await?;

        assert!(!auth.is_login(&t1.token).await);
        assert!(auth.is_login(&t2.token).await);
        assert_eq!(
            auth.sessions().for_token(&t1.token).get("device").await,
            None
        );
        Ok(())
    }

    #[tokio::test]
    async fn retain_policy_keeps_account_session_after_last_logout() -> anyhow::Result<()> {
        let auth = authenticator(AuthConfig::new().with_teardown_policy(TeardownPolicy::Retain))?;
        let issued = auth.login("admin", &secret("123456"), device()).await?;
        auth.logout(&issued.token).await?;
        assert_eq!(
            auth.sessions().for_account("admin").get("role").await,
            Some(json!("admin"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn destroy_policy_tears_down_account_session_after_last_logout() -> anyhow::Result<()> {
        let auth = authenticator(AuthConfig::new().with_teardown_policy(TeardownPolicy::Destroy))?;
        let t1 = auth.login("admin", &secret("123456"), device()).await?;
        let t2 = auth.login("admin", &secret("123456"), device()).await?;

        auth.logout(&t1.token).await?;
        // One token still live: account session must survive.
        assert_eq!(
            auth.sessions().for_account("admin").get("role").await,
            Some(json!("admin"))
        );

        auth.logout(&t2.token).await?;
        assert_eq!(auth.sessions().for_account("admin").get("role").await, None);
        Ok(())
    }

    #[tokio::test]
    async fn current_principal_resolves_claims() -> anyhow::Result<()> {
        let auth = authenticator(AuthConfig::new())?;
        let issued = auth.login("trade", &secret("123456"), device()).await?;
        let principal = auth.current_principal(&issued.token).await?;
        assert_eq!(principal.login_id, "trade");
        assert_eq!(principal.role, "user");
        assert!(principal.has_all_permissions(
            &["goods".to_string(), "orders".to_string()].into_iter().collect()
        ));
        Ok(())
    }

    #[tokio::test]
    async fn current_principal_rejects_unknown_token() -> anyhow::Result<()> {
        let auth = authenticator(AuthConfig::new())?;
        let result = auth.current_principal("no-such-token").await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
        Ok(())
    }

    #[tokio::test]
    async fn expired_token_is_not_logged_in() -> anyhow::Result<()> {
        let auth = authenticator(
            AuthConfig::new()
                .with_token_ttl_seconds(0)
                .with_gate_mode(GateMode::Declarative),
        )?;
        let issued = auth.login("user", &secret("123456"), device()).await?;
        assert!(!auth.is_login(&issued.token).await);
        assert!(matches!(
            auth.current_principal(&issued.token).await,
            Err(AuthError::NotAuthenticated)
        ));
        Ok(())
    }
}
