//! Opaque bearer token issuance and the in-memory token registry.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::RwLock;

/// Device metadata captured at login and recorded in the token session.
#[derive(Clone, Debug)]
pub struct LoginDevice {
    pub device: String,
    pub login_ip: Option<String>,
    pub login_at_unix: i64,
}

impl LoginDevice {
    #[must_use]
    pub fn new(device: String, login_ip: Option<String>) -> Self {
        Self {
            device,
            login_ip,
            login_at_unix: now_unix_seconds(),
        }
    }
}

/// What a live token resolves to. One record per issued token.
#[derive(Clone, Debug)]
pub struct TokenRecord {
    pub login_id: String,
    pub device: LoginDevice,
    issued_at: Instant,
}

/// Registry of live tokens with a shared time-to-live.
///
/// Expired entries are pruned lazily: every insert sweeps the map and every
/// resolve drops the entry it finds stale. No background task is needed.
pub struct TokenStore {
    ttl: Duration,
    tokens: RwLock<HashMap<String, TokenRecord>>,
}

impl TokenStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, token: String, login_id: String, device: LoginDevice) {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, record| record.issued_at.elapsed() < self.ttl);
        tokens.insert(
            token,
            TokenRecord {
                login_id,
                device,
                issued_at: Instant::now(),
            },
        );
    }

    /// Resolve a token to its record, dropping it when expired.
    pub async fn resolve(&self, token: &str) -> Option<TokenRecord> {
        {
            let tokens = self.tokens.read().await;
            match tokens.get(token) {
                Some(record) if record.issued_at.elapsed() < self.ttl => {
                    return Some(record.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        self.tokens.write().await.remove(token);
        None
    }

    pub async fn remove(&self, token: &str) -> Option<TokenRecord> {
        self.tokens.write().await.remove(token)
    }

    /// Count of live tokens held by a login id, used by logout teardown.
    pub async fn live_count_for(&self, login_id: &str) -> usize {
        let tokens = self.tokens.read().await;
        tokens
            .values()
            .filter(|record| {
                record.login_id == login_id && record.issued_at.elapsed() < self.ttl
            })
            .count()
    }
}

/// Create a new opaque bearer token.
/// The raw value is only returned to the caller; it is never logged.
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate bearer token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Unix seconds for login timestamps.
pub fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> LoginDevice {
        LoginDevice::new("test".to_string(), None)
    }

    #[test]
    fn generated_tokens_are_distinct() -> Result<()> {
        let first = generate_token()?;
        let second = generate_token()?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn generated_token_decodes_to_32_bytes() -> Result<()> {
        let token = generate_token()?;
        let decoded = Base64UrlUnpadded::decode_vec(&token)
            .context("decode bearer token")?;
        assert_eq!(decoded.len(), 32);
        Ok(())
    }

    #[tokio::test]
    async fn resolve_returns_inserted_record() {
        let store = TokenStore::new(Duration::from_secs(60));
        store
            .insert("t1".to_string(), "alice".to_string(), device())
            .await;
        let record = store.resolve("t1").await;
        assert_eq!(record.map(|r| r.login_id), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn resolve_drops_expired_record() {
        let store = TokenStore::new(Duration::ZERO);
        store
            .insert("t1".to_string(), "alice".to_string(), device())
            .await;
        assert!(store.resolve("t1").await.is_none());
        assert_eq!(store.live_count_for("alice").await, 0);
    }

    #[tokio::test]
    async fn live_count_tracks_tokens_per_login() {
        let store = TokenStore::new(Duration::from_secs(60));
        store
            .insert("t1".to_string(), "alice".to_string(), device())
            .await;
        store
            .insert("t2".to_string(), "alice".to_string(), device())
            .await;
        store
            .insert("t3".to_string(), "bob".to_string(), device())
            .await;
        assert_eq!(store.live_count_for("alice").await, 2);
        store.remove("t1").await;
        assert_eq!(store.live_count_for("alice").await, 1);
        assert_eq!(store.live_count_for("bob").await, 1);
    }
}
