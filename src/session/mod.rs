//! Session storage for the three session scopes.
//!
//! Account, token, and custom sessions are the same key→bag-of-attributes
//! abstraction; only the key derivation differs. The scoped key is explicit in
//! every call path so sharing semantics stay visible: every handle resolved to
//! the same [`SessionKey`] observes the same bag.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage key for one session bag.
///
/// `Account` is shared by all tokens of one login id, `Token` is private to a
/// single issued token, and `Custom` belongs to whoever knows the name.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum SessionKey {
    Account(String),
    Token(String),
    Custom(String),
}

type AttributeBag = HashMap<String, Value>;

/// Shared session store. The only mutable state shared across requests.
///
/// Per-key operations are atomic under the lock; concurrent writers to the
/// same attribute race with last-write-wins, which is accepted behavior for
/// custom sessions and for account sessions shared across devices.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, AttributeBag>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session shared by every token belonging to `login_id`.
    #[must_use]
    pub fn for_account(&self, login_id: &str) -> Session<'_> {
        self.session(SessionKey::Account(login_id.to_string()))
    }

    /// Session private to one issued token.
    #[must_use]
    pub fn for_token(&self, token: &str) -> Session<'_> {
        self.session(SessionKey::Token(token.to_string()))
    }

    /// Named session, unrelated to any principal. Never destroyed by auth
    /// events; last writer wins.
    #[must_use]
    pub fn for_custom(&self, name: &str) -> Session<'_> {
        self.session(SessionKey::Custom(name.to_string()))
    }

    fn session(&self, key: SessionKey) -> Session<'_> {
        Session { store: self, key }
    }

    pub(crate) async fn destroy(&self, key: &SessionKey) {
        self.sessions.write().await.remove(key);
    }
}

/// Handle to one session bag. Bags auto-create on first write; reading an
/// absent attribute returns `None`, not an error.
pub struct Session<'a> {
    store: &'a SessionStore,
    key: SessionKey,
}

impl Session<'_> {
    pub async fn get(&self, attribute: &str) -> Option<Value> {
        let sessions = self.store.sessions.read().await;
        sessions.get(&self.key)?.get(attribute).cloned()
    }

    pub async fn set(&self, attribute: &str, value: Value) {
        let mut sessions = self.store.sessions.write().await;
        sessions
            .entry(self.key.clone())
            .or_default()
            .insert(attribute.to_string(), value);
    }

    pub async fn remove(&self, attribute: &str) -> Option<Value> {
        let mut sessions = self.store.sessions.write().await;
        sessions.get_mut(&self.key)?.remove(attribute)
    }

    pub async fn keys(&self) -> Vec<String> {
        let sessions = self.store.sessions.read().await;
        sessions
            .get(&self.key)
            .map(|bag| bag.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn destroy(&self) {
        self.store.destroy(&self.key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn absent_attribute_reads_as_none() {
        let store = SessionStore::new();
        assert_eq!(store.for_account("alice").get("theme").await, None);
    }

    #[tokio::test]
    async fn account_sessions_share_state_across_handles() {
        let store = SessionStore::new();
        store
            .for_account("alice")
            .set("theme", json!("dark"))
            .await;
        // A second handle resolved from the same login id sees the write.
        assert_eq!(
            store.for_account("alice").get("theme").await,
            Some(json!("dark"))
        );
        assert_eq!(store.for_account("bob").get("theme").await, None);
    }

    #[tokio::test]
    async fn token_sessions_are_isolated_per_token() {
        let store = SessionStore::new();
        store.for_token("t1").set("draft", json!("one")).await;
        store.for_token("t2").set("draft", json!("two")).await;
        assert_eq!(store.for_token("t1").get("draft").await, Some(json!("one")));
        assert_eq!(store.for_token("t2").get("draft").await, Some(json!("two")));
    }

    #[tokio::test]
    async fn token_and_account_scopes_never_collide() {
        let store = SessionStore::new();
        store.for_account("x").set("k", json!(1)).await;
        store.for_token("x").set("k", json!(2)).await;
        store.for_custom("x").set("k", json!(3)).await;
        assert_eq!(store.for_account("x").get("k").await, Some(json!(1)));
        assert_eq!(store.for_token("x").get("k").await, Some(json!(2)));
        assert_eq!(store.for_custom("x").get("k").await, Some(json!(3)));
    }

    #[tokio::test]
    async fn custom_session_last_writer_wins() {
        let store = SessionStore::new();
        store
            .for_custom("system-config")
            .set("mode", json!("a"))
            .await;
        store
            .for_custom("system-config")
            .set("mode", json!("b"))
            .await;
        assert_eq!(
            store.for_custom("system-config").get("mode").await,
            Some(json!("b"))
        );
    }

    #[tokio::test]
    async fn remove_and_keys() {
        let store = SessionStore::new();
        let session = store.for_account("alice");
        session.set("a", json!(1)).await;
        session.set("b", json!(2)).await;
        let mut keys = session.keys().await;
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(session.remove("a").await, Some(json!(1)));
        assert_eq!(session.get("a").await, None);
    }

    #[tokio::test]
    async fn destroy_clears_only_that_bag() {
        let store = SessionStore::new();
        store.for_account("alice").set("k", json!(1)).await;
        store.for_custom("cfg").set("k", json!(2)).await;
        store.for_account("alice").destroy().await;
        assert_eq!(store.for_account("alice").get("k").await, None);
        assert_eq!(store.for_custom("cfg").get("k").await, Some(json!(2)));
    }
}
