//! Credential records and the repository seam in front of them.
//!
//! The gateway only ever reads credentials through [`CredentialRepository`],
//! so the in-memory table used here can be swapped for a persistent backend
//! without touching the authenticator.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

use super::error::AuthError;

/// A registration record. Passwords are argon2 PHC strings, never plaintext.
#[derive(Clone, Debug)]
pub struct CredentialRecord {
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub permissions: BTreeSet<String>,
}

/// Seed entry as read from a credentials file at bootstrap.
#[derive(Debug, Deserialize)]
pub struct SeedCredential {
    pub username: String,
    pub password: String,
    pub role: String,
    pub permissions: BTreeSet<String>,
}

pub trait CredentialRepository: Send + Sync {
    /// Answer whether the pair resolves to a valid record. Read-only.
    ///
    /// # Errors
    /// Returns `InvalidCredential` on unknown username or password mismatch.
    fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<CredentialRecord, AuthError>;
}

/// Associative credential table, immutable after bootstrap.
pub struct InMemoryCredentials {
    records: HashMap<String, CredentialRecord>,
}

impl InMemoryCredentials {
    /// Hash each seed password and build the lookup table.
    ///
    /// # Errors
    /// Returns an error if password hashing fails.
    pub fn from_seeds(seeds: Vec<SeedCredential>) -> anyhow::Result<Self> {
        let mut records = HashMap::with_capacity(seeds.len());
        for seed in seeds {
            let password_hash = hash_password(&seed.password)?;
            records.insert(
                seed.username.clone(),
                CredentialRecord {
                    username: seed.username,
                    password_hash,
                    role: seed.role,
                    permissions: seed.permissions,
                },
            );
        }
        Ok(Self { records })
    }

    /// Built-in demo accounts, used when no credentials file is given.
    ///
    /// # Errors
    /// Returns an error if password hashing fails.
    pub fn demo() -> anyhow::Result<Self> {
        let perms = |tags: &[&str]| tags.iter().map(ToString::to_string).collect();
        Self::from_seeds(vec![
            SeedCredential {
                username: "admin".to_string(),
                password: "123456".to_string(),
                role: "admin".to_string(),
                permissions: perms(&["admin", "user", "goods", "orders", "notice", "comment"]),
            },
            SeedCredential {
                username: "super".to_string(),
                password: "123456".to_string(),
                role: "super-admin".to_string(),
                permissions: perms(&["admin", "user"]),
            },
            SeedCredential {
                username: "user".to_string(),
                password: "123456".to_string(),
                role: "user".to_string(),
                permissions: perms(&["user"]),
            },
            SeedCredential {
                username: "trade".to_string(),
                password: "123456".to_string(),
                role: "user".to_string(),
                permissions: perms(&["user", "goods", "orders"]),
            },
        ])
    }
}

impl CredentialRepository for InMemoryCredentials {
    fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<CredentialRecord, AuthError> {
        let record = self
            .records
            .get(username)
            .ok_or(AuthError::InvalidCredential)?;
        if verify_password(&record.password_hash, password.expose_secret()) {
            Ok(record.clone())
        } else {
            Err(AuthError::InvalidCredential)
        }
    }
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let mut salt_bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|e| anyhow::anyhow!("failed to generate salt: {e}"))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn hash_then_verify_round_trip() -> anyhow::Result<()> {
        let phc = hash_password("123456")?;
        assert!(phc.starts_with("$argon2"));
        assert!(verify_password(&phc, "123456"));
        assert!(!verify_password(&phc, "654321"));
        Ok(())
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!verify_password("not-a-phc-string", "123456"));
    }

    #[test]
    fn authenticate_known_user() -> anyhow::Result<()> {
        let repo = InMemoryCredentials::demo()?;
        let record = repo.authenticate("admin", &secret("123456"))?;
        assert_eq!(record.role, "admin");
        assert!(record.permissions.contains("goods"));
        Ok(())
    }

    #[test]
    fn authenticate_rejects_bad_password() -> anyhow::Result<()> {
        let repo = InMemoryCredentials::demo()?;
        let result = repo.authenticate("admin", &secret("wrong"));
        assert!(matches!(result, Err(AuthError::InvalidCredential)));
        Ok(())
    }

    #[test]
    fn authenticate_rejects_unknown_user() -> anyhow::Result<()> {
        let repo = InMemoryCredentials::demo()?;
        let result = repo.authenticate("nobody", &secret("123456"));
        assert!(matches!(result, Err(AuthError::InvalidCredential)));
        Ok(())
    }

    #[test]
    fn seeds_never_store_plaintext() -> anyhow::Result<()> {
        let repo = InMemoryCredentials::from_seeds(vec![SeedCredential {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
            role: "user".to_string(),
            permissions: BTreeSet::new(),
        }])?;
        let record = repo.authenticate("alice", &secret("hunter2"))?;
        assert_ne!(record.password_hash, "hunter2");
        assert!(record.password_hash.starts_with("$argon2"));
        Ok(())
    }
}
