//! Error taxonomy for authentication and authorization failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or password mismatch at login.
    #[error("invalid username or password")]
    InvalidCredential,
    /// Missing, expired, or unknown token on a protected route.
    #[error("not authenticated")]
    NotAuthenticated,
    /// Valid principal, failed predicate. Re-authenticating does not help.
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    /// Unexpected failure. Logged in full; callers only see a generic message.
    #[error("internal error")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::InvalidCredential | Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
