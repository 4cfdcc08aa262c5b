use envelope_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Media upload failed: {0}")]
    Media(String),

    #[error("Credential service error: {0}")]
    Credentials(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Deliberately carries no detail: callers must not learn which step of
    /// the envelope (unwrap, authentication, padding, parsing) failed.
    #[error("Request failed")]
    EnvelopeFailed,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CryptoError> for UserError {
    fn from(err: CryptoError) -> Self {
        tracing::warn!("rejected envelope");
        tracing::debug!(error = %err, "envelope failure detail");
        UserError::EnvelopeFailed
    }
}
