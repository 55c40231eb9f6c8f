//! Error types for standx-auth.

use thiserror::Error;

/// Authentication and signing errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The supplied key did not decode to exactly 32 bytes in any
    /// supported encoding. Fatal at startup.
    #[error("Invalid credential: {0}")]
    Credential(String),

    /// Clock sync transport failure (non-fatal; callers fall back).
    #[error("Time sync failed: {0}")]
    TimeSync(String),
}

/// Result type alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;
