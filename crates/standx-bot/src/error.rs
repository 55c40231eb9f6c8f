//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Auth error: {0}")]
    Auth(#[from] standx_auth::AuthError),

    #[error("Exchange error: {0}")]
    Client(#[from] standx_client::ClientError),

    #[error("Engine error: {0}")]
    Engine(#[from] standx_engine::EngineError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] standx_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
