//! StandX maker bot application.

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, Secrets};
pub use error::{AppError, AppResult};
