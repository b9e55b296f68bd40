pub mod app_config;
pub mod database;
pub mod environment;
pub mod tracing;

pub use app_config::{App, AppConfig, ENV_VAR_PREFIX, ENV_VAR_SEPARATOR};

/// Function to default a boolean field to `true`.
pub(crate) const fn default_true() -> bool {
    true
}
