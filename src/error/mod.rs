#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod db;
pub mod other;
pub mod schema_change;
pub mod serde;
pub mod tracing;

#[cfg(feature = "cli")]
use crate::error::cli::CliError;
use crate::error::config::ConfigError;
use crate::error::db::DbError;
use crate::error::other::OtherError;
use crate::error::schema_change::SchemaChangeError;
use crate::error::serde::SerdeError;
use crate::error::tracing::TracingError;
use thiserror::Error;

pub type UsersMigrationResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    SchemaChange(#[from] SchemaChangeError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Serde(#[from] SerdeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    #[cfg(feature = "cli")]
    #[error(transparent)]
    Clap(#[from] clap::error::Error),

    #[cfg(feature = "cli")]
    #[error(transparent)]
    Cli(#[from] CliError),

    #[cfg(feature = "test-containers")]
    #[error(transparent)]
    TestContainers(
        #[from] testcontainers_modules::testcontainers::core::error::TestcontainersError,
    ),

    #[error(transparent)]
    Other(#[from] OtherError),
}
