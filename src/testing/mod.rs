//! Throwaway Postgres databases for tests, started with
//! [Test Containers](https://testcontainers.com/).

use crate::config::AppConfig;
use crate::db::connect;
use crate::error::UsersMigrationResult;
use sea_orm::DatabaseConnection;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::{ContainerAsync, ImageExt};

const POSTGRES_PORT: u16 = 5432;

/// A Postgres container and a connection to it. The container is stopped and removed when this
/// is dropped.
#[non_exhaustive]
pub struct TestDatabase {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub container: ContainerAsync<Postgres>,
}

impl TestDatabase {
    /// Start a Postgres container with the given image tag (the module's default if `None`) and
    /// connect to it with the [test config][AppConfig::test].
    pub async fn start(tag: Option<&str>) -> UsersMigrationResult<Self> {
        let image = Postgres::default();
        let container = if let Some(tag) = tag {
            image.with_tag(tag).start().await?
        } else {
            image.start().await?
        };

        let host_ip = container.get_host().await?;
        let host_port = container.get_host_port_ipv4(POSTGRES_PORT).await?;

        let mut config = AppConfig::test(None)?;
        config.database.uri =
            format!("postgres://postgres:postgres@{host_ip}:{host_port}/postgres").parse()?;

        let db = connect(&config.database).await?;

        Ok(Self {
            config,
            db,
            container,
        })
    }
}
