//! Runs schema change units through SeaORM's migration ledger (the `seaql_migrations` table),
//! which records the units that have been applied and applies pending ones in order.

use crate::error::UsersMigrationResult;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_derive::Serialize;
use std::cmp::min;
use std::marker::PhantomData;
use strum_macros::{EnumString, IntoStaticStr};

#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[non_exhaustive]
pub struct UpArgs {
    /// The number of pending migration steps to apply.
    #[cfg_attr(feature = "cli", clap(short = 'n', long))]
    pub steps: Option<u32>,
}

impl UpArgs {
    pub fn steps(steps: u32) -> Self {
        Self { steps: Some(steps) }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[non_exhaustive]
pub struct DownArgs {
    /// The number of applied migration steps to roll back.
    #[cfg_attr(feature = "cli", clap(short = 'n', long))]
    pub steps: Option<u32>,
}

impl DownArgs {
    pub fn steps(steps: u32) -> Self {
        Self { steps: Some(steps) }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[non_exhaustive]
pub struct MigrationInfo {
    pub name: String,
    pub status: MigrationStatus,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, EnumString, IntoStaticStr)]
#[non_exhaustive]
pub enum MigrationStatus {
    Applied,
    Pending,
}

impl From<sea_orm_migration::Migration> for MigrationInfo {
    fn from(value: sea_orm_migration::Migration) -> Self {
        Self {
            name: value.name().to_string(),
            status: value.status().into(),
        }
    }
}

impl From<sea_orm_migration::MigrationStatus> for MigrationStatus {
    fn from(value: sea_orm_migration::MigrationStatus) -> Self {
        match value {
            sea_orm_migration::MigrationStatus::Applied => Self::Applied,
            sea_orm_migration::MigrationStatus::Pending => Self::Pending,
        }
    }
}

pub struct Runner<M>
where
    M: MigratorTrait + Send + Sync,
{
    migrator: PhantomData<M>,
}

impl<M> Runner<M>
where
    M: MigratorTrait + Send + Sync,
{
    pub fn new(_migrator: M) -> Self {
        Self {
            migrator: Default::default(),
        }
    }

    /// Whether the unit with the given id is recorded as applied in the ledger.
    #[tracing::instrument(skip(self, db))]
    pub async fn has_been_applied(
        &self,
        db: &DatabaseConnection,
        unit_id: &str,
    ) -> UsersMigrationResult<bool> {
        let applied = M::get_applied_migrations(db)
            .await?
            .iter()
            .any(|migration| migration.name() == unit_id);
        Ok(applied)
    }

    /// Apply pending units in order, each in a transaction together with its ledger entry.
    /// Returns the number of units that were applied.
    #[tracing::instrument(skip(self, db))]
    pub async fn up(&self, db: &DatabaseConnection, args: &UpArgs) -> UsersMigrationResult<usize> {
        let pending = M::get_pending_migrations(db).await?;

        let to_run = if let Some(steps) = args.steps {
            min(steps as usize, pending.len())
        } else {
            pending.len()
        };

        M::up(db, args.steps).await?;

        // `M::up` fails on the first unit that fails, so reaching this point means all of the
        // pending units (up to `args.steps`) were applied.
        Ok(to_run)
    }

    /// Roll back applied units, most recent first. Returns the number of units that were
    /// rolled back.
    #[tracing::instrument(skip(self, db))]
    pub async fn down(
        &self,
        db: &DatabaseConnection,
        args: &DownArgs,
    ) -> UsersMigrationResult<usize> {
        let applied = M::get_applied_migrations(db).await?;

        let to_roll_back = if let Some(steps) = args.steps {
            min(steps as usize, applied.len())
        } else {
            applied.len()
        };

        M::down(db, args.steps).await?;

        Ok(to_roll_back)
    }

    #[tracing::instrument(skip_all)]
    pub async fn status(&self, db: &DatabaseConnection) -> UsersMigrationResult<Vec<MigrationInfo>> {
        let migrations = M::get_migration_with_status(db)
            .await?
            .into_iter()
            .map(|migration| migration.into())
            .collect();

        Ok(migrations)
    }

    /// Roll back all applied units, then apply all units.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, db: &DatabaseConnection) -> UsersMigrationResult<()> {
        M::refresh(db).await?;
        Ok(())
    }

    /// Roll back all applied units.
    #[tracing::instrument(skip_all)]
    pub async fn reset(&self, db: &DatabaseConnection) -> UsersMigrationResult<()> {
        M::reset(db).await?;
        Ok(())
    }

    /// Drop all tables in the database (not only the ones created by these units), then apply
    /// all units.
    #[tracing::instrument(skip_all)]
    pub async fn fresh(&self, db: &DatabaseConnection) -> UsersMigrationResult<()> {
        M::fresh(db).await?;
        Ok(())
    }
}
