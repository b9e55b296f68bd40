//! Schema change unit that creates the `users` table:
//!
//! - Id (UUID, generated by `uuid_generate_v4()` when not provided)
//! - User id, email, password and username (all required)
//! - Is valid (defaults to `true`)
//! - Created at / updated at, maintained by triggers
//!
//! Triggers also keep `id` and `created_at` unchanged by updates.
//!
//! The unit is all-or-nothing. Through [`UsersMigrator`][crate::migration::UsersMigrator] the
//! migration runner wraps it (and the ledger entry) in a transaction; [Migration::apply] opens
//! one itself.

use crate::error::schema_change::{ApplyStep, SchemaChangeError};
use crate::migration::schema::Timestamps;
use crate::migration::trigger::{
    TriggerBehavior, exec_create_column_trigger, exec_create_trigger_function,
    exec_drop_column_trigger, exec_drop_trigger_function,
};
use crate::migration::user::Users;
use crate::migration::user::create_table::{create_table, drop_table};
use crate::migration::uuid::{UUID_OSSP_EXTENSION, create_uuid_ossp_extension};
use sea_orm::{DatabaseConnection, DbBackend, TransactionTrait};
use sea_orm_migration::prelude::*;
use tracing::{debug, error, info, warn};

/// Stable identifier of the unit, used to order it and to record it in the migration ledger.
pub const UNIT_ID: &str = "20230801171341_create_users";

/// The columns of the table that are maintained by a trigger, and how.
fn column_triggers() -> [(TriggerBehavior, DynIden); 3] {
    [
        (TriggerBehavior::UpdateTimestamp, Timestamps::UpdatedAt.into_iden()),
        (TriggerBehavior::Preserve, Timestamps::CreatedAt.into_iden()),
        (TriggerBehavior::Preserve, Users::Id.into_iden()),
    ]
}

#[derive(Default)]
#[non_exhaustive]
pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        UNIT_ID
    }
}

impl Migration {
    /// Apply the unit against `db` in its own transaction. Either the extension is enabled and
    /// the table created, or nothing is changed.
    ///
    /// The migration ledger is not consulted, so applying to a database that already has the
    /// `users` table fails with [`SchemaChangeError::TableAlreadyExists`].
    pub async fn apply(db: &DatabaseConnection) -> Result<(), SchemaChangeError> {
        let table = Users::Table.into_iden().to_string();
        let txn = db
            .begin()
            .await
            .map_err(|err| SchemaChangeError::classify(ApplyStep::Begin, table.as_str(), err))?;

        let result = {
            let manager = SchemaManager::new(&txn);
            Self::apply_with(&manager).await
        };

        match result {
            Ok(()) => txn
                .commit()
                .await
                .map_err(|err| SchemaChangeError::classify(ApplyStep::Commit, table, err)),
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(unit = UNIT_ID, "Rollback failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    /// Run the ordered steps of the unit with the connection held by `manager`. Atomicity is
    /// provided by the caller's transaction.
    pub async fn apply_with(manager: &SchemaManager<'_>) -> Result<(), SchemaChangeError> {
        info!(unit = UNIT_ID, "Applying schema change");

        let result = Self::run_steps(manager).await;

        match &result {
            Ok(()) => info!(unit = UNIT_ID, "Schema change applied"),
            Err(err) => {
                let kind: &str = err.kind().into();
                error!(unit = UNIT_ID, kind, "Schema change failed: {err}");
            }
        }

        result
    }

    async fn run_steps(manager: &SchemaManager<'_>) -> Result<(), SchemaChangeError> {
        let backend = manager.get_database_backend();
        if !matches!(backend, DbBackend::Postgres) {
            return Err(SchemaChangeError::UnsupportedBackend { backend });
        }

        let table = Users::Table.into_iden().to_string();

        step(ApplyStep::EnableExtension, UUID_OSSP_EXTENSION, async {
            manager
                .get_connection()
                .execute(create_uuid_ossp_extension())
                .await
                .map(|_| ())
        })
        .await?;

        step(ApplyStep::CreateTable, &table, manager.create_table(create_table())).await?;

        step(ApplyStep::CreateTriggerFunctions, &table, async {
            for (behavior, column) in column_triggers() {
                exec_create_trigger_function(manager, behavior, column).await?;
            }
            Ok::<(), DbErr>(())
        })
        .await?;

        step(ApplyStep::CreateTriggers, &table, async {
            for (behavior, column) in column_triggers() {
                exec_create_column_trigger(manager, behavior, Users::Table, column).await?;
            }
            Ok::<(), DbErr>(())
        })
        .await?;

        Ok(())
    }
}

async fn step<F>(step: ApplyStep, subject: &str, fut: F) -> Result<(), SchemaChangeError>
where
    F: Future<Output = Result<(), DbErr>>,
{
    debug!(unit = UNIT_ID, %step, subject, "Running step");
    fut.await
        .map_err(|err| SchemaChangeError::classify(step, subject, err))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        Self::apply_with(manager)
            .await
            .map_err(|err| DbErr::Migration(format!("{UNIT_ID}: {err}")))
    }

    /// Drop the triggers, the table, then the trigger functions. The `uuid-ossp` extension is
    /// left enabled since other tables may depend on it.
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (behavior, column) in column_triggers() {
            exec_drop_column_trigger(manager, behavior, Users::Table, column).await?;
        }
        manager.drop_table(drop_table()).await?;
        for (behavior, column) in column_triggers() {
            exec_drop_trigger_function(manager, behavior, column).await?;
        }
        Ok(())
    }
}
