//! Triggers that maintain columns in the database, so the invariants hold no matter which client
//! writes the row:
//!
//! - [`TriggerBehavior::UpdateTimestamp`]: set the column to `NOW()` on every update.
//! - [`TriggerBehavior::Preserve`]: keep the column's original value on every update. Used for
//!   values that are set once, such as the primary key and the creation timestamp.
//!
//! Each behavior needs a function (one per column, shared by all tables) and a trigger (one per
//! table). The statement builders return [None] for backends other than Postgres.

use sea_orm::{DbBackend, Statement};
use sea_orm_migration::prelude::*;
use strum_macros::IntoStaticStr;

#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum TriggerBehavior {
    UpdateTimestamp,
    Preserve,
}

impl TriggerBehavior {
    fn assignment(&self, column: &str) -> String {
        match self {
            TriggerBehavior::UpdateTimestamp => format!("NEW.{column} = NOW();"),
            TriggerBehavior::Preserve => format!("NEW.{column} = OLD.{column};"),
        }
    }
}

/// Execute the statement returned by [create_trigger_function], if any.
pub async fn exec_create_trigger_function<C: IntoIden>(
    manager: &SchemaManager<'_>,
    behavior: TriggerBehavior,
    column: C,
) -> Result<(), DbErr> {
    exec(
        manager,
        create_trigger_function(manager.get_database_backend(), behavior, column),
    )
    .await
}

/// Execute the statement returned by [drop_trigger_function], if any.
pub async fn exec_drop_trigger_function<C: IntoIden>(
    manager: &SchemaManager<'_>,
    behavior: TriggerBehavior,
    column: C,
) -> Result<(), DbErr> {
    exec(
        manager,
        drop_trigger_function(manager.get_database_backend(), behavior, column),
    )
    .await
}

/// Execute the statement returned by [create_column_trigger], if any.
pub async fn exec_create_column_trigger<T: IntoIden, C: IntoIden>(
    manager: &SchemaManager<'_>,
    behavior: TriggerBehavior,
    table: T,
    column: C,
) -> Result<(), DbErr> {
    exec(
        manager,
        create_column_trigger(manager.get_database_backend(), behavior, table, column),
    )
    .await
}

/// Execute the statement returned by [drop_column_trigger], if any.
pub async fn exec_drop_column_trigger<T: IntoIden, C: IntoIden>(
    manager: &SchemaManager<'_>,
    behavior: TriggerBehavior,
    table: T,
    column: C,
) -> Result<(), DbErr> {
    exec(
        manager,
        drop_column_trigger(manager.get_database_backend(), behavior, table, column),
    )
    .await
}

async fn exec(manager: &SchemaManager<'_>, statement: Option<Statement>) -> Result<(), DbErr> {
    if let Some(statement) = statement {
        manager.get_connection().execute(statement).await?;
    }
    Ok(())
}

/// Create a SQL trigger function that applies `behavior` to `column`.
pub fn create_trigger_function<C: IntoIden>(
    backend: DbBackend,
    behavior: TriggerBehavior,
    column: C,
) -> Option<Statement> {
    if let DbBackend::Postgres = backend {
        let FnQueryStrings {
            column, fn_call, ..
        } = FnQueryStrings::new(behavior, column);
        let assignment = behavior.assignment(&column);

        let statement = Statement::from_string(
            backend,
            format!(
                r#"
CREATE OR REPLACE FUNCTION {fn_call} RETURNS TRIGGER AS $$
BEGIN
    {assignment}
    RETURN NEW;
END;
$$ language 'plpgsql';
"#
            ),
        );
        Some(statement)
    } else {
        None
    }
}

/// Drop a SQL function that was previously created by [create_trigger_function].
pub fn drop_trigger_function<C: IntoIden>(
    backend: DbBackend,
    behavior: TriggerBehavior,
    column: C,
) -> Option<Statement> {
    if let DbBackend::Postgres = backend {
        let FnQueryStrings { fn_call, .. } = FnQueryStrings::new(behavior, column);

        let statement =
            Statement::from_string(backend, format!("DROP FUNCTION IF EXISTS {fn_call};"));
        Some(statement)
    } else {
        None
    }
}

/// Create a SQL trigger that runs the function created by [create_trigger_function] before
/// every update of a row in `table`.
pub fn create_column_trigger<T: IntoIden, C: IntoIden>(
    backend: DbBackend,
    behavior: TriggerBehavior,
    table: T,
    column: C,
) -> Option<Statement> {
    if let DbBackend::Postgres = backend {
        let TriggerQueryNames {
            fn_query_strings: FnQueryStrings { fn_call, .. },
            table,
            trigger_name,
        } = TriggerQueryNames::new(behavior, table, column);

        let statement = Statement::from_string(
            backend,
            format!(
                r#"
CREATE TRIGGER {trigger_name} BEFORE UPDATE
ON {table}
FOR EACH ROW
EXECUTE PROCEDURE {fn_call};
"#
            ),
        );
        Some(statement)
    } else {
        None
    }
}

/// Drop a SQL trigger that was previously created by [create_column_trigger].
pub fn drop_column_trigger<T: IntoIden, C: IntoIden>(
    backend: DbBackend,
    behavior: TriggerBehavior,
    table: T,
    column: C,
) -> Option<Statement> {
    if let DbBackend::Postgres = backend {
        let TriggerQueryNames {
            table,
            trigger_name,
            ..
        } = TriggerQueryNames::new(behavior, table, column);

        let statement = Statement::from_string(
            backend,
            format!("DROP TRIGGER IF EXISTS {trigger_name} ON {table};"),
        );
        Some(statement)
    } else {
        None
    }
}

#[derive(Debug)]
struct FnQueryStrings {
    column: String,
    fn_name: String,
    fn_call: String,
}

#[derive(Debug)]
struct TriggerQueryNames {
    fn_query_strings: FnQueryStrings,
    table: String,
    trigger_name: String,
}

impl FnQueryStrings {
    fn new<C: IntoIden>(behavior: TriggerBehavior, column: C) -> Self {
        let column = column.into_iden().to_string();
        let fn_name = trigger_fn_name(behavior, &column);
        let fn_call = format!("{fn_name}()");

        Self {
            column,
            fn_name,
            fn_call,
        }
    }
}

impl TriggerQueryNames {
    fn new<T: IntoIden, C: IntoIden>(behavior: TriggerBehavior, table: T, column: C) -> Self {
        let fn_query_strings = FnQueryStrings::new(behavior, column);
        let table = table.into_iden().to_string();
        let trigger_name = format!("{table}_{}", fn_query_strings.fn_name);

        Self {
            fn_query_strings,
            table: format!(r#""{table}""#),
            trigger_name,
        }
    }
}

fn trigger_fn_name(behavior: TriggerBehavior, column: &str) -> String {
    let behavior: &str = behavior.into();
    format!("{behavior}_{column}")
}
