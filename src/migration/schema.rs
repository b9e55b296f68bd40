//! Utility methods to create common column types in table create statements.
//!
//! These are similar to the ones provided by [SeaORM][sea_orm_migration::schema], with two
//! differences: timestamps include the timezone, and [table] does not add `IF NOT EXISTS`, so a
//! table that is already present is reported instead of silently skipped.

use sea_orm_migration::{prelude::*, schema::*};

/// Timestamp related fields.
#[derive(DeriveIden)]
#[non_exhaustive]
pub enum Timestamps {
    /// When the row was created. Defaults to the current timestamp (with timezone) and is kept
    /// unchanged by updates when the table has a preserve trigger, see
    /// [crate::migration::trigger].
    CreatedAt,
    /// When the row was last updated. Defaults to the current timestamp (with timezone) and is
    /// refreshed on every update when the table has an update trigger.
    UpdatedAt,
}

/// Start a `CREATE TABLE` statement. Fails at execution time if the table already exists.
pub fn table<T: IntoIden + 'static>(name: T) -> TableCreateStatement {
    Table::create().table(name).to_owned()
}

/// Add non-null "timestamp with time zone" columns ([`Timestamps::CreatedAt`] and
/// [`Timestamps::UpdatedAt`]) to a table. The default for each column is the current timestamp.
pub fn timestamps(mut table: TableCreateStatement) -> TableCreateStatement {
    table
        .col(timestamp_with_time_zone(Timestamps::CreatedAt).default(Expr::current_timestamp()))
        .col(timestamp_with_time_zone(Timestamps::UpdatedAt).default(Expr::current_timestamp()))
        .to_owned()
}

/// Create a primary key column using [Uuid][sea_orm::sea_query::ColumnType::Uuid] as the column
/// type. No default value is provided, so it needs to be generated/provided by the application.
pub fn pk_uuid<T>(name: T) -> ColumnDef
where
    T: IntoIden,
{
    ColumnDef::new(name).uuid().not_null().primary_key().to_owned()
}

/// Create a primary key column using [Uuid][sea_orm::sea_query::ColumnType::Uuid] as the column
/// type. A new v4 UUID will be generated as the default if no value is provided by the application.
///
/// Note: This requires the `uuid-ossp` extension, see [crate::migration::uuid].
pub fn pk_uuidv4<T>(name: T) -> ColumnDef
where
    T: IntoIden,
{
    pk_uuid_default(name, Expr::cust("uuid_generate_v4()"))
}

/// Create a primary key column using [Uuid][sea_orm::sea_query::ColumnType::Uuid] as the column
/// type, generating a default with the given expression.
pub fn pk_uuid_default<T, D>(name: T, default: D) -> ColumnDef
where
    T: IntoIden,
    D: Into<SimpleExpr>,
{
    pk_uuid(name).default(default).to_owned()
}

/// A non-null boolean column with a default value.
pub fn bool_default<T>(name: T, default: bool) -> ColumnDef
where
    T: IntoIden,
{
    boolean(name).default(default).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::PostgresQueryBuilder;

    #[derive(DeriveIden)]
    enum Foo {
        Table,
        Id,
        Enabled,
    }

    #[test]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn table_is_not_if_not_exists() {
        let sql = table(Foo::Table)
            .col(pk_uuid(Foo::Id))
            .to_owned()
            .to_string(PostgresQueryBuilder);

        assert!(sql.starts_with(r#"CREATE TABLE "foo""#), "{sql}");
        assert!(!sql.contains("IF NOT EXISTS"), "{sql}");
    }

    #[test]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn timestamps_are_appended_with_defaults() {
        let sql = timestamps(table(Foo::Table).col(pk_uuid(Foo::Id)).to_owned())
            .to_string(PostgresQueryBuilder);

        let id = sql.find(r#""id""#).unwrap();
        let created_at = sql.find(r#""created_at" timestamp with time zone NOT NULL DEFAULT CURRENT_TIMESTAMP"#).unwrap();
        let updated_at = sql.find(r#""updated_at" timestamp with time zone NOT NULL DEFAULT CURRENT_TIMESTAMP"#).unwrap();
        assert!(id < created_at && created_at < updated_at, "{sql}");
    }

    #[test]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn pk_uuidv4_defaults_to_uuid_generate_v4() {
        let sql = table(Foo::Table)
            .col(pk_uuidv4(Foo::Id))
            .to_owned()
            .to_string(PostgresQueryBuilder);

        assert!(sql.contains(r#""id" uuid NOT NULL"#), "{sql}");
        assert!(sql.contains("DEFAULT uuid_generate_v4()"), "{sql}");
        assert!(sql.contains("PRIMARY KEY"), "{sql}");
    }

    #[test]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn bool_default_true() {
        let sql = table(Foo::Table)
            .col(bool_default(Foo::Enabled, true))
            .to_owned()
            .to_string(PostgresQueryBuilder);

        assert!(sql.contains(r#""enabled" bool NOT NULL DEFAULT TRUE"#), "{sql}");
    }
}
