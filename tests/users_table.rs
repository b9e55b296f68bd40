//! Behavior of the `users` table against a real Postgres database. Requires Docker.

#![cfg(feature = "test-containers")]

use rstest::rstest;
use sea_orm::prelude::{DateTimeWithTimeZone, Uuid};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, QueryResult, RuntimeErr, Statement,
};
use std::time::Duration;
use users_migration::error::schema_change::SchemaChangeErrorKind;
use users_migration::migration::user::m20230801_171341_create_users::{Migration, UNIT_ID};
use users_migration::migration::{DownArgs, MigrationStatus, Runner, UpArgs, UsersMigrator};
use users_migration::testing::TestDatabase;

const INSERT_ALICE: &str = r#"
INSERT INTO users (user_id, email, password, username)
VALUES ('u1', 'a@b.com', 'h', 'alice')
RETURNING id, is_valid, created_at, updated_at
"#;

async fn query_one(db: &DatabaseConnection, sql: &str) -> QueryResult {
    db.query_one(Statement::from_string(DbBackend::Postgres, sql))
        .await
        .unwrap()
        .unwrap()
}

async fn uuid_ossp_enabled(db: &DatabaseConnection) -> bool {
    let row = query_one(
        db,
        "SELECT count(*) AS count FROM pg_extension WHERE extname = 'uuid-ossp'",
    )
    .await;
    row.try_get::<i64>("", "count").unwrap() == 1
}

async fn users_table_exists(db: &DatabaseConnection) -> bool {
    let row = query_one(db, "SELECT to_regclass('public.users')::text AS name").await;
    row.try_get::<Option<String>>("", "name").unwrap().is_some()
}

#[tokio::test]
async fn apply_creates_users_table() {
    let test_db = TestDatabase::start(None).await.unwrap();
    let db = &test_db.db;

    Migration::apply(db).await.unwrap();

    let columns = db
        .query_all(Statement::from_string(
            DbBackend::Postgres,
            r#"
            SELECT column_name::text AS name, data_type::text AS data_type, is_nullable::text AS nullable
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = 'users'
            ORDER BY ordinal_position
            "#,
        ))
        .await
        .unwrap()
        .into_iter()
        .map(|row| {
            let name: String = row.try_get("", "name").unwrap();
            let data_type: String = row.try_get("", "data_type").unwrap();
            let nullable: String = row.try_get("", "nullable").unwrap();
            (name, data_type, nullable)
        })
        .collect::<Vec<_>>();

    let expected = [
        ("id", "uuid"),
        ("user_id", "character varying"),
        ("email", "character varying"),
        ("password", "character varying"),
        ("username", "character varying"),
        ("is_valid", "boolean"),
        ("created_at", "timestamp with time zone"),
        ("updated_at", "timestamp with time zone"),
    ]
    .into_iter()
    .map(|(name, data_type)| (name.to_string(), data_type.to_string(), "NO".to_string()))
    .collect::<Vec<_>>();
    assert_eq!(columns, expected);

    assert!(uuid_ossp_enabled(db).await);

    let rows = query_one(db, "SELECT count(*) AS count FROM users").await;
    assert_eq!(rows.try_get::<i64>("", "count").unwrap(), 0);
}

#[tokio::test]
async fn apply_twice_fails_with_table_already_exists() {
    let test_db = TestDatabase::start(None).await.unwrap();
    let db = &test_db.db;

    Migration::apply(db).await.unwrap();
    let err = Migration::apply(db).await.unwrap_err();

    assert_eq!(err.kind(), SchemaChangeErrorKind::TableAlreadyExists);
}

#[tokio::test]
async fn failed_apply_leaves_no_partial_state() {
    let test_db = TestDatabase::start(None).await.unwrap();
    let db = &test_db.db;
    db.execute_unprepared("CREATE TABLE users (id integer)")
        .await
        .unwrap();
    assert!(!uuid_ossp_enabled(db).await);

    let err = Migration::apply(db).await.unwrap_err();

    assert_eq!(err.kind(), SchemaChangeErrorKind::TableAlreadyExists);
    // The extension was enabled by the first step, then rolled back with the rest of the unit.
    assert!(!uuid_ossp_enabled(db).await);
}

#[tokio::test]
async fn insert_uses_defaults() {
    let test_db = TestDatabase::start(None).await.unwrap();
    let db = &test_db.db;
    Migration::apply(db).await.unwrap();

    let row = query_one(db, INSERT_ALICE).await;

    let id: Uuid = row.try_get("", "id").unwrap();
    let is_valid: bool = row.try_get("", "is_valid").unwrap();
    let created_at: DateTimeWithTimeZone = row.try_get("", "created_at").unwrap();
    let updated_at: DateTimeWithTimeZone = row.try_get("", "updated_at").unwrap();
    assert_eq!(id.get_version_num(), 4);
    assert!(is_valid);
    assert_eq!(created_at, updated_at);

    let other = query_one(db, INSERT_ALICE).await;
    let other_id: Uuid = other.try_get("", "id").unwrap();
    assert_ne!(id, other_id);
}

#[rstest]
#[case("user_id")]
#[case("email")]
#[case("password")]
#[case("username")]
#[tokio::test]
async fn insert_without_required_column_fails(#[case] missing: &str) {
    let test_db = TestDatabase::start(None).await.unwrap();
    let db = &test_db.db;
    Migration::apply(db).await.unwrap();

    let (columns, values): (Vec<_>, Vec<_>) = [
        ("user_id", "'u1'"),
        ("email", "'a@b.com'"),
        ("password", "'h'"),
        ("username", "'alice'"),
    ]
    .into_iter()
    .filter(|(column, _)| *column != missing)
    .unzip();
    let sql = format!(
        "INSERT INTO users ({}) VALUES ({})",
        columns.join(", "),
        values.join(", ")
    );

    let err = db.execute_unprepared(&sql).await.unwrap_err();

    let code = match &err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) => {
            db_err.code().map(|code| code.to_string())
        }
        _ => None,
    };
    // not_null_violation
    assert_eq!(code.as_deref(), Some("23502"), "{err:?}");
}

#[tokio::test]
async fn update_refreshes_updated_at_and_keeps_created_at() {
    let test_db = TestDatabase::start(None).await.unwrap();
    let db = &test_db.db;
    Migration::apply(db).await.unwrap();

    let row = query_one(db, INSERT_ALICE).await;
    let id: Uuid = row.try_get("", "id").unwrap();
    let created_at: DateTimeWithTimeZone = row.try_get("", "created_at").unwrap();
    let updated_at: DateTimeWithTimeZone = row.try_get("", "updated_at").unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;

    let updated = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE users SET email = 'c@d.com', created_at = '2000-01-01T00:00:00Z'
            WHERE id = $1
            RETURNING created_at, updated_at
            "#,
            [id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let new_created_at: DateTimeWithTimeZone = updated.try_get("", "created_at").unwrap();
    let new_updated_at: DateTimeWithTimeZone = updated.try_get("", "updated_at").unwrap();

    assert_eq!(new_created_at, created_at);
    assert!(new_updated_at > updated_at);
}

#[tokio::test]
async fn update_keeps_primary_key() {
    let test_db = TestDatabase::start(None).await.unwrap();
    let db = &test_db.db;
    Migration::apply(db).await.unwrap();

    let row = query_one(db, INSERT_ALICE).await;
    let id: Uuid = row.try_get("", "id").unwrap();

    let updated = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE users SET id = '00000000-0000-0000-0000-000000000001', username = 'bob'
            WHERE id = $1
            RETURNING id, username
            "#,
            [id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let new_id: Uuid = updated.try_get("", "id").unwrap();
    let username: String = updated.try_get("", "username").unwrap();
    assert_eq!(new_id, id);
    assert_eq!(username, "bob");

    let ids = query_one(
        db,
        "SELECT count(*) AS count FROM users WHERE id = '00000000-0000-0000-0000-000000000001'",
    )
    .await;
    assert_eq!(ids.try_get::<i64>("", "count").unwrap(), 0);
}

#[tokio::test]
async fn runner_records_unit_in_ledger() {
    let test_db = TestDatabase::start(None).await.unwrap();
    let db = &test_db.db;
    let runner = Runner::new(UsersMigrator);

    assert!(!runner.has_been_applied(db, UNIT_ID).await.unwrap());

    assert_eq!(runner.up(db, &UpArgs::default()).await.unwrap(), 1);
    assert!(runner.has_been_applied(db, UNIT_ID).await.unwrap());
    assert!(users_table_exists(db).await);

    let status = runner.status(db).await.unwrap();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].name, UNIT_ID);
    assert_eq!(status[0].status, MigrationStatus::Applied);

    // Already recorded as applied, so nothing to do.
    assert_eq!(runner.up(db, &UpArgs::default()).await.unwrap(), 0);

    assert_eq!(runner.down(db, &DownArgs::steps(1)).await.unwrap(), 1);
    assert!(!runner.has_been_applied(db, UNIT_ID).await.unwrap());
    assert!(!users_table_exists(db).await);
    // Other units may rely on the extension, so rolling back keeps it.
    assert!(uuid_ossp_enabled(db).await);
}

#[tokio::test]
async fn runner_up_fails_when_table_exists_outside_ledger() {
    let test_db = TestDatabase::start(None).await.unwrap();
    let db = &test_db.db;
    let runner = Runner::new(UsersMigrator);
    Migration::apply(db).await.unwrap();

    let err = runner.up(db, &UpArgs::default()).await.unwrap_err();

    assert!(err.to_string().contains(UNIT_ID), "{err}");
    assert!(!runner.has_been_applied(db, UNIT_ID).await.unwrap());
}
