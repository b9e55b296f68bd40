//! Statements to enable the `uuid-ossp` Postgres extension, which provides the
//! `uuid_generate_v4()` function used as the default for UUID primary keys.
//!
//! See: <https://www.postgresql.org/docs/current/uuid-ossp.html>

use const_format::concatcp;
use sea_orm::{DbBackend, Statement};

pub const UUID_OSSP_EXTENSION: &str = "uuid-ossp";

/// Create a [Statement] to create/enable the `uuid-ossp` Postgres extension. Does nothing if the
/// extension is already enabled.
pub fn create_uuid_ossp_extension() -> Statement {
    Statement::from_string(
        DbBackend::Postgres,
        concatcp!(r#"CREATE EXTENSION IF NOT EXISTS ""#, UUID_OSSP_EXTENSION, r#"";"#),
    )
}

/// Create a [Statement] to drop/disable the `uuid-ossp` Postgres extension.
///
/// Only run this once no remaining table relies on `uuid_generate_v4()`.
pub fn drop_uuid_ossp_extension() -> Statement {
    Statement::from_string(
        DbBackend::Postgres,
        concatcp!(r#"DROP EXTENSION IF EXISTS ""#, UUID_OSSP_EXTENSION, r#"";"#),
    )
}
