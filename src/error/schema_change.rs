//! Failures of a schema change unit, classified from the underlying driver error.
//!
//! The unit runs a handful of ordered steps. When one of them fails, the [`DbErr`] returned by
//! SeaORM is mapped to a [`SchemaChangeError`] based on the step that was running and, when
//! available, the Postgres SQLSTATE code reported by the server.

use crate::error::Error;
use sea_orm::{ConnAcquireErr, DbBackend, DbErr, RuntimeErr};
use serde_derive::Serialize;
use strum_macros::{Display, IntoStaticStr};

/// SQLSTATE `duplicate_table`.
const DUPLICATE_TABLE: &str = "42P07";
/// SQLSTATE `query_canceled`, raised when `statement_timeout` elapses.
const QUERY_CANCELED: &str = "57014";
/// SQLSTATE `lock_not_available`, raised when `lock_timeout` elapses.
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// SQLSTATEs for the server shutting down or refusing new connections.
const SERVER_SHUTDOWN: [&str; 3] = ["57P01", "57P02", "57P03"];
/// SQLSTATE classes `connection_exception` and `invalid_authorization_specification`.
const CONNECTION_CLASSES: [&str; 2] = ["08", "28"];

/// The steps of a schema change unit, in the order they run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum ApplyStep {
    Begin,
    EnableExtension,
    CreateTable,
    CreateTriggerFunctions,
    CreateTriggers,
    Commit,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum SchemaChangeErrorKind {
    ExtensionUnavailable,
    TableAlreadyExists,
    Connection,
    Timeout,
    UnsupportedBackend,
    Other,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaChangeError {
    /// The extension could not be enabled, e.g. because it isn't installed on the server or the
    /// role lacks the privilege to create it.
    #[error("Unable to enable the `{extension}` extension: {source}")]
    ExtensionUnavailable { extension: String, source: DbErr },

    /// The table already exists even though the unit was not recorded as applied. This points to
    /// an inconsistent migration ledger rather than a problem with the data.
    #[error("Table `{table}` already exists: {source}")]
    TableAlreadyExists { table: String, source: DbErr },

    #[error("Database connection failed: {0}")]
    Connection(#[source] DbErr),

    #[error("Timed out waiting on the database: {0}")]
    Timeout(#[source] DbErr),

    /// The unit relies on Postgres-only DDL (extensions, plpgsql triggers).
    #[error("Unsupported database backend: {backend:?}")]
    UnsupportedBackend { backend: DbBackend },

    #[error("Step `{step}` failed: {source}")]
    Other { step: ApplyStep, source: DbErr },
}

impl SchemaChangeError {
    /// Classify the error returned while running `step`. `subject` names the object the step
    /// operates on (the extension for [`ApplyStep::EnableExtension`], otherwise the table).
    pub fn classify(step: ApplyStep, subject: impl Into<String>, err: DbErr) -> Self {
        match kind_of(step, &err) {
            SchemaChangeErrorKind::ExtensionUnavailable => Self::ExtensionUnavailable {
                extension: subject.into(),
                source: err,
            },
            SchemaChangeErrorKind::TableAlreadyExists => Self::TableAlreadyExists {
                table: subject.into(),
                source: err,
            },
            SchemaChangeErrorKind::Connection => Self::Connection(err),
            SchemaChangeErrorKind::Timeout => Self::Timeout(err),
            SchemaChangeErrorKind::UnsupportedBackend | SchemaChangeErrorKind::Other => {
                Self::Other { step, source: err }
            }
        }
    }

    pub fn kind(&self) -> SchemaChangeErrorKind {
        match self {
            Self::ExtensionUnavailable { .. } => SchemaChangeErrorKind::ExtensionUnavailable,
            Self::TableAlreadyExists { .. } => SchemaChangeErrorKind::TableAlreadyExists,
            Self::Connection(_) => SchemaChangeErrorKind::Connection,
            Self::Timeout(_) => SchemaChangeErrorKind::Timeout,
            Self::UnsupportedBackend { .. } => SchemaChangeErrorKind::UnsupportedBackend,
            Self::Other { .. } => SchemaChangeErrorKind::Other,
        }
    }

    /// The driver error behind this failure, if there is one.
    pub fn db_err(&self) -> Option<&DbErr> {
        match self {
            Self::ExtensionUnavailable { source, .. }
            | Self::TableAlreadyExists { source, .. }
            | Self::Other { source, .. } => Some(source),
            Self::Connection(source) | Self::Timeout(source) => Some(source),
            Self::UnsupportedBackend { .. } => None,
        }
    }
}

fn kind_of(step: ApplyStep, err: &DbErr) -> SchemaChangeErrorKind {
    if let Some(sqlx_err) = sqlx_error(err) {
        match sqlx_err {
            sqlx::Error::PoolTimedOut => return SchemaChangeErrorKind::Timeout,
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => return SchemaChangeErrorKind::Connection,
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    return sqlstate_kind(step, &code);
                }
            }
            _ => {}
        }
    }

    match err {
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => SchemaChangeErrorKind::Timeout,
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => SchemaChangeErrorKind::Connection,
        _ => step_kind(step),
    }
}

fn sqlstate_kind(step: ApplyStep, code: &str) -> SchemaChangeErrorKind {
    match code {
        QUERY_CANCELED | LOCK_NOT_AVAILABLE => SchemaChangeErrorKind::Timeout,
        code if SERVER_SHUTDOWN.contains(&code) => SchemaChangeErrorKind::Connection,
        code if CONNECTION_CLASSES
            .iter()
            .any(|class| code.starts_with(class)) =>
        {
            SchemaChangeErrorKind::Connection
        }
        DUPLICATE_TABLE if step == ApplyStep::CreateTable => {
            SchemaChangeErrorKind::TableAlreadyExists
        }
        _ => step_kind(step),
    }
}

/// Fallback when the error carries no more specific signal.
fn step_kind(step: ApplyStep) -> SchemaChangeErrorKind {
    match step {
        ApplyStep::EnableExtension => SchemaChangeErrorKind::ExtensionUnavailable,
        _ => SchemaChangeErrorKind::Other,
    }
}

fn sqlx_error(err: &DbErr) -> Option<&sqlx::Error> {
    match err {
        DbErr::Conn(RuntimeErr::SqlxError(err))
        | DbErr::Exec(RuntimeErr::SqlxError(err))
        | DbErr::Query(RuntimeErr::SqlxError(err)) => Some(err),
        _ => None,
    }
}
