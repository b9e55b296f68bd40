//! The schema change units this crate ships, the building blocks they are made of, and a thin
//! runner over SeaORM's migration ledger.

pub mod runner;
pub mod schema;
pub mod trigger;
pub mod user;
pub mod uuid;

pub use runner::{DownArgs, MigrationInfo, MigrationStatus, Runner, UpArgs};
pub use user::UsersMigrator;
