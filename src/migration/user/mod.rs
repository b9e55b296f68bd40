//! The `users` table: enables `uuid-ossp`, then creates the table along with the triggers that
//! maintain its timestamp columns.

use sea_orm_migration::prelude::*;

mod create_table;
pub mod m20230801_171341_create_users;


/// The ordered list of schema change units that build the `users` table.
pub struct UsersMigrator;

#[async_trait::async_trait]
impl MigratorTrait for UsersMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20230801_171341_create_users::Migration)]
    }
}

/// Contains the identifiers/fields of the `users` table.
#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    /// Identifier of the user in the system that owns the account. Not interpreted here.
    UserId,
    Email,
    /// Stored as provided. Hashing is the responsibility of the application writing the row.
    Password,
    Username,
    IsValid,
}
