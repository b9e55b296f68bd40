use crate::migration::schema::{bool_default, pk_uuidv4, table, timestamps};
use crate::migration::user::Users;
use sea_orm_migration::{prelude::*, schema::*};

pub(crate) fn create_table() -> TableCreateStatement {
    timestamps(
        table(Users::Table)
            .col(pk_uuidv4(Users::Id))
            .col(string(Users::UserId))
            .col(string(Users::Email))
            .col(string(Users::Password))
            .col(string(Users::Username))
            .col(bool_default(Users::IsValid, true))
            .to_owned(),
    )
}

pub(crate) fn drop_table() -> TableDropStatement {
    Table::drop().if_exists().table(Users::Table).to_owned()
}
