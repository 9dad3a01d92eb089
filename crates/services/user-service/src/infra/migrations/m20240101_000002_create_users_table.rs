//! Migration: Create users table.

use sea_orm_migration::prelude::*;

use domain::{EMAIL_MAX_LENGTH, NAME_MAX_LENGTH, PASSWORD_MAX_LENGTH, PHONE_NUMBER_MAX_LENGTH};

use super::Roles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Uuid).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Users::Name).string_len(NAME_MAX_LENGTH).not_null())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(
                        ColumnDef::new(Users::Password)
                            .string_len(PASSWORD_MAX_LENGTH)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::PhoneNumber)
                            .string_len(PHONE_NUMBER_MAX_LENGTH)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(EMAIL_MAX_LENGTH).not_null())
                    .col(ColumnDef::new(Users::RoleId).integer().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_role_id")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup indexes for find-by-username and find-by-email
        manager
            .create_index(
                Index::create()
                    .name("idx_users_username")
                    .table(Users::Table)
                    .col(Users::Username)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uuid,
    Name,
    Username,
    Password,
    PhoneNumber,
    Email,
    RoleId,
    CreatedAt,
    UpdatedAt,
}
