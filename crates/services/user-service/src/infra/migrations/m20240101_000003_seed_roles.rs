//! Migration: Seed the built-in roles.

use sea_orm_migration::prelude::*;

use domain::SEEDED_ROLES;

use super::Roles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(Roles::Table).columns([Roles::Name]);
        for role in SEEDED_ROLES {
            insert.values_panic([(*role).into()]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Roles::Table)
            .and_where(Expr::col(Roles::Name).is_in(SEEDED_ROLES.iter().copied()))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}
