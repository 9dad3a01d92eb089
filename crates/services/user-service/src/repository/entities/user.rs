//! User database entity for SeaORM.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    pub name: String,
    pub username: String,
    pub password: String,
    pub phone_number: String,
    pub email: String,
    pub role_id: i32,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Role,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

/// Store-managed timestamps: `created_at` on insert, `updated_at` on every save.
#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();
        if insert {
            self.created_at = Set(Some(now));
        }
        self.updated_at = Set(Some(now));
        Ok(self)
    }
}

/// Convert database model to domain entity (role association not loaded)
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            uuid: model.uuid,
            name: model.name,
            username: model.username,
            password: model.password,
            phone_number: model.phone_number,
            email: model.email,
            role_id: model.role_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            role: None,
        }
    }
}

/// Convert a user row joined with its role
pub fn with_role(model: Model, role: Option<super::role::Model>) -> User {
    User {
        role: role.map(Into::into),
        ..User::from(model)
    }
}
