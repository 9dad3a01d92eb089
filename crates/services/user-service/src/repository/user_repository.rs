//! User repository implementation.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::role::Entity as RoleEntity;
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult, Context, OptionExt};
use domain::{RegisterUser, UpdateUser, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Every operation runs under the caller's [`Context`]; cancellation or an
/// expired deadline aborts the storage call. Nothing is retried here.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user with a freshly generated public identifier
    async fn register(&self, ctx: &Context, input: RegisterUser) -> AppResult<User>;

    /// Replace the supplied fields of the user identified by `uuid`.
    ///
    /// Returns the submitted values; the row is not re-read.
    async fn update(&self, ctx: &Context, changes: UpdateUser, uuid: Uuid)
        -> AppResult<UpdateUser>;

    /// Find user by exact username
    async fn find_by_username(&self, ctx: &Context, username: &str) -> AppResult<User>;

    /// Find user by exact email address
    async fn find_by_email(&self, ctx: &Context, email: &str) -> AppResult<User>;

    /// Find user by public identifier
    async fn find_by_uuid(&self, ctx: &Context, uuid: Uuid) -> AppResult<User>;
}

/// SeaORM-backed implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// First user matching `filter`, ordered by surrogate key, with its role
    async fn find_one<F>(&self, ctx: &Context, filter: F) -> AppResult<User>
    where
        F: sea_orm::sea_query::IntoCondition + Send,
    {
        let found = ctx
            .run(
                UserEntity::find()
                    .filter(filter)
                    .order_by_asc(user::Column::Id)
                    .find_also_related(RoleEntity)
                    .one(&self.db),
            )
            .await?;

        found
            .map(|(model, role)| user::with_role(model, role))
            .ok_or_not_found()
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn register(&self, ctx: &Context, input: RegisterUser) -> AppResult<User> {
        let active_model = ActiveModel {
            uuid: Set(Uuid::new_v4()),
            name: Set(input.name),
            username: Set(input.username),
            password: Set(input.password),
            phone_number: Set(input.phone_number),
            email: Set(input.email),
            role_id: Set(input.role_id),
            ..Default::default()
        };

        let model = ctx.run(active_model.insert(&self.db)).await?;
        tracing::info!(uuid = %model.uuid, role_id = model.role_id, "User registered");

        Ok(User::from(model))
    }

    async fn update(
        &self,
        ctx: &Context,
        changes: UpdateUser,
        uuid: Uuid,
    ) -> AppResult<UpdateUser> {
        // Nothing to write; still report an unknown uuid
        if changes.is_empty() {
            self.find_by_uuid(ctx, uuid).await?;
            return Ok(changes);
        }

        let mut stmt = UserEntity::update_many().filter(user::Column::Uuid.eq(uuid));

        let columns = [
            (user::Column::Name, &changes.name),
            (user::Column::Username, &changes.username),
            (user::Column::Password, &changes.password),
            (user::Column::PhoneNumber, &changes.phone_number),
            (user::Column::Email, &changes.email),
        ];
        for (column, value) in columns {
            if let Some(value) = value {
                stmt = stmt.col_expr(column, Expr::value(value.clone()));
            }
        }
        stmt = stmt.col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()));

        let result = ctx.run(stmt.exec(&self.db)).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::info!(%uuid, "User updated");
        Ok(changes)
    }

    async fn find_by_username(&self, ctx: &Context, username: &str) -> AppResult<User> {
        self.find_one(ctx, user::Column::Username.eq(username)).await
    }

    async fn find_by_email(&self, ctx: &Context, email: &str) -> AppResult<User> {
        self.find_one(ctx, user::Column::Email.eq(email)).await
    }

    async fn find_by_uuid(&self, ctx: &Context, uuid: Uuid) -> AppResult<User> {
        self.find_one(ctx, user::Column::Uuid.eq(uuid)).await
    }
}
