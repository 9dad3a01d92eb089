//! User Service Library
//!
//! Persistence layer for user identity records: the [`UserRepository`]
//! capability, its SeaORM implementation, and the [`Registry`] that hands
//! repositories to callers.
//!
//! ```ignore
//! let config = UserServiceConfig::from_env();
//! let registry = user_service::bootstrap(&config).await?;
//!
//! let ctx = config.operation_context();
//! let user = registry.users().find_by_username(&ctx, "ann1").await?;
//! ```

pub mod config;
pub mod infra;
pub mod registry;
pub mod repository;

use common::AppResult;

pub use crate::config::UserServiceConfig;
pub use crate::infra::Database;
pub use crate::registry::{Registry, RepositoryRegistry};
pub use crate::repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use crate::registry::MockRepositoryRegistry;
#[cfg(any(test, feature = "test-utils"))]
pub use crate::repository::MockUserRepository;

/// Connect to storage, apply pending migrations, and build the registry.
pub async fn bootstrap(config: &UserServiceConfig) -> AppResult<Registry> {
    tracing::info!(config = ?config.database, "Connecting user store");
    let db = Database::connect(&config.database).await?;
    Ok(Registry::new(db.get_connection()))
}
