//! Repository registry - the single construction point for repositories.
//!
//! Consumers ask the registry for a repository instead of building one,
//! so tests can hand them a [`MockRepositoryRegistry`] or any other double.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Repository registry trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait RepositoryRegistry: Send + Sync {
    /// Get a user repository bound to the shared storage handle
    fn users(&self) -> Arc<dyn UserRepository>;
}

/// Registry over a shared database connection
#[derive(Clone, Debug)]
pub struct Registry {
    db: DatabaseConnection,
}

impl Registry {
    /// Create a registry around an injected storage handle
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl RepositoryRegistry for Registry {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(UserStore::new(self.db.clone()))
    }
}
