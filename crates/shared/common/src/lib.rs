//! Common utilities shared across services.
//!
//! This crate provides:
//! - Normalized error handling for the persistence layer
//! - A cancellable execution context for storage calls
//! - Configuration structures

pub mod config;
pub mod context;
pub mod error;

pub use config::*;
pub use context::{Context, Interrupted};
pub use error::{AppError, AppResult, BoxError, ErrorKind, OptionExt};
