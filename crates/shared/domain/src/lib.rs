//! Domain layer - Core identity entities and value objects.
//!
//! This crate contains plain data types with no infrastructure dependencies.
//! Storage mapping for these types lives in the user-service repository layer.

pub mod constants;
pub mod user;

pub use constants::*;
pub use user::{RegisterUser, Role, UpdateUser, User};
