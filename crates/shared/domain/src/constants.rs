//! Domain-level constants.
//!
//! These constants define the bounds of persisted identity fields.

// =============================================================================
// Roles
// =============================================================================

/// Administrator role seeded into every fresh store
pub const ROLE_ADMIN: &str = "admin";

/// Default role for self-registered users
pub const ROLE_CUSTOMER: &str = "customer";

/// Roles inserted by the seed migration, in insertion order
pub const SEEDED_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_CUSTOMER];

/// Maximum role name length
pub const ROLE_NAME_MAX_LENGTH: u32 = 50;

// =============================================================================
// User fields
// =============================================================================

/// Maximum display name length
pub const NAME_MAX_LENGTH: u32 = 100;

/// Maximum stored password length (sized for encoded hashes)
pub const PASSWORD_MAX_LENGTH: u32 = 255;

/// Maximum phone number length
pub const PHONE_NUMBER_MAX_LENGTH: u32 = 15;

/// Maximum email address length
pub const EMAIL_MAX_LENGTH: u32 = 100;
