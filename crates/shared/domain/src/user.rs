//! User and role entities and the inputs that create or change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// User domain entity
///
/// `id` is the store-assigned surrogate key and is never serialized;
/// `uuid` is the public handle.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing, default)]
    pub id: i32,
    pub uuid: Uuid,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub phone_number: String,
    pub email: String,
    pub role_id: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Loaded by lookups; absent on the value returned from registration
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<Role>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("role", &self.role)
            .finish()
    }
}

/// Registration input. The password arrives already hashed.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub username: String,
    pub password: String,
    pub phone_number: String,
    pub email: String,
    pub role_id: i32,
}

impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .finish()
    }
}

/// Partial replacement of a user's mutable fields.
///
/// `None` leaves the stored value untouched. The public identifier and
/// role are not replaceable.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl UpdateUser {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.phone_number.is_none()
            && self.email.is_none()
    }
}

impl std::fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUser")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .finish()
    }
}
