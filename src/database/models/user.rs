use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::policy::Owned;

/// A registered account. Doubles as the public profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Argon2 PHC string, never serialized
    #[serde(skip_serializing)]
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl Owned for User {
    // A profile belongs to the user it describes
    fn owner_id(&self) -> Option<i64> {
        Some(self.id)
    }
}

/// Insert payload; `password` is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_staff: bool,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UserChanges {
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
    }
}
