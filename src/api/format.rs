use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{FeedItem, User};

/// Public view of a user profile. The password hash and account flags stay
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItemView {
    pub id: i64,
    pub owner_id: i64,
    pub status_text: String,
    pub created_at: DateTime<Utc>,
}

impl From<&FeedItem> for FeedItemView {
    fn from(item: &FeedItem) -> Self {
        Self {
            id: item.id,
            owner_id: item.owner_id,
            status_text: item.status_text.clone(),
            created_at: item.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_view_hides_password() {
        let user = User {
            id: 1,
            email: "ada@example.com".into(),
            name: "Ada".into(),
            password: "$argon2id$secret".into(),
            is_active: true,
            is_staff: true,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(ProfileView::from(&user)).unwrap();
        assert_eq!(value, json!({ "id": 1, "email": "ada@example.com", "name": "Ada" }));
    }
}
