//! Input schemas for each endpoint.
//!
//! Each `validate` collects every field problem before returning, so a
//! client sees all errors in one response.

use serde_json::{Map, Value};

use crate::validation::{normalize_email, CharField, FieldErrors};

const EMAIL: CharField = CharField::new("email").max_length(255).email();
const NAME: CharField = CharField::new("name").max_length(255);
const PASSWORD: CharField = CharField::new("password").keep_whitespace();
const STATUS_TEXT: CharField = CharField::new("status_text").max_length(255);
const HELLO_NAME: CharField = CharField::new("name").max_length(10);
const USERNAME: CharField = CharField::new("username");
const LOGIN_PASSWORD: CharField = CharField::new("password").keep_whitespace();

/// Profile fields. On a full write all are present; on a partial update any
/// subset may be.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileInput {
    pub email: Option<String>,
    pub name: Option<String>,
    /// Plaintext; hashed before it reaches the store
    pub password: Option<String>,
}

impl ProfileInput {
    pub fn validate(data: &Map<String, Value>, partial: bool) -> Result<Self, FieldErrors> {
        let required = !partial;
        let mut errors = FieldErrors::new();

        let email = EMAIL
            .extract(data, required, &mut errors)
            .map(|email| normalize_email(&email));
        let name = NAME.extract(data, required, &mut errors);
        let password = PASSWORD.extract(data, required, &mut errors);

        errors.into_result(Self { email, name, password })
    }
}

/// Feed item fields. `id`, `owner_id` and `created_at` are read-only and
/// ignored when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItemInput {
    pub status_text: Option<String>,
}

impl FeedItemInput {
    pub fn validate(data: &Map<String, Value>, partial: bool) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let status_text = STATUS_TEXT.extract(data, !partial, &mut errors);
        errors.into_result(Self { status_text })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloInput {
    pub name: String,
}

impl HelloInput {
    pub fn validate(data: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = HELLO_NAME.extract(data, true, &mut errors);
        match name {
            Some(name) if errors.is_empty() => Ok(Self { name }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(data: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = USERNAME.extract(data, true, &mut errors);
        let password = LOGIN_PASSWORD.extract(data, true, &mut errors);
        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => Ok(Self { username, password }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{BLANK, INVALID_EMAIL, REQUIRED};
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn profile_create_needs_every_field() {
        let errors = ProfileInput::validate(&data(json!({})), false).unwrap_err();
        for field in ["email", "name", "password"] {
            assert_eq!(errors.get(field).unwrap(), [REQUIRED.to_string()], "{}", field);
        }
    }

    #[test]
    fn profile_patch_accepts_subsets() {
        let input = ProfileInput::validate(&data(json!({ "name": "Ada" })), true).unwrap();
        assert_eq!(input, ProfileInput { name: Some("Ada".into()), ..Default::default() });
    }

    #[test]
    fn profile_email_is_checked_and_normalized() {
        let errors = ProfileInput::validate(
            &data(json!({ "email": "nope", "name": "Ada", "password": "pw" })),
            false,
        )
        .unwrap_err();
        assert_eq!(errors.get("email").unwrap(), [INVALID_EMAIL.to_string()]);

        let input = ProfileInput::validate(
            &data(json!({ "email": "Ada@Example.COM", "name": "Ada", "password": "pw" })),
            false,
        )
        .unwrap();
        assert_eq!(input.email.as_deref(), Some("Ada@example.com"));
    }

    #[test]
    fn feed_item_ignores_read_only_fields() {
        let input = FeedItemInput::validate(
            &data(json!({ "status_text": "hi", "owner_id": 99, "id": 5 })),
            false,
        )
        .unwrap();
        assert_eq!(input.status_text.as_deref(), Some("hi"));
    }

    #[test]
    fn feed_item_rejects_blank_text() {
        let errors = FeedItemInput::validate(&data(json!({ "status_text": "  " })), true).unwrap_err();
        assert_eq!(errors.get("status_text").unwrap(), [BLANK.to_string()]);
    }

    #[test]
    fn hello_name_is_short() {
        assert!(HelloInput::validate(&data(json!({ "name": "Ada" }))).is_ok());
        let errors = HelloInput::validate(&data(json!({ "name": "Ada Lovelace" }))).unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            ["Ensure this field has no more than 10 characters.".to_string()]
        );
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginInput::validate(&data(json!({ "username": "ada@example.com" }))).unwrap_err();
        assert!(!errors.contains("username"));
        assert_eq!(errors.get("password").unwrap(), [REQUIRED.to_string()]);
    }
}
