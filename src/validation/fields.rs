use serde_json::{Map, Value};
use validator::{ValidateEmail, ValidateLength};

use super::{FieldErrors, BLANK, INVALID_EMAIL, NOT_A_STRING, NULL, REQUIRED};

/// A string field with optional length limit and email format
#[derive(Debug, Clone, Copy)]
pub struct CharField {
    pub name: &'static str,
    pub max_length: Option<u64>,
    pub trim_whitespace: bool,
    pub email: bool,
}

impl CharField {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            max_length: None,
            trim_whitespace: true,
            email: false,
        }
    }

    pub const fn max_length(mut self, max_length: u64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub const fn email(mut self) -> Self {
        self.email = true;
        self
    }

    pub const fn keep_whitespace(mut self) -> Self {
        self.trim_whitespace = false;
        self
    }

    /// Pull this field out of `data`, recording any problem in `errors`.
    ///
    /// A missing field is an error only when `required` is set; otherwise it
    /// yields `None` without complaint.
    pub fn extract(&self, data: &Map<String, Value>, required: bool, errors: &mut FieldErrors) -> Option<String> {
        let raw = match data.get(self.name) {
            None => {
                if required {
                    errors.add(self.name, REQUIRED);
                }
                return None;
            }
            Some(Value::Null) => {
                errors.add(self.name, NULL);
                return None;
            }
            Some(Value::String(s)) => s.clone(),
            // Numbers are accepted and coerced, like any form-encoded value would be
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                errors.add(self.name, NOT_A_STRING);
                return None;
            }
        };

        let value = if self.trim_whitespace {
            raw.trim().to_string()
        } else {
            raw
        };

        if value.is_empty() {
            errors.add(self.name, BLANK);
            return None;
        }

        if let Some(max) = self.max_length {
            if !value.validate_length(None, Some(max), None) {
                errors.add(
                    self.name,
                    format!("Ensure this field has no more than {} characters.", max),
                );
                return None;
            }
        }

        if self.email && !value.validate_email() {
            errors.add(self.name, INVALID_EMAIL);
            return None;
        }

        Some(value)
    }
}

/// Lowercase the domain part; the local part is left alone.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn required_field_missing() {
        let mut errors = FieldErrors::new();
        let field = CharField::new("name");
        assert_eq!(field.extract(&data(json!({})), true, &mut errors), None);
        assert_eq!(errors.get("name").unwrap(), [REQUIRED.to_string()]);
    }

    #[test]
    fn optional_field_missing_is_fine() {
        let mut errors = FieldErrors::new();
        assert_eq!(CharField::new("name").extract(&data(json!({})), false, &mut errors), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn trims_and_rejects_blank() {
        let mut errors = FieldErrors::new();
        let field = CharField::new("name");
        assert_eq!(
            field.extract(&data(json!({ "name": "  Ada  " })), true, &mut errors),
            Some("Ada".to_string())
        );
        assert_eq!(field.extract(&data(json!({ "name": "   " })), true, &mut errors), None);
        assert_eq!(errors.get("name").unwrap(), [BLANK.to_string()]);
    }

    #[test]
    fn keeps_whitespace_when_asked() {
        let mut errors = FieldErrors::new();
        let field = CharField::new("password").keep_whitespace();
        assert_eq!(
            field.extract(&data(json!({ "password": " secret " })), true, &mut errors),
            Some(" secret ".to_string())
        );
    }

    #[test]
    fn enforces_max_length_in_chars() {
        let mut errors = FieldErrors::new();
        let field = CharField::new("name").max_length(3);
        assert_eq!(
            field.extract(&data(json!({ "name": "äöü" })), true, &mut errors),
            Some("äöü".to_string())
        );
        assert_eq!(field.extract(&data(json!({ "name": "abcd" })), true, &mut errors), None);
        assert_eq!(
            errors.get("name").unwrap(),
            ["Ensure this field has no more than 3 characters.".to_string()]
        );
    }

    #[test]
    fn rejects_non_strings() {
        let mut errors = FieldErrors::new();
        let field = CharField::new("name");
        assert_eq!(field.extract(&data(json!({ "name": ["a"] })), true, &mut errors), None);
        assert_eq!(field.extract(&data(json!({ "name": 42 })), true, &mut errors), Some("42".to_string()));
        assert_eq!(errors.get("name").unwrap(), [NOT_A_STRING.to_string()]);
    }

    #[test]
    fn null_is_rejected() {
        let mut errors = FieldErrors::new();
        assert_eq!(CharField::new("name").extract(&data(json!({ "name": null })), false, &mut errors), None);
        assert_eq!(errors.get("name").unwrap(), [NULL.to_string()]);
    }

    #[test]
    fn email_fields_check_format() {
        let field = CharField::new("email").max_length(255).email();
        let mut errors = FieldErrors::new();
        for good in ["ada@example.com", "first.last+tag@mail.example.org"] {
            assert_eq!(
                field.extract(&data(json!({ "email": good })), true, &mut errors),
                Some(good.to_string())
            );
        }
        assert!(errors.is_empty());

        for bad in ["ada", "@example.com", "ada@@example.com", "ada lovelace@example.com"] {
            let mut errors = FieldErrors::new();
            assert_eq!(field.extract(&data(json!({ "email": bad })), true, &mut errors), None, "{}", bad);
            assert_eq!(errors.get("email").unwrap(), [INVALID_EMAIL.to_string()]);
        }
    }

    #[test]
    fn length_is_checked_before_format() {
        let field = CharField::new("email").max_length(8).email();
        let mut errors = FieldErrors::new();
        assert_eq!(field.extract(&data(json!({ "email": "ada@example.com" })), true, &mut errors), None);
        assert_eq!(
            errors.get("email").unwrap(),
            ["Ensure this field has no more than 8 characters.".to_string()]
        );
    }

    #[test]
    fn normalizes_domain_only() {
        assert_eq!(normalize_email("Ada@Example.COM"), "Ada@example.com");
    }
}
