use serde_json::{json, Map, Value};

use crate::api::serializers::ProfileInput;
use crate::cli::utils::{connect_store, output_success, CliError};
use crate::cli::OutputFormat;
use crate::database::Store;
use crate::services::{accounts, AccountError};
use crate::validation::normalize_email;

pub async fn create_user(
    email: String,
    name: String,
    password: String,
    staff: bool,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut data = Map::new();
    data.insert("email".to_string(), Value::String(email));
    data.insert("name".to_string(), Value::String(name));
    data.insert("password".to_string(), Value::String(password));

    let input = ProfileInput::validate(&data, false)
        .map_err(|errors| CliError::Invalid(json!(errors).to_string()))?;

    let store = connect_store().await?;
    let user = match accounts::register(&store, input, staff).await {
        Ok(user) => user,
        Err(AccountError::Invalid(errors)) => return Err(CliError::Invalid(json!(errors).to_string()).into()),
        Err(e) => return Err(e.into()),
    };

    output_success(
        output_format,
        &format!("Created user '{}'", user.email),
        Some(json!({ "id": user.id, "email": user.email, "is_staff": user.is_staff })),
    )
}

pub async fn set_active(email: String, active: bool, output_format: &OutputFormat) -> anyhow::Result<()> {
    let store = connect_store().await?;
    let user = accounts::set_active(&store, &email, active)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("No user with email '{}'", email)))?;

    let verb = if active { "Activated" } else { "Deactivated" };
    output_success(
        output_format,
        &format!("{} user '{}'", verb, user.email),
        Some(json!({ "id": user.id, "is_active": user.is_active })),
    )
}

pub async fn issue_token(email: String, output_format: &OutputFormat) -> anyhow::Result<()> {
    let store = connect_store().await?;
    let email = normalize_email(email.trim());

    let user = store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("No user with email '{}'", email)))?;

    let token = accounts::issue_token(&store, &user).await?;
    output_success(
        output_format,
        &format!("Issued token for '{}'", user.email),
        Some(json!({ "token": token })),
    )
}
