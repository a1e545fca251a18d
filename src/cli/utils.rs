use serde_json::{json, Value};
use thiserror::Error;

use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::{DatabaseManager, PgStore};

/// Command failures that carry a machine-readable code
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("{0}")]
    NotFound(String),
}

/// Code attached to a JSON error report
pub fn error_code(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<CliError>() {
        Some(CliError::Invalid(_)) => Some("VALIDATION_ERROR"),
        Some(CliError::NotFound(_)) => Some("NOT_FOUND"),
        None => None,
    }
}

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(Value::Object(extra)) = data {
                for (key, value) in extra {
                    match value {
                        Value::String(s) => println!("  {}: {}", key, s),
                        other => println!("  {}: {}", key, other),
                    }
                }
            }
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Connect to the configured PostgreSQL database. Admin commands never use
/// the in-memory store.
pub async fn connect_store() -> anyhow::Result<PgStore> {
    let pool = DatabaseManager::connect(&config().database).await?;
    Ok(PgStore::new(pool))
}
