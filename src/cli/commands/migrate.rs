use serde_json::json;

use crate::cli::utils::{connect_store, output_success};
use crate::cli::OutputFormat;
use crate::database::migrations;

pub async fn handle(output_format: &OutputFormat) -> anyhow::Result<()> {
    let store = connect_store().await?;
    migrations::run(store.pool()).await?;

    output_success(
        output_format,
        "Migrations applied",
        Some(json!({ "migrations": migrations::MIGRATIONS.len() })),
    )
}
