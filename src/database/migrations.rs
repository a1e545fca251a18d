use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

/// Idempotent schema statements, applied in order
pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "create_users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            email VARCHAR(255) NOT NULL UNIQUE,
            name VARCHAR(255) NOT NULL,
            password TEXT NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            is_staff BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    ),
    (
        "create_feed_items",
        r#"
        CREATE TABLE IF NOT EXISTS feed_items (
            id BIGSERIAL PRIMARY KEY,
            owner_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            status_text VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    ),
    (
        "index_feed_items_owner",
        "CREATE INDEX IF NOT EXISTS feed_items_owner_id_idx ON feed_items (owner_id)",
    ),
    (
        "create_auth_tokens",
        r#"
        CREATE TABLE IF NOT EXISTS auth_tokens (
            digest TEXT PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    ),
];

/// Apply every migration inside one transaction
pub async fn run(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;

    for (name, sql) in MIGRATIONS {
        sqlx::query(sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Migration(format!("{}: {}", name, e)))?;
    }

    tx.commit().await?;
    info!("Applied {} migrations", MIGRATIONS.len());
    Ok(())
}
