pub mod manager;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::Store;

use std::sync::Arc;

use crate::config::{DatabaseConfig, StoreBackend};

/// Build the store selected by configuration
pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(config).await?;
            if config.run_migrations {
                migrations::run(&pool).await?;
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
