use sqlx::{postgres::PgPoolOptions, PgPool, Result};

pub mod memory;
pub mod queries;
pub mod store;

pub use memory::MemoryGameStore;
pub use queries::PgGameStore;
pub use store::{GameStore, StoreError, StoreResult};

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
