//! Database Module
//!
//! Embedded SurrealDB storage: RocksDB on disk at runtime, in-memory
//! engine for tests.

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "bingsu";
const DATABASE: &str = "bingsu";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database and apply schema definitions
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::init(db, &path.display().to_string()).await
    }

    /// In-memory database, used by tests
    pub async fn memory() -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::init(db, "memory").await
    }

    async fn init(db: Surreal<Db>, location: &str) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database connection established (embedded SurrealDB, {location})");
        Ok(Self { db })
    }
}

/// Table and index definitions. Tables stay schemaless (the models are the
/// schema); indexes back the hot lookups.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        "
        DEFINE TABLE IF NOT EXISTS redemption_code SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS redemption_code_code ON TABLE redemption_code COLUMNS code;
        DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS order_display_code ON TABLE order COLUMNS display_code;
        DEFINE TABLE IF NOT EXISTS loyalty_account SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS counter SCHEMALESS;
        ",
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to apply schema definitions: {e}")))?;
    Ok(())
}
