pub mod query;
pub mod store;

pub use query::QueryBuilder;
pub use store::Store;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}
