pub mod factbase;
pub mod objects;
pub mod record;

pub use factbase::*;
pub use objects::*;
pub use record::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("record serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("object not found: {container}/{path}")]
    ObjectNotFound { container: String, path: String },

    #[error("object read error: {0}")]
    ObjectIo(#[from] std::io::Error),
}
