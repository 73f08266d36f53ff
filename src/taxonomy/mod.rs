pub mod catalog;
pub mod registry;
pub mod types;

pub use catalog::*;
pub use registry::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("taxonomy catalog is empty")]
    EmptyCatalog,

    #[error("duplicate lane id: {0}")]
    DuplicateLane(String),

    #[error("duplicate path id {path} in lane {lane}")]
    DuplicatePath { lane: String, path: String },

    #[error("lane {lane} has no paths")]
    EmptyLane { lane: String },

    #[error("path {lane}/{path} has an empty extraction schema")]
    EmptySchema { lane: String, path: String },

    #[error("duplicate field {field} in schema {lane}/{path}")]
    DuplicateField {
        lane: String,
        path: String,
        field: String,
    },
}
