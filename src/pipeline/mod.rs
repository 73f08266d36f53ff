pub mod analyzer;
pub mod extract;
pub mod heuristic;
pub mod parser;
pub mod prompt;
pub mod runner;
pub mod triage;
pub mod types;

pub use analyzer::*;
pub use extract::*;
pub use heuristic::*;
pub use parser::*;
pub use prompt::*;
pub use runner::*;
pub use triage::*;
pub use types::*;

use thiserror::Error;

use crate::model::ModelError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("document payload is empty")]
    EmptyPayload,

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("triage response unparseable: {0}")]
    ClassificationParse(String),

    #[error("triage service call failed: {0}")]
    ClassificationService(ModelError),

    #[error("extraction response unparseable: {0}")]
    ExtractionParse(String),

    #[error("extraction service call failed: {0}")]
    ExtractionService(ModelError),

    #[error("classifier selected unknown taxonomy leaf {lane_id}/{path_id}")]
    UnresolvedTaxonomyLeaf { lane_id: String, path_id: String },

    #[error("OCR service call failed: {0}")]
    OcrService(String),

    #[error("fact base write failed: {0}")]
    Persistence(#[from] StoreError),
}

impl PipelineError {
    /// Whether a retry could plausibly succeed. Parse errors never qualify:
    /// the same malformed input reproduces the same malformed output.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ClassificationService(_) | Self::ExtractionService(_) | Self::OcrService(_)
        )
    }
}
