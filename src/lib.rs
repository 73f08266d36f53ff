//! Factlane: two-stage forensic document triage and extraction.
//!
//! Scanned legal and financial documents are classified into a fixed
//! taxonomy of investigation lanes, then mined for schema-conformant
//! fields by a multimodal model; results land in a durable fact base
//! keyed by document identity, with idempotent merge-upsert writes and a
//! one-way `INGESTED -> PROCESSED | ERROR` status machine.

pub mod config;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod store;
pub mod taxonomy;

pub use config::PipelineConfig;
pub use pipeline::analyzer::{AnalysisOutcome, DocumentAnalyzer};
pub use pipeline::runner::{build_schema_pipeline, IngestPipeline};
pub use pipeline::PipelineError;
pub use store::{CaseRecord, CaseStatus, FactBase, ObjectStore, SqliteFactBase};
pub use taxonomy::TaxonomyRegistry;
