//! Per-event ingestion orchestration.
//!
//! One storage event = one independent unit of work. The runner writes
//! the `INGESTED` patch before touching the model so a provenance record
//! exists even when analysis dies mid-flight, then funnels every stage
//! failure into a best-effort `ERROR` write. Only a failure of that
//! error write itself escapes to the caller.

use std::sync::Arc;

use chrono::Utc;

use super::analyzer::{AnalysisOutcome, DocumentAnalyzer, SchemaDrivenAnalyzer};
use super::extract::SchemaExtractor;
use super::triage::TriageClassifier;
use super::types::{DocumentEvent, DocumentPayload};
use super::PipelineError;
use crate::config::PipelineConfig;
use crate::model::OllamaMultimodalClient;
use crate::store::{case_id_from_path, CasePatch, CaseStatus, FactBase, ObjectStore};
use crate::taxonomy::{forensic_lanes, TaxonomyRegistry};

pub struct IngestPipeline {
    objects: Arc<dyn ObjectStore>,
    factbase: Arc<dyn FactBase>,
    analyzer: Arc<dyn DocumentAnalyzer>,
    retry_budget: u32,
}

impl IngestPipeline {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        factbase: Arc<dyn FactBase>,
        analyzer: Arc<dyn DocumentAnalyzer>,
    ) -> Self {
        Self {
            objects,
            factbase,
            analyzer,
            retry_budget: 1,
        }
    }

    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    /// Process one storage event to completion.
    ///
    /// Returns the terminal status written for the case, or `None` when
    /// the event was a no-op (directory marker, empty name). Stage errors
    /// are recorded on the case and swallowed; only a failure to persist
    /// the `ERROR` record propagates, so the platform can redeliver.
    pub fn handle_event(
        &self,
        event: &DocumentEvent,
    ) -> Result<Option<CaseStatus>, PipelineError> {
        if event.name.is_empty() || event.is_directory() {
            tracing::debug!(name = %event.name, "skipping non-document event");
            return Ok(None);
        }

        let case_id = case_id_from_path(&event.name);
        let span = tracing::info_span!("ingest", case_id = %case_id, bucket = %event.bucket);
        let _guard = span.enter();

        match self.process(event, &case_id) {
            Ok(()) => {
                tracing::info!("case processed");
                Ok(Some(CaseStatus::Processed))
            }
            Err(err) => {
                tracing::error!(error = %err, "pipeline stage failed, recording error");
                let patch = CasePatch::failure(&err.to_string());
                match self.factbase.upsert(&case_id, &patch) {
                    Ok(()) => Ok(Some(CaseStatus::Error)),
                    Err(store_err) => {
                        tracing::error!(error = %store_err, "failed to persist error record");
                        Err(PipelineError::Persistence(store_err))
                    }
                }
            }
        }
    }

    fn process(&self, event: &DocumentEvent, case_id: &str) -> Result<(), PipelineError> {
        // Never move a record that already reached a terminal status back
        // to INGESTED; a redelivered event still refreshes everything else.
        let existing = self.factbase.get(case_id)?;
        let already_terminal = existing
            .as_ref()
            .and_then(|record| record.status)
            .is_some_and(|status| status.is_terminal());

        let ingested_at = event.time_created.unwrap_or_else(Utc::now);
        let mut ingested = CasePatch::ingested(event, ingested_at);
        if already_terminal {
            ingested = ingested.without_status();
        }
        // The ingestion timestamp records first sight, not the latest delivery.
        if existing.is_some_and(|record| record.ingested_at.is_some()) {
            ingested.ingested_at = None;
        }
        self.factbase.upsert(case_id, &ingested)?;

        let object = self.objects.fetch(&event.bucket, &event.name)?;
        let size = object.size;
        let media_type = object
            .content_type
            .or_else(|| event.content_type.clone())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let payload = DocumentPayload::new(object.bytes, media_type);
        let uri = self.objects.uri(&event.bucket, &event.name);

        let outcome = self.analyze_with_retry(&payload, &uri)?;

        let patch = CasePatch::processed(outcome).with_size(size);
        self.factbase.upsert(case_id, &patch)?;
        Ok(())
    }

    fn analyze_with_retry(
        &self,
        doc: &DocumentPayload,
        uri: &str,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let mut attempt = 0;
        loop {
            match self.analyzer.analyze(doc, uri) {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_retryable() && attempt < self.retry_budget => {
                    attempt += 1;
                    tracing::warn!(error = %err, attempt, "transient model failure, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Wire up the schema-driven pipeline from configuration: shared Ollama
/// client, static taxonomy, caller-supplied stores.
pub fn build_schema_pipeline(
    config: &PipelineConfig,
    objects: Arc<dyn ObjectStore>,
    factbase: Arc<dyn FactBase>,
) -> IngestPipeline {
    let client = Arc::new(OllamaMultimodalClient::new(
        &config.model_base_url,
        config.request_timeout_secs,
    ));
    let registry = Arc::new(
        TaxonomyRegistry::new(forensic_lanes()).expect("built-in forensic catalog is invalid"),
    );
    let analyzer = SchemaDrivenAnalyzer::new(
        TriageClassifier::new(client.clone(), registry.clone(), &config.triage_model),
        SchemaExtractor::new(client, registry, &config.extraction_model),
    );
    IngestPipeline::new(objects, factbase, Arc::new(analyzer))
        .with_retry_budget(config.retry_budget)
}
