//! Stage 1: triage. Maps one document payload to exactly one taxonomy leaf.

use std::sync::Arc;

use super::parser::parse_model_json;
use super::prompt::{build_triage_prompt, TRIAGE_SYSTEM_PROMPT};
use super::types::{DocumentPayload, TriageResult};
use super::PipelineError;
use crate::model::MultimodalClient;
use crate::taxonomy::TaxonomyRegistry;

/// Classifies a document against the lane catalog via the hosted
/// multimodal capability. Holds no retry loop — retries are the
/// caller's concern.
pub struct TriageClassifier {
    client: Arc<dyn MultimodalClient>,
    registry: Arc<TaxonomyRegistry>,
    model: String,
}

impl TriageClassifier {
    pub fn new(
        client: Arc<dyn MultimodalClient>,
        registry: Arc<TaxonomyRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            registry,
            model: model.into(),
        }
    }

    /// Classify one document into a `TriageResult`.
    ///
    /// A successfully parsed result is not guaranteed to resolve in the
    /// registry — the model is untrusted — so the extraction stage
    /// re-validates the pair before doing anything with it.
    pub fn classify(&self, doc: &DocumentPayload) -> Result<TriageResult, PipelineError> {
        doc.validate()?;

        let prompt = build_triage_prompt(&self.registry);
        let raw = self
            .client
            .generate(
                &self.model,
                &prompt,
                Some(TRIAGE_SYSTEM_PROMPT),
                &doc.bytes,
                &doc.media_type,
            )
            .map_err(PipelineError::ClassificationService)?;

        let mut triage: TriageResult =
            parse_model_json(&raw).map_err(PipelineError::ClassificationParse)?;
        triage.confidence = triage.confidence.clamp(0.0, 1.0);

        tracing::info!(
            lane_id = %triage.lane_id,
            path_id = %triage.path_id,
            confidence = triage.confidence,
            handwriting = triage.handwriting_density.as_str(),
            "triage classified document"
        );

        Ok(triage)
    }
}
