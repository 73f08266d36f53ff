//! Stage 2: schema-driven extraction.
//!
//! Consumes the triage result, re-validates the (lane, path) pair against
//! the registry before any model call, then conforms the model's output to
//! the resolved schema: missing keys are backfilled with null rather than
//! trusting the model's completeness, and fragments without a usable
//! bounding region are dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::parser::parse_model_json;
use super::prompt::{build_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use super::types::{DocumentPayload, ExtractionResult, FieldValue, Fragment, TriageResult};
use super::PipelineError;
use crate::model::MultimodalClient;
use crate::taxonomy::{ExtractionSchema, TaxonomyRegistry};

/// Raw shape of the extraction response before conformance.
#[derive(Deserialize)]
struct RawExtractionResponse {
    #[serde(default)]
    extracted_data: BTreeMap<String, Option<FieldValue>>,
    #[serde(default)]
    fragments: Vec<Value>,
}

/// Extracts schema-conformant data plus out-of-schema fragments from a
/// document whose taxonomy leaf has already been selected by triage.
pub struct SchemaExtractor {
    client: Arc<dyn MultimodalClient>,
    registry: Arc<TaxonomyRegistry>,
    model: String,
}

impl SchemaExtractor {
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

    /// Run extraction for one document.
    ///
    /// An unresolvable (lane, path) pair is a hard stop before any model
    /// call: it means a classifier hallucination or a taxonomy/classifier
    /// version mismatch, and retrying cannot fix either.
    pub fn extract(
        &self,
        doc: &DocumentPayload,
        triage: &TriageResult,
    ) -> Result<ExtractionResult, PipelineError> {
        let path = self
            .registry
            .find_path(&triage.lane_id, &triage.path_id)
            .ok_or_else(|| PipelineError::UnresolvedTaxonomyLeaf {
                lane_id: triage.lane_id.clone(),
                path_id: triage.path_id.clone(),
            })?;

        tracing::info!(
            lane_id = %triage.lane_id,
            path_id = %triage.path_id,
            schema = %path.name,
            "extracting with granular schema"
        );

        let prompt = build_extraction_prompt(path);
        let raw = self
            .client
            .generate(
                &self.model,
                &prompt,
                Some(EXTRACTION_SYSTEM_PROMPT),
                &doc.bytes,
                &doc.media_type,
            )
            .map_err(PipelineError::ExtractionService)?;

        let response: RawExtractionResponse =
            parse_model_json(&raw).map_err(PipelineError::ExtractionParse)?;

        Ok(conform_to_schema(response, &path.schema))
    }
}

/// Conform a raw response to the schema: every schema key present (null if
/// the model omitted it), field boxes validated, fragments filtered to
/// those with a non-empty valid bounding region.
fn conform_to_schema(response: RawExtractionResponse, schema: &ExtractionSchema) -> ExtractionResult {
    let mut extracted_data = response.extracted_data;

    for name in schema.field_names() {
        extracted_data.entry(name.to_string()).or_insert(None);
    }

    for field in extracted_data.values_mut() {
        if let Some(value) = field {
            if let Some(bbox) = value.bounding_box {
                if !bbox.is_valid() {
                    tracing::warn!("discarding out-of-range bounding box on extracted field");
                    value.bounding_box = None;
                }
            }
        }
    }

    let fragments: Vec<Fragment> = response
        .fragments
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Fragment>(raw) {
            Ok(fragment) if fragment.bbox.is_valid() && !fragment.bbox.is_empty() => {
                Some(fragment)
            }
            Ok(_) => {
                tracing::warn!("dropping fragment without a usable bounding region");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "dropping unparseable fragment");
                None
            }
        })
        .collect();

    ExtractionResult {
        extracted_data,
        fragments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MockMultimodalClient, MockReply};
    use crate::pipeline::types::HandwritingDensity;
    use crate::taxonomy::forensic_lanes;
    use serde_json::json;

    fn registry() -> Arc<TaxonomyRegistry> {
        Arc::new(TaxonomyRegistry::new(forensic_lanes()).unwrap())
    }

    fn deed_triage() -> TriageResult {
        TriageResult {
            lane_id: "01".into(),
            path_id: "deeds".into(),
            confidence: 0.92,
            handwriting_density: HandwritingDensity::Low,
        }
    }

    fn pdf_payload() -> DocumentPayload {
        DocumentPayload::new(b"%PDF-1.4".to_vec(), "application/pdf")
    }

    fn deed_response() -> String {
        json!({
            "extracted_data": {
                "document_type": { "value": "Warranty Deed", "bounding_box": [0.02, 0.1, 0.06, 0.9] },
                "consideration_amount": { "value": "$1.00", "bounding_box": [0.41, 0.12, 0.44, 0.35] }
            },
            "fragments": [
                { "text": "see attorney!", "bbox": [0.8, 0.05, 0.85, 0.3] }
            ]
        })
        .to_string()
    }

    #[test]
    fn extraction_backfills_missing_schema_keys_with_null() {
        let client = Arc::new(MockMultimodalClient::new(&deed_response()));
        let extractor = SchemaExtractor::new(client, registry(), "analyst-model");
        let result = extractor.extract(&pdf_payload(), &deed_triage()).unwrap();

        let schema = registry();
        let deeds = schema.find_path("01", "deeds").unwrap();
        for name in deeds.schema.field_names() {
            assert!(
                result.extracted_data.contains_key(name),
                "missing schema key {name}"
            );
        }
        // Model omitted transfer_tax; it must exist and be null.
        assert!(result.extracted_data["transfer_tax"].is_none());
        // Provided fields survive with their boxes.
        let amount = result.extracted_data["consideration_amount"]
            .as_ref()
            .unwrap();
        assert_eq!(amount.value, json!("$1.00"));
        assert!(amount.bounding_box.unwrap().is_valid());
    }

    #[test]
    fn fragments_with_valid_regions_survive() {
        let client = Arc::new(MockMultimodalClient::new(&deed_response()));
        let extractor = SchemaExtractor::new(client, registry(), "m");
        let result = extractor.extract(&pdf_payload(), &deed_triage()).unwrap();
        assert_eq!(result.fragments.len(), 1);
        assert_eq!(result.fragments[0].text, "see attorney!");
    }

    #[test]
    fn fragments_without_usable_regions_are_dropped() {
        let response = json!({
            "extracted_data": {},
            "fragments": [
                { "text": "no box at all" },
                { "text": "zero area", "bbox": [0.5, 0.5, 0.5, 0.5] },
                { "text": "out of range", "bbox": [0.0, 0.0, 2.0, 1.0] },
                { "text": "kept", "bbox": [0.1, 0.1, 0.2, 0.2] }
            ]
        })
        .to_string();
        let client = Arc::new(MockMultimodalClient::new(&response));
        let extractor = SchemaExtractor::new(client, registry(), "m");
        let result = extractor.extract(&pdf_payload(), &deed_triage()).unwrap();
        assert_eq!(result.fragments.len(), 1);
        assert_eq!(result.fragments[0].text, "kept");
    }

    #[test]
    fn unresolved_leaf_fails_before_any_model_call() {
        let client = Arc::new(MockMultimodalClient::new("unused"));
        let extractor = SchemaExtractor::new(client.clone(), registry(), "m");
        let triage = TriageResult {
            lane_id: "42".into(),
            path_id: "yachts".into(),
            confidence: 0.99,
            handwriting_density: HandwritingDensity::None,
        };
        let err = extractor.extract(&pdf_payload(), &triage).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnresolvedTaxonomyLeaf { ref lane_id, ref path_id }
                if lane_id == "42" && path_id == "yachts"
        ));
        assert!(!err.is_retryable());
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn schema_literal_is_sent_to_the_model() {
        let client = Arc::new(MockMultimodalClient::new(&deed_response()));
        let extractor = SchemaExtractor::new(client.clone(), registry(), "m");
        extractor.extract(&pdf_payload(), &deed_triage()).unwrap();
        let instructions = client.instructions();
        assert!(instructions[0].contains("target_data_elements"));
        assert!(instructions[0].contains("transfer_tax"));
    }

    #[test]
    fn malformed_response_is_extraction_parse_error() {
        let client = Arc::new(MockMultimodalClient::new("the deed says many things"));
        let extractor = SchemaExtractor::new(client, registry(), "m");
        let err = extractor
            .extract(&pdf_payload(), &deed_triage())
            .unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionParse(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn service_failure_is_retryable_extraction_error() {
        let client = Arc::new(MockMultimodalClient::scripted(vec![
            MockReply::ServiceFailure,
        ]));
        let extractor = SchemaExtractor::new(client, registry(), "m");
        let err = extractor
            .extract(&pdf_payload(), &deed_triage())
            .unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionService(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn out_of_range_field_box_is_discarded_but_value_kept() {
        let response = json!({
            "extracted_data": {
                "retailer": { "value": "Bass Pro", "bounding_box": [0.0, 0.0, 9.9, 1.0] }
            },
            "fragments": []
        })
        .to_string();
        let client = Arc::new(MockMultimodalClient::new(&response));
        let extractor = SchemaExtractor::new(client, registry(), "m");
        let triage = TriageResult {
            lane_id: "17".into(),
            path_id: "ammo".into(),
            confidence: 0.9,
            handwriting_density: HandwritingDensity::None,
        };
        let result = extractor.extract(&pdf_payload(), &triage).unwrap();
        let retailer = result.extracted_data["retailer"].as_ref().unwrap();
        assert_eq!(retailer.value, json!("Bass Pro"));
        assert!(retailer.bounding_box.is_none());
    }

    #[test]
    fn extra_model_keys_are_preserved() {
        // Output contract is superset-or-equal of the schema key set.
        let response = json!({
            "extracted_data": {
                "retailer": { "value": "Cabela's" },
                "unsolicited_note": { "value": "receipt stapled" }
            }
        })
        .to_string();
        let client = Arc::new(MockMultimodalClient::new(&response));
        let extractor = SchemaExtractor::new(client, registry(), "m");
        let triage = TriageResult {
            lane_id: "17".into(),
            path_id: "ammo".into(),
            confidence: 0.9,
            handwriting_density: HandwritingDensity::None,
        };
        let result = extractor.extract(&pdf_payload(), &triage).unwrap();
        assert!(result.extracted_data.contains_key("unsolicited_note"));
        assert!(result.extracted_data.contains_key("caliber"));
        assert!(result.extracted_data["caliber"].is_none());
    }
}
