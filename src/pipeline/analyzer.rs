//! The two document-analysis strategies behind one seam.
//!
//! Which strategy runs for a given deployment is policy decided outside
//! this module; the ingestion runner only sees `DocumentAnalyzer`.

use std::sync::Arc;

use super::extract::SchemaExtractor;
use super::heuristic::{ForensicAnalysis, OcrService};
use super::triage::TriageClassifier;
use super::types::{DocumentPayload, ExtractionResult, TriageResult};
use super::PipelineError;

/// What an analysis produced: schema-driven results carry the triage that
/// selected the schema; heuristic results carry the pattern scan.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Schema {
        triage: TriageResult,
        extraction: ExtractionResult,
    },
    Heuristic {
        analysis: ForensicAnalysis,
    },
}

/// One strategy for turning a document payload into analysis results.
pub trait DocumentAnalyzer: Send + Sync {
    fn analyze(
        &self,
        doc: &DocumentPayload,
        source_uri: &str,
    ) -> Result<AnalysisOutcome, PipelineError>;
}

/// Two-stage strategy: triage selects the taxonomy leaf, extraction fills
/// its schema. Triage is a hard dependency of extraction — there is no
/// speculative extraction across candidate leaves.
pub struct SchemaDrivenAnalyzer {
    triage: TriageClassifier,
    extractor: SchemaExtractor,
}

impl SchemaDrivenAnalyzer {
    pub fn new(triage: TriageClassifier, extractor: SchemaExtractor) -> Self {
        Self { triage, extractor }
    }
}

impl DocumentAnalyzer for SchemaDrivenAnalyzer {
    fn analyze(
        &self,
        doc: &DocumentPayload,
        _source_uri: &str,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let triage = self.triage.classify(doc)?;
        let extraction = self.extractor.extract(doc, &triage)?;
        Ok(AnalysisOutcome::Schema { triage, extraction })
    }
}

/// OCR-plus-regex strategy: no model calls, no schema.
pub struct HeuristicAnalyzer {
    ocr: Arc<dyn OcrService>,
}

impl HeuristicAnalyzer {
    pub fn new(ocr: Arc<dyn OcrService>) -> Self {
        Self { ocr }
    }
}

impl DocumentAnalyzer for HeuristicAnalyzer {
    fn analyze(
        &self,
        _doc: &DocumentPayload,
        source_uri: &str,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let ocr = self.ocr.recognize(source_uri)?;
        let analysis = ForensicAnalysis::from_text(&ocr.text, ocr.confidence);
        tracing::info!(
            currency_refs = analysis.detected_entities.currency_references.len(),
            dates = analysis.detected_entities.dates.len(),
            "heuristic analysis complete"
        );
        Ok(AnalysisOutcome::Heuristic { analysis })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockMultimodalClient;
    use crate::pipeline::heuristic::MockOcrService;
    use crate::taxonomy::{forensic_lanes, TaxonomyRegistry};
    use serde_json::json;

    // Verify the trait is object-safe (strategies are selected at runtime).
    #[test]
    fn analyzer_trait_is_object_safe() {
        fn _assert(_: &dyn DocumentAnalyzer) {}
    }

    #[test]
    fn schema_driven_analyzer_chains_both_stages() {
        let registry = Arc::new(TaxonomyRegistry::new(forensic_lanes()).unwrap());
        let triage_response = json!({
            "lane_id": "13", "path_id": "gifts",
            "confidence": 0.85, "handwriting_density": "NONE"
        })
        .to_string();
        let extraction_response = json!({
            "extracted_data": {
                "recipient": { "value": "Nephew", "bounding_box": [0.1, 0.1, 0.2, 0.4] }
            },
            "fragments": []
        })
        .to_string();

        // Same client serves both stages in order.
        let client = Arc::new(MockMultimodalClient::scripted(vec![
            crate::model::MockReply::Text(triage_response),
            crate::model::MockReply::Text(extraction_response),
        ]));
        let analyzer = SchemaDrivenAnalyzer::new(
            TriageClassifier::new(client.clone(), registry.clone(), "fast"),
            SchemaExtractor::new(client.clone(), registry, "thorough"),
        );

        let doc = DocumentPayload::new(b"img".to_vec(), "image/png");
        let outcome = analyzer.analyze(&doc, "b/gift.png").unwrap();
        match outcome {
            AnalysisOutcome::Schema { triage, extraction } => {
                assert_eq!(triage.path_id, "gifts");
                // Null-backfilled to the gifts schema.
                assert!(extraction.extracted_data.contains_key("value"));
                assert!(extraction.extracted_data["value"].is_none());
            }
            AnalysisOutcome::Heuristic { .. } => panic!("expected schema outcome"),
        }
        assert_eq!(client.call_count(), 2);
    }

    #[test]
    fn schema_driven_analyzer_stops_after_triage_failure() {
        let registry = Arc::new(TaxonomyRegistry::new(forensic_lanes()).unwrap());
        let client = Arc::new(MockMultimodalClient::new("not json at all"));
        let analyzer = SchemaDrivenAnalyzer::new(
            TriageClassifier::new(client.clone(), registry.clone(), "fast"),
            SchemaExtractor::new(client.clone(), registry, "thorough"),
        );
        let doc = DocumentPayload::new(b"img".to_vec(), "image/png");
        let err = analyzer.analyze(&doc, "b/x.png").unwrap_err();
        assert!(matches!(err, PipelineError::ClassificationParse(_)));
        // Extraction never ran.
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn heuristic_analyzer_scans_recognized_text() {
        let ocr = Arc::new(MockOcrService::new("Invoice total $750.00 on 01/02/2024", 0.93));
        let analyzer = HeuristicAnalyzer::new(ocr);
        let doc = DocumentPayload::new(b"img".to_vec(), "image/png");
        let outcome = analyzer.analyze(&doc, "b/invoice.png").unwrap();
        match outcome {
            AnalysisOutcome::Heuristic { analysis } => {
                assert_eq!(
                    analysis.detected_entities.currency_references,
                    vec!["$750.00"]
                );
                assert_eq!(analysis.detected_entities.dates, vec!["01/02/2024"]);
            }
            AnalysisOutcome::Schema { .. } => panic!("expected heuristic outcome"),
        }
    }

    #[test]
    fn heuristic_analyzer_propagates_ocr_failure() {
        let analyzer = HeuristicAnalyzer::new(Arc::new(MockOcrService::failing("down")));
        let doc = DocumentPayload::new(b"img".to_vec(), "image/png");
        let err = analyzer.analyze(&doc, "b/x.png").unwrap_err();
        assert!(matches!(err, PipelineError::OcrService(_)));
    }
}
