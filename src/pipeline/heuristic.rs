//! Heuristic OCR-plus-regex analysis, the simpler of the two strategies.
//!
//! Delegates text recognition to an external OCR collaborator, then scans
//! the recognized text for financial patterns. No model calls, no schema.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::PipelineError;

/// Standard currency formats ($1,000.00).
static CURRENCY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s?\d{1,3}(?:,\d{3})*(?:\.\d{2})?").unwrap());

/// Standard date formats (MM/DD/YYYY or YYYY-MM-DD).
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,2}/\d{1,2}/\d{2,4}|\d{4}-\d{2}-\d{2})\b").unwrap()
});

/// Recognized text returned by the OCR collaborator.
#[derive(Debug, Clone)]
pub struct OcrText {
    pub text: String,
    pub confidence: f64,
}

/// External OCR capability: document URI in, full recognized text out.
pub trait OcrService: Send + Sync {
    fn recognize(&self, uri: &str) -> Result<OcrText, PipelineError>;
}

/// Financial entities found by pattern matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedEntities {
    pub currency_references: Vec<String>,
    pub dates: Vec<String>,
}

/// Result of the heuristic analysis path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForensicAnalysis {
    pub raw_text: Option<String>,
    pub detected_entities: DetectedEntities,
    pub ocr_confidence: f64,
}

impl ForensicAnalysis {
    /// Analysis of a document that yielded no recognizable text.
    pub fn empty() -> Self {
        Self {
            raw_text: None,
            detected_entities: DetectedEntities::default(),
            ocr_confidence: 0.0,
        }
    }

    /// Scan recognized text for financial patterns.
    pub fn from_text(text: &str, confidence: f64) -> Self {
        if text.is_empty() {
            return Self::empty();
        }
        Self {
            raw_text: Some(text.to_string()),
            detected_entities: scan_entities(text),
            ocr_confidence: confidence,
        }
    }
}

/// Pattern-match currency and date references in recognized text.
pub fn scan_entities(text: &str) -> DetectedEntities {
    DetectedEntities {
        currency_references: CURRENCY_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
        dates: DATE_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
    }
}

/// Mock OCR service for testing — returns configured text, or fails.
pub struct MockOcrService {
    result: Result<OcrText, String>,
}

impl MockOcrService {
    pub fn new(text: &str, confidence: f64) -> Self {
        Self {
            result: Ok(OcrText {
                text: text.to_string(),
                confidence,
            }),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

impl OcrService for MockOcrService {
    fn recognize(&self, _uri: &str) -> Result<OcrText, PipelineError> {
        match &self.result {
            Ok(ocr) => Ok(ocr.clone()),
            Err(message) => Err(PipelineError::OcrService(message.clone())),
        }
    }
}
