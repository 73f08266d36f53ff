//! Wire and domain types shared across the two pipeline stages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::PipelineError;

/// Media types the pipeline accepts: images and single-page-renderable
/// documents the multimodal models can consume inline.
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/tiff",
    "image/webp",
    "application/pdf",
];

/// Handwriting density rated by the triage model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HandwritingDensity {
    High,
    Low,
    None,
}

impl HandwritingDensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Low => "LOW",
            Self::None => "NONE",
        }
    }
}

/// Output of the triage stage: exactly one taxonomy leaf plus signal about
/// how much of the document is handwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub lane_id: String,
    pub path_id: String,
    pub confidence: f64,
    pub handwriting_density: HandwritingDensity,
}

/// Spatial provenance of an extracted value.
///
/// Normalized image-relative coordinates `[ymin, xmin, ymax, xmax]`, each in
/// [0.0, 1.0], origin at the top-left of the page image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([ymin, xmin, ymax, xmax]: [f64; 4]) -> Self {
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.ymin, b.xmin, b.ymax, b.xmax]
    }
}

impl BoundingBox {
    /// All coordinates finite, within [0, 1], and max edges not before min.
    pub fn is_valid(&self) -> bool {
        let coords = [self.ymin, self.xmin, self.ymax, self.xmax];
        coords.iter().all(|c| c.is_finite() && (0.0..=1.0).contains(c))
            && self.ymax >= self.ymin
            && self.xmax >= self.xmin
    }

    /// A region with zero area locates nothing.
    pub fn is_empty(&self) -> bool {
        self.ymax <= self.ymin || self.xmax <= self.xmin
    }
}

/// One extracted schema field: the value plus where on the page it was read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub value: Value,
    pub bounding_box: Option<BoundingBox>,
}

impl FieldValue {
    /// Lenient conversion from whatever shape the model produced: either the
    /// canonical `{"value": .., "bounding_box": [..]}` pair or a bare value.
    pub fn from_model_value(raw: Value) -> Self {
        if let Value::Object(map) = &raw {
            if map.contains_key("value") {
                let bounding_box = map
                    .get("bounding_box")
                    .or_else(|| map.get("bbox"))
                    .and_then(|v| serde_json::from_value(v.clone()).ok());
                return Self {
                    value: map.get("value").cloned().unwrap_or(Value::Null),
                    bounding_box,
                };
            }
        }
        Self {
            value: raw,
            bounding_box: None,
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_model_value(raw))
    }
}

/// Content found outside the declared schema: marginalia, handwritten notes.
/// Every fragment must carry a non-empty bounding region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    #[serde(alias = "bounding_box")]
    pub bbox: BoundingBox,
}

/// Output of the extraction stage. `extracted_data` carries every field
/// name of the resolved schema (value may be null); fragments are ordered
/// as the model emitted them but carry no schema meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub extracted_data: BTreeMap<String, Option<FieldValue>>,
    #[serde(default)]
    pub fragments: Vec<Fragment>,
}

/// One document as fetched from the object store.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl DocumentPayload {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }

    /// Non-empty payload with an accepted media type.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.bytes.is_empty() {
            return Err(PipelineError::EmptyPayload);
        }
        if !ACCEPTED_MEDIA_TYPES.contains(&self.media_type.as_str()) {
            return Err(PipelineError::UnsupportedMediaType(self.media_type.clone()));
        }
        Ok(())
    }
}

/// Inbound trigger: a newly stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEvent {
    pub bucket: String,
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
}

impl DocumentEvent {
    /// Directory-like entries are ignored by the pipeline.
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/') || self.name.ends_with('\\')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn handwriting_density_uses_uppercase_wire_names() {
        let parsed: HandwritingDensity = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(parsed, HandwritingDensity::High);
        assert_eq!(serde_json::to_string(&HandwritingDensity::None).unwrap(), "\"NONE\"");
        assert_eq!(HandwritingDensity::Low.as_str(), "LOW");
    }

    #[test]
    fn triage_result_parses_model_shape() {
        let triage: TriageResult = serde_json::from_value(json!({
            "lane_id": "09",
            "path_id": "timber_contracts",
            "confidence": 0.95,
            "handwriting_density": "LOW"
        }))
        .unwrap();
        assert_eq!(triage.lane_id, "09");
        assert_eq!(triage.handwriting_density, HandwritingDensity::Low);
    }

    #[test]
    fn bounding_box_round_trips_as_array() {
        let bbox = BoundingBox::from([0.1, 0.2, 0.3, 0.4]);
        let json = serde_json::to_value(bbox).unwrap();
        assert_eq!(json, json!([0.1, 0.2, 0.3, 0.4]));
        let back: BoundingBox = serde_json::from_value(json).unwrap();
        assert_eq!(back, bbox);
    }

    #[test]
    fn bounding_box_validity() {
        assert!(BoundingBox::from([0.1, 0.1, 0.2, 0.9]).is_valid());
        // Out of range
        assert!(!BoundingBox::from([0.0, 0.0, 1.5, 1.0]).is_valid());
        // Inverted edges
        assert!(!BoundingBox::from([0.5, 0.5, 0.1, 0.9]).is_valid());
        // Degenerate
        assert!(BoundingBox::from([0.5, 0.5, 0.5, 0.5]).is_empty());
        assert!(!BoundingBox::from([0.1, 0.1, 0.2, 0.2]).is_empty());
    }

    #[test]
    fn field_value_parses_canonical_pair() {
        let field: FieldValue = serde_json::from_value(json!({
            "value": "$1.00",
            "bounding_box": [0.1, 0.2, 0.15, 0.4]
        }))
        .unwrap();
        assert_eq!(field.value, json!("$1.00"));
        assert!(field.bounding_box.unwrap().is_valid());
    }

    #[test]
    fn field_value_accepts_bbox_alias() {
        let field: FieldValue = serde_json::from_value(json!({
            "value": 42,
            "bbox": [0.0, 0.0, 0.1, 0.1]
        }))
        .unwrap();
        assert!(field.bounding_box.is_some());
    }

    #[test]
    fn field_value_tolerates_bare_scalar() {
        let field: FieldValue = serde_json::from_value(json!("2024-03-01")).unwrap();
        assert_eq!(field.value, json!("2024-03-01"));
        assert!(field.bounding_box.is_none());
    }

    #[test]
    fn field_value_tolerates_garbage_bounding_box() {
        let field: FieldValue = serde_json::from_value(json!({
            "value": "x",
            "bounding_box": "top left"
        }))
        .unwrap();
        assert_eq!(field.value, json!("x"));
        assert!(field.bounding_box.is_none());
    }

    #[test]
    fn extraction_result_round_trip_preserves_nulls_and_keys() {
        let mut extracted = BTreeMap::new();
        extracted.insert(
            "consideration_amount".to_string(),
            Some(FieldValue {
                value: json!("$1.00"),
                bounding_box: Some(BoundingBox::from([0.1, 0.1, 0.2, 0.5])),
            }),
        );
        extracted.insert("transfer_tax".to_string(), None);
        let result = ExtractionResult {
            extracted_data: extracted,
            fragments: vec![],
        };

        let json = serde_json::to_string(&result).unwrap();
        let back: ExtractionResult = serde_json::from_str(&json).unwrap();

        let keys: Vec<_> = back.extracted_data.keys().cloned().collect();
        assert_eq!(keys, vec!["consideration_amount", "transfer_tax"]);
        assert!(back.extracted_data["transfer_tax"].is_none());
        assert_eq!(
            back.extracted_data["consideration_amount"]
                .as_ref()
                .unwrap()
                .value,
            json!("$1.00")
        );
    }

    #[test]
    fn payload_validation_rejects_empty_bytes() {
        let payload = DocumentPayload::new(vec![], "image/png");
        assert!(matches!(
            payload.validate(),
            Err(PipelineError::EmptyPayload)
        ));
    }

    #[test]
    fn payload_validation_rejects_unknown_media_type() {
        let payload = DocumentPayload::new(vec![1], "audio/mpeg");
        assert!(matches!(
            payload.validate(),
            Err(PipelineError::UnsupportedMediaType(t)) if t == "audio/mpeg"
        ));
    }

    #[test]
    fn payload_validation_accepts_pdf_and_images() {
        for media_type in ["application/pdf", "image/png", "image/jpeg"] {
            assert!(DocumentPayload::new(vec![1], media_type).validate().is_ok());
        }
    }

    #[test]
    fn document_event_parses_camel_case() {
        let event: DocumentEvent = serde_json::from_value(json!({
            "bucket": "b",
            "name": "intake/deed_001.pdf",
            "contentType": "application/pdf",
            "timeCreated": "2026-02-15T19:29:10Z"
        }))
        .unwrap();
        assert_eq!(event.content_type.as_deref(), Some("application/pdf"));
        assert!(!event.is_directory());
    }

    #[test]
    fn directory_entries_detected() {
        let event = DocumentEvent {
            bucket: "b".into(),
            name: "intake/".into(),
            content_type: None,
            time_created: None,
        };
        assert!(event.is_directory());
    }
}
