//! The fact-base record model and its partial-update companion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::analyzer::AnalysisOutcome;
use crate::pipeline::heuristic::ForensicAnalysis;
use crate::pipeline::types::{DocumentEvent, ExtractionResult, TriageResult};

/// Processing status of one case. Transitions are one-way within a run:
/// `INGESTED` is written first, then exactly one of `PROCESSED` or `ERROR`.
/// A redelivered event starts a fresh run over the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaseStatus {
    Ingested,
    Processed,
    Error,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingested => "INGESTED",
            Self::Processed => "PROCESSED",
            Self::Error => "ERROR",
        }
    }

    /// A terminal status is never downgraded back to `INGESTED`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Error)
    }
}

/// Where the document came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSource {
    pub container: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The full logical shape of one fact-base document. Every field is
/// optional on read: records are built up by successive merges and a
/// half-written record (ingested but never analyzed) is a legal state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CaseSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingested_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CaseMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triage: Option<TriageResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ForensicAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log: Option<String>,
}

/// A partial record. Fields left `None` are untouched by the merge; fields
/// set here replace (scalars, arrays) or deep-merge (objects) into the
/// stored record. Fields listed in `cleared` render as explicit JSON nulls
/// so the merge erases them: a terminal write must not leave the opposing
/// run's outcome fields behind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CasePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CaseSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingested_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CaseMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triage: Option<TriageResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ForensicAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<String>,
    #[serde(skip)]
    cleared: Vec<&'static str>,
}

impl CasePatch {
    /// The first write of a run: provenance, timestamp, and whatever
    /// metadata the event itself declared.
    pub fn ingested(event: &DocumentEvent, at: DateTime<Utc>) -> Self {
        Self {
            source: Some(CaseSource {
                container: event.bucket.clone(),
                path: event.name.clone(),
            }),
            ingested_at: Some(at),
            status: Some(CaseStatus::Ingested),
            metadata: Some(CaseMetadata {
                content_type: event.content_type.clone(),
                size: None,
            }),
            ..Self::default()
        }
    }

    /// Drop the status field so a merge cannot move a record that is
    /// already terminal back to `INGESTED`.
    pub fn without_status(mut self) -> Self {
        self.status = None;
        self
    }

    /// The terminal success write, carrying whichever result shape the
    /// selected strategy produced. Clears any `error_log` and the other
    /// strategy's result fields left by a prior run on the same case.
    pub fn processed(outcome: AnalysisOutcome) -> Self {
        let mut patch = Self {
            status: Some(CaseStatus::Processed),
            ..Self::default()
        };
        match outcome {
            AnalysisOutcome::Schema { triage, extraction } => {
                patch.triage = Some(triage);
                patch.extraction = Some(extraction);
                patch.cleared = vec!["error_log", "analysis"];
            }
            AnalysisOutcome::Heuristic { analysis } => {
                patch.analysis = Some(analysis);
                patch.cleared = vec!["error_log", "triage", "extraction"];
            }
        }
        patch
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.metadata.get_or_insert_with(CaseMetadata::default).size = Some(size);
        self
    }

    /// The terminal failure write. The message must never be empty: a
    /// blank error log is worse than no record of the failure at all.
    /// Clears result fields left by a prior successful run so a consumer
    /// never sees extraction output next to `status=ERROR`.
    pub fn failure(message: &str) -> Self {
        let message = if message.is_empty() {
            "unspecified pipeline failure"
        } else {
            message
        };
        Self {
            status: Some(CaseStatus::Error),
            error_log: Some(message.to_string()),
            cleared: vec!["triage", "extraction", "analysis"],
            ..Self::default()
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            for key in &self.cleared {
                map.insert((*key).to_string(), Value::Null);
            }
        }
        Ok(value)
    }
}

/// Derives the fact-base key from the source object path. Path separators
/// collapse to underscores so the id is flat and filesystem-safe; the
/// mapping is deterministic, so redelivery of the same path always
/// addresses the same record.
pub fn case_id_from_path(path: &str) -> String {
    path.replace(['/', '\\'], "_")
}
