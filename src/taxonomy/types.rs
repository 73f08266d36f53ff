//! Data model for the forensic taxonomy: lanes, paths, and the declarative
//! extraction schemas they carry.
//!
//! Schemas are shape-and-hints only. They hold no extraction logic; the
//! prompt builder renders them into a literal structural specification for
//! the extraction model.

use serde_json::{json, Map, Value};

/// Primitive kind of a schema field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    String,
    Number,
    Currency,
    Percentage,
    Date,
    Boolean,
    Array,
    /// Nested object with its own sub-fields.
    Object(Vec<FieldSpec>),
}

impl FieldKind {
    /// Wire name used in the rendered schema specification.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Currency => "currency",
            Self::Percentage => "percentage",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object(_) => "object",
        }
    }
}

/// One field of an extraction schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Why this field matters forensically (fed to the extraction prompt).
    pub hint: Option<&'static str>,
}

impl FieldSpec {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            hint: None,
        }
    }

    pub fn with_hint(name: &'static str, kind: FieldKind, hint: &'static str) -> Self {
        Self {
            name,
            kind,
            hint: Some(hint),
        }
    }

    /// Render this field as a `{"type": ..}` descriptor.
    fn to_spec_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), json!(self.kind.type_name()));
        if let FieldKind::Object(items) = &self.kind {
            let mut sub = Map::new();
            for field in items {
                sub.insert(field.name.to_string(), field.to_spec_value());
            }
            obj.insert("items".into(), Value::Object(sub));
        }
        if let Some(hint) = self.hint {
            obj.insert("description".into(), json!(hint));
        }
        Value::Object(obj)
    }
}

/// Declarative extraction schema: the shape the extractor must fill.
#[derive(Debug, Clone)]
pub struct ExtractionSchema {
    pub fields: Vec<FieldSpec>,
}

impl ExtractionSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Top-level field names, in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Render the schema as the literal structural specification handed to
    /// the extraction model.
    pub fn to_spec_value(&self) -> Value {
        let mut elements = Map::new();
        for field in &self.fields {
            elements.insert(field.name.to_string(), field.to_spec_value());
        }
        json!({ "target_data_elements": elements })
    }
}

/// A leaf document type within a lane, carrying one extraction schema.
#[derive(Debug, Clone)]
pub struct LanePath {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub schema: ExtractionSchema,
}

/// Top-level taxonomy category grouping related document paths.
#[derive(Debug, Clone)]
pub struct Lane {
    pub id: &'static str,
    pub name: &'static str,
    pub group: &'static str,
    pub paths: Vec<LanePath>,
}
