//! Prompt construction for both stages.
//!
//! The triage menu is derived from the registry enumeration and the
//! extraction instruction renders the resolved schema literally — neither
//! is ever hardcoded, so catalog changes flow into the prompts for free.

use std::fmt::Write as _;

use crate::taxonomy::{LanePath, TaxonomyRegistry};

pub const TRIAGE_SYSTEM_PROMPT: &str = "\
You are a Forensic Document Classifier. You are given one scanned legal or \
financial document. Classify it into EXACTLY one of the Granular Paths you \
are offered. Never invent a lane or path id that is not on the menu. \
Respond with a single JSON object and nothing else.";

pub const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are a Forensic Analyst. You extract data from one scanned document \
EXACTLY according to the schema you are given. Extract only what is \
explicitly visible in the document. Never infer values. Respond with a \
single JSON object and nothing else.";

/// Build the triage instruction: a menu of every taxonomy leaf plus the
/// required response shape.
pub fn build_triage_prompt(registry: &TaxonomyRegistry) -> String {
    let mut menu = String::new();
    for (lane, path) in registry.enumerate() {
        let _ = writeln!(
            menu,
            "- LANE {} / PATH '{}': {} ({})",
            lane.id, path.id, path.name, path.description
        );
    }

    format!(
        r#"Classify this document into EXACTLY one of the following Granular Paths:

{menu}
Rate Handwriting Density (HIGH/LOW/NONE).

Return JSON:
{{
  "lane_id": "09",
  "path_id": "timber_contracts",
  "confidence": 0.95,
  "handwriting_density": "LOW"
}}"#
    )
}

/// Build the extraction instruction for a resolved taxonomy leaf.
pub fn build_extraction_prompt(path: &LanePath) -> String {
    let schema_definition = serde_json::to_string_pretty(&path.schema.to_spec_value())
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"Document Type: {name}

STRICT REQUIREMENT: Extract data EXACTLY according to this Schema:
{schema_definition}

- For every field found, return the value AND the bounding_box [ymin, xmin, ymax, xmax].
- Bounding box coordinates are normalized to the page image: each value between 0.0 and 1.0, origin top-left.
- If a field is missing, set it to null.
- Capture ANY other marginalia or handwritten notes in a separate 'fragments' array; every fragment needs its own bounding box.

Output JSON:
{{
  "extracted_data": {{ "<field>": {{ "value": ..., "bounding_box": [ymin, xmin, ymax, xmax] }} or null }},
  "fragments": [ {{ "text": "...", "bbox": [ymin, xmin, ymax, xmax] }} ]
}}"#,
        name = path.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_menu_lists_every_leaf() {
        let registry = TaxonomyRegistry::forensic();
        let prompt = build_triage_prompt(registry);
        for (lane, path) in registry.enumerate() {
            let line = format!("- LANE {} / PATH '{}'", lane.id, path.id);
            assert!(prompt.contains(&line), "menu missing {line}");
        }
    }

    #[test]
    fn triage_prompt_demands_density_rating() {
        let prompt = build_triage_prompt(TaxonomyRegistry::forensic());
        assert!(prompt.contains("Handwriting Density (HIGH/LOW/NONE)"));
        assert!(prompt.contains("\"confidence\""));
    }

    #[test]
    fn extraction_prompt_embeds_schema_literally() {
        let registry = TaxonomyRegistry::forensic();
        let deeds = registry.find_path("01", "deeds").unwrap();
        let prompt = build_extraction_prompt(deeds);
        assert!(prompt.contains("Document Type: Deeds"));
        assert!(prompt.contains("target_data_elements"));
        assert!(prompt.contains("consideration_amount"));
        assert!(prompt.contains("Was it sold for $1?"));
    }

    #[test]
    fn extraction_prompt_fixes_coordinate_convention() {
        let registry = TaxonomyRegistry::forensic();
        let ammo = registry.find_path("17", "ammo").unwrap();
        let prompt = build_extraction_prompt(ammo);
        assert!(prompt.contains("[ymin, xmin, ymax, xmax]"));
        assert!(prompt.contains("between 0.0 and 1.0"));
        assert!(prompt.contains("'fragments' array"));
    }

    #[test]
    fn system_prompts_forbid_invention() {
        assert!(TRIAGE_SYSTEM_PROMPT.contains("EXACTLY one"));
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("Never infer"));
    }
}
