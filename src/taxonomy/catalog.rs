//! The static forensic lane catalog.
//!
//! Pure data. Adding a lane or path here is the only change needed to teach
//! the pipeline a new document type; triage menus and extraction prompts are
//! derived from this catalog at runtime, never hardcoded.

use super::types::{ExtractionSchema, FieldKind, FieldSpec, Lane, LanePath};

fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec::new(name, kind)
}

fn hinted(name: &'static str, kind: FieldKind, hint: &'static str) -> FieldSpec {
    FieldSpec::with_hint(name, kind, hint)
}

/// Every lane, path, and extraction schema known to the pipeline.
pub fn forensic_lanes() -> Vec<Lane> {
    vec![
        // ── Group A: Core Assets ────────────────────────────────────────
        Lane {
            id: "01",
            name: "Property & Real Estate",
            group: "Core Assets",
            paths: vec![
                LanePath {
                    id: "deeds",
                    name: "Deeds",
                    description: "Ownership deeds for 320-acre properties",
                    schema: ExtractionSchema::new(vec![
                        field("document_type", FieldKind::String),
                        field(
                            "recording_info",
                            FieldKind::Object(vec![
                                field("liber", FieldKind::String),
                                field("record_date", FieldKind::Date),
                            ]),
                        ),
                        field(
                            "parties",
                            FieldKind::Object(vec![
                                field("grantor", FieldKind::String),
                                field("grantee", FieldKind::String),
                            ]),
                        ),
                        field(
                            "property_identifiers",
                            FieldKind::Object(vec![
                                field("parcel_id", FieldKind::String),
                                field("legal_desc", FieldKind::String),
                            ]),
                        ),
                        hinted(
                            "consideration_amount",
                            FieldKind::Currency,
                            "Was it sold for $1?",
                        ),
                        hinted("transfer_tax", FieldKind::Currency, "Implies true value"),
                    ]),
                },
                LanePath {
                    id: "tax_assessments",
                    name: "Property Tax",
                    description: "Tax bills for woodlands",
                    schema: ExtractionSchema::new(vec![
                        field("tax_year", FieldKind::String),
                        field("taxable_value", FieldKind::Currency),
                        field("state_equalized_value", FieldKind::Currency),
                        field("millage_rate", FieldKind::Number),
                        field("total_tax_due", FieldKind::Currency),
                    ]),
                },
            ],
        },
        // ── Group C: Land & Conservancy ─────────────────────────────────
        Lane {
            id: "09",
            name: "Timber & Resources",
            group: "Land & Conservancy",
            paths: vec![
                LanePath {
                    id: "timber_contracts",
                    name: "Timber Harvesting Contracts",
                    description: "Stumpage, thinning, and logging agreements",
                    schema: ExtractionSchema::new(vec![
                        field("logger_name", FieldKind::String),
                        field("contract_date", FieldKind::Date),
                        field("species_harvested", FieldKind::String),
                        field("volume_mbf", FieldKind::Number),
                        field("stumpage_rate", FieldKind::Currency),
                        field("total_payment", FieldKind::Currency),
                        hinted(
                            "payment_dest_account",
                            FieldKind::String,
                            "Did this go to Joint or Separate?",
                        ),
                    ]),
                },
                LanePath {
                    id: "mineral_rights",
                    name: "Mineral/Oil/Gas Leases",
                    description: "Subsurface rights revenue",
                    schema: ExtractionSchema::new(vec![
                        field("lessee", FieldKind::String),
                        field("lease_term", FieldKind::String),
                        field("royalty_percent", FieldKind::Percentage),
                        field("signing_bonus", FieldKind::Currency),
                        field("monthly_royalties", FieldKind::Currency),
                    ]),
                },
            ],
        },
        Lane {
            id: "10",
            name: "Government Programs",
            group: "Land & Conservancy",
            paths: vec![
                LanePath {
                    id: "usda_contracts",
                    name: "USDA/NRCS Contracts",
                    description: "CRP, EQIP, WHIP programs",
                    schema: ExtractionSchema::new(vec![
                        field("program_name", FieldKind::String),
                        field("contract_number", FieldKind::String),
                        field("practice_code", FieldKind::String),
                        field("cost_share_amount", FieldKind::Currency),
                        field("obligated_completion_date", FieldKind::Date),
                    ]),
                },
                LanePath {
                    id: "dnr_permits",
                    name: "DNR Management Plans",
                    description: "Forest stewardship and wildlife mgmt",
                    schema: ExtractionSchema::new(vec![
                        field("plan_type", FieldKind::String),
                        field("enrolled_acres", FieldKind::Number),
                        field("tax_abatement", FieldKind::Boolean),
                        field("mandatory_actions", FieldKind::Array),
                    ]),
                },
            ],
        },
        Lane {
            id: "11",
            name: "Land Improvements (Hobby Spend)",
            group: "Land & Conservancy",
            paths: vec![
                LanePath {
                    id: "heavy_equipment",
                    name: "Heavy Equipment",
                    description: "Tractors, Skidders, Dozers",
                    schema: ExtractionSchema::new(vec![
                        field("equipment_type", FieldKind::String),
                        field("purchase_price", FieldKind::Currency),
                        field("funding_source", FieldKind::String),
                        field("business_justification", FieldKind::String),
                        field("usage_evidence", FieldKind::String),
                    ]),
                },
                LanePath {
                    id: "conservation_inputs",
                    name: "Conservation Inputs",
                    description: "Seed, Fertilizer, Lime for food plots",
                    schema: ExtractionSchema::new(vec![
                        field("product_type", FieldKind::String),
                        field("quantity", FieldKind::Number),
                        field("cost", FieldKind::Currency),
                        field("location_applied", FieldKind::String),
                    ]),
                },
            ],
        },
        // ── Group D: Lifestyle Leakage ──────────────────────────────────
        Lane {
            id: "13",
            name: "Subsidy & Third-Party",
            group: "Lifestyle",
            paths: vec![LanePath {
                id: "gifts",
                name: "Non-Obligatory Gifts",
                description: "Discretionary giving",
                schema: ExtractionSchema::new(vec![
                    field("recipient", FieldKind::String),
                    field("date", FieldKind::Date),
                    field("value", FieldKind::Currency),
                ]),
            }],
        },
        Lane {
            id: "17",
            name: "Sporting & Recreation",
            group: "Lifestyle",
            paths: vec![LanePath {
                id: "ammo",
                name: "Ammunition & Gear",
                description: "Consumable supplies",
                schema: ExtractionSchema::new(vec![
                    field("retailer", FieldKind::String),
                    field("caliber", FieldKind::String),
                    field("price", FieldKind::Currency),
                ]),
            }],
        },
    ]
}
