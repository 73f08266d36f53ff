//! Indexed, validated view over the lane catalog.
//!
//! The registry is built once at process start and never mutated. Lookup of
//! an unknown (lane, path) pair is an ordinary `None`, never a panic: the
//! triage model is an untrusted producer and callers must treat absence as a
//! distinct outcome.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::catalog::forensic_lanes;
use super::types::{Lane, LanePath};
use super::TaxonomyError;

static FORENSIC_REGISTRY: LazyLock<TaxonomyRegistry> = LazyLock::new(|| {
    TaxonomyRegistry::new(forensic_lanes()).expect("built-in forensic catalog is invalid")
});

/// Static catalog of lanes → paths → extraction schemas.
pub struct TaxonomyRegistry {
    lanes: Vec<Lane>,
    index: HashMap<(String, String), (usize, usize)>,
}

impl TaxonomyRegistry {
    /// Build a registry from a lane catalog, validating it once:
    /// unique lane ids, unique path ids per lane, non-empty schemas,
    /// unique field names per schema.
    pub fn new(lanes: Vec<Lane>) -> Result<Self, TaxonomyError> {
        if lanes.is_empty() {
            return Err(TaxonomyError::EmptyCatalog);
        }

        let mut seen_lanes = HashSet::new();
        for lane in &lanes {
            if !seen_lanes.insert(lane.id) {
                return Err(TaxonomyError::DuplicateLane(lane.id.to_string()));
            }
        }

        let mut index = HashMap::new();
        for (lane_idx, lane) in lanes.iter().enumerate() {
            if lane.paths.is_empty() {
                return Err(TaxonomyError::EmptyLane {
                    lane: lane.id.to_string(),
                });
            }
            for (path_idx, path) in lane.paths.iter().enumerate() {
                validate_schema(lane, path)?;
                let key = (lane.id.to_string(), path.id.to_string());
                if index.insert(key, (lane_idx, path_idx)).is_some() {
                    return Err(TaxonomyError::DuplicatePath {
                        lane: lane.id.to_string(),
                        path: path.id.to_string(),
                    });
                }
            }
        }

        Ok(Self { lanes, index })
    }

    /// The registry over the built-in forensic catalog.
    pub fn forensic() -> &'static TaxonomyRegistry {
        &FORENSIC_REGISTRY
    }

    /// Resolve a (lane, path) pair to its taxonomy leaf.
    pub fn find_path(&self, lane_id: &str, path_id: &str) -> Option<&LanePath> {
        let &(lane_idx, path_idx) = self
            .index
            .get(&(lane_id.to_string(), path_id.to_string()))?;
        Some(&self.lanes[lane_idx].paths[path_idx])
    }

    /// Every (lane, path) pair in catalog order, for prompt-menu construction.
    pub fn enumerate(&self) -> impl Iterator<Item = (&Lane, &LanePath)> {
        self.lanes
            .iter()
            .flat_map(|lane| lane.paths.iter().map(move |path| (lane, path)))
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Total number of taxonomy leaves.
    pub fn leaf_count(&self) -> usize {
        self.index.len()
    }
}

fn validate_schema(lane: &Lane, path: &LanePath) -> Result<(), TaxonomyError> {
    if path.schema.fields.is_empty() {
        return Err(TaxonomyError::EmptySchema {
            lane: lane.id.to_string(),
            path: path.id.to_string(),
        });
    }
    let mut seen = HashSet::new();
    for field in &path.schema.fields {
        if !seen.insert(field.name) {
            return Err(TaxonomyError::DuplicateField {
                lane: lane.id.to_string(),
                path: path.id.to_string(),
                field: field.name.to_string(),
            });
        }
    }
    Ok(())
}
