//! Durable fact base keyed by case id.
//!
//! Records are JSON documents; `upsert` applies Firestore-style merge
//! semantics: objects merge key-wise, arrays and scalars replace, absent
//! patch fields leave the stored value alone. The merge happens inside a
//! transaction so concurrent writers to the same key serialize cleanly.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};

use super::record::{CasePatch, CaseRecord};
use super::StoreError;

/// The persistence seam the ingestion runner writes through.
pub trait FactBase: Send + Sync {
    /// Merge `patch` into the record at `case_id`, creating it if absent.
    fn upsert(&self, case_id: &str, patch: &CasePatch) -> Result<(), StoreError>;

    /// Read the full record, or `None` if the case was never written.
    fn get(&self, case_id: &str) -> Result<Option<CaseRecord>, StoreError>;
}

/// Recursively merge `patch` into `base`. Objects merge key-wise; any
/// other patch value (array, scalar, null) replaces the base value.
pub fn merge_patch(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_patch(existing, patch_value),
                    None => {
                        base_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

/// SQLite-backed fact base: one row per case, the record as a JSON text
/// column. Good enough for a single-node deployment and trivially
/// inspectable with the sqlite3 shell.
pub struct SqliteFactBase {
    conn: Mutex<Connection>,
}

impl SqliteFactBase {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS forensic_cases (
                case_id    TEXT PRIMARY KEY,
                record     TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl FactBase for SqliteFactBase {
    fn upsert(&self, case_id: &str, patch: &CasePatch) -> Result<(), StoreError> {
        let patch_value = patch.to_value()?;
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let tx = conn.unchecked_transaction()?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT record FROM forensic_cases WHERE case_id = ?1",
                params![case_id],
                |row| row.get(0),
            )
            .optional()?;

        let mut record = match existing {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Value::Object(Map::new()),
        };
        merge_patch(&mut record, &patch_value);

        tx.execute(
            "INSERT INTO forensic_cases (case_id, record, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(case_id) DO UPDATE SET
                 record = excluded.record,
                 updated_at = excluded.updated_at",
            params![
                case_id,
                serde_json::to_string(&record)?,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        tracing::debug!(case_id = %case_id, "fact base upsert committed");
        Ok(())
    }

    fn get(&self, case_id: &str) -> Result<Option<CaseRecord>, StoreError> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let raw: Option<String> = conn
            .query_row(
                "SELECT record FROM forensic_cases WHERE case_id = ?1",
                params![case_id],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

/// In-memory fact base with the same merge semantics, for tests.
#[derive(Default)]
pub struct MemoryFactBase {
    records: Mutex<HashMap<String, Value>>,
}

impl MemoryFactBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw stored JSON, for asserting on merge results directly.
    pub fn raw(&self, case_id: &str) -> Option<Value> {
        self.records
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(case_id)
            .cloned()
    }
}

impl FactBase for MemoryFactBase {
    fn upsert(&self, case_id: &str, patch: &CasePatch) -> Result<(), StoreError> {
        let patch_value = patch.to_value()?;
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        let record = records
            .entry(case_id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        merge_patch(record, &patch_value);
        Ok(())
    }

    fn get(&self, case_id: &str) -> Result<Option<CaseRecord>, StoreError> {
        let records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        match records.get(case_id) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}
