//! The persisted document: a JSON rendering of the whole store.
//!
//! ```text
//! {
//!   "version": "0.3.0",
//!   "tags": ["x"],            # enforced tag list
//!   "enforce_tags": false,
//!   "backups_enabled": false,
//!   "next_id": 3,
//!   "records": [{"id": 0, "data": "a", "tags": ["x"], "attrs": {"k": "v"}}]
//! }
//! ```

use super::{StoreSettings, StoreState};
use crate::error::{DbError, Result};
use crate::model::{Attributes, Record, RecordId, TagSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    version: String,
    #[serde(default)]
    tags: TagSet,
    #[serde(default)]
    enforce_tags: bool,
    #[serde(default)]
    backups_enabled: bool,
    #[serde(default)]
    next_id: Option<RecordId>,
    #[serde(default)]
    records: Vec<StoredRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    id: RecordId,
    data: String,
    #[serde(default)]
    tags: TagSet,
    #[serde(default)]
    attrs: BTreeMap<String, Value>,
}

/// Serializes the state. Records come out in ascending id order.
pub fn render(state: &StoreState) -> Result<String> {
    let doc = Document {
        version: FORMAT_VERSION.to_string(),
        tags: state.settings.enforced_tags.clone(),
        enforce_tags: state.settings.enforce_tags,
        backups_enabled: state.settings.backups_enabled,
        next_id: Some(state.next_id),
        records: state
            .records
            .values()
            .map(|r| StoredRecord {
                id: r.id,
                data: r.data.clone(),
                tags: r.tags.clone(),
                attrs: r
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parses and validates a persisted document. Any structural problem is a
/// [`DbError::PersistedState`]; nothing is partially recovered.
pub fn parse(text: &str) -> Result<StoreState> {
    let doc: Document = serde_json::from_str(text)
        .map_err(|e| DbError::PersistedState(format!("unreadable document: {}", e)))?;

    if is_newer(&doc.version, FORMAT_VERSION) {
        warn!(
            stored = %doc.version,
            current = FORMAT_VERSION,
            "database was last written by a newer jsondb, consider upgrading"
        );
    }

    if doc.tags.has_duplicates() {
        return Err(DbError::PersistedState(
            "enforced tag list contains duplicates".into(),
        ));
    }

    let mut records = BTreeMap::new();
    for stored in doc.records {
        if stored.tags.has_duplicates() {
            return Err(DbError::PersistedState(format!(
                "record {} has duplicate tags",
                stored.id
            )));
        }
        let attrs = convert_attrs(stored.id, stored.attrs)?;
        let record = Record::new(stored.id, stored.data, stored.tags, attrs);
        if records.insert(record.id, record).is_some() {
            return Err(DbError::PersistedState(format!(
                "duplicate record id {}",
                stored.id
            )));
        }
    }

    let first_free = match records.keys().next_back() {
        Some(id) => id
            .checked_add(1)
            .ok_or_else(|| DbError::PersistedState("record id space exhausted".into()))?,
        None => 0,
    };
    let next_id = match doc.next_id {
        Some(n) if n < first_free => {
            return Err(DbError::PersistedState(format!(
                "next_id {} would reuse existing id {}",
                n,
                first_free - 1
            )));
        }
        Some(n) => n,
        None => first_free,
    };

    Ok(StoreState {
        settings: StoreSettings {
            enforced_tags: doc.tags,
            enforce_tags: doc.enforce_tags,
            backups_enabled: doc.backups_enabled,
        },
        records,
        next_id,
    })
}

/// Scalar values written by older versions are converted to their text form;
/// anything nested is rejected.
fn convert_attrs(id: RecordId, raw: BTreeMap<String, Value>) -> Result<Attributes> {
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(DbError::PersistedState(format!(
                        "record {} attribute '{}' is not a scalar: {}",
                        id, key, other
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}

fn is_newer(stored: &str, current: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    parse(stored) > parse(current)
}
