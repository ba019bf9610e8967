//! Per-user profile documents.
//!
//! Each user owns one JSON document. Writes are upserts that merge a patch
//! into whatever is already stored, so saving cycle data never clobbers
//! pregnancy data and vice versa. Stored values are normalized into engine
//! types here and nowhere else.

use crate::config::EngineConfig;
use crate::dates::{calendar_day, check_supported, parse_calendar_date};
use crate::{CycleProfile, Error, Result};
use chrono::{DateTime, NaiveDate};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Key-value store of user documents with upsert-with-merge writes
pub trait ProfileStore: Send + Sync {
    /// Fetch the latest document for a user, if any
    fn get(&self, user_id: &str) -> Result<Option<UserDocument>>;

    /// Merge `patch` into the user's document, creating it if needed
    fn merge(&self, user_id: &str, patch: Value) -> Result<UserDocument>;
}

// ============================================================================
// Document Model
// ============================================================================

/// A date as it may appear in storage: a date or datetime string, or a
/// `{"_seconds": .., "_nanoseconds": ..}` timestamp object.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredDate {
    Timestamp {
        #[serde(rename = "_seconds")]
        seconds: i64,
        #[serde(rename = "_nanoseconds", default)]
        nanoseconds: u32,
    },
    Text(String),
}

impl StoredDate {
    /// Normalize to a UTC calendar day
    pub fn calendar_date(&self) -> Result<NaiveDate> {
        match self {
            StoredDate::Text(text) => parse_calendar_date(text),
            StoredDate::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds)
                .map(calendar_day)
                .ok_or_else(|| Error::validation(format!("Timestamp out of range: {}", seconds)))
                .and_then(check_supported),
        }
    }
}

/// Typed view of a stored user document.
///
/// Numeric fields stay as raw JSON because older writers stored strings.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<StoredDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_period_date: Option<StoredDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_length: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_duration: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pregnant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lmp: Option<StoredDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<StoredDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_pregnant: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored pregnancy fields after normalization
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoredPregnancy {
    pub is_pregnant: bool,
    pub lmp: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl UserDocument {
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Cycle profile with configured defaults for unusable numbers.
    ///
    /// Returns `None` when no last period date was ever saved. Numbers that
    /// parse but exceed the accepted range are a validation error.
    pub fn cycle_profile(&self, cfg: &EngineConfig) -> Result<Option<CycleProfile>> {
        let Some(stored) = &self.last_period_date else {
            return Ok(None);
        };

        let cycle_length = stored_days(
            "cycleLength",
            self.cycle_length.as_ref(),
            1,
            cfg.default_cycle_length,
        );
        let period_duration = stored_days(
            "periodDuration",
            self.period_duration.as_ref(),
            0,
            cfg.default_period_duration,
        );

        CycleProfile::new(stored.calendar_date()?, cycle_length, period_duration).map(Some)
    }

    pub fn pregnancy(&self) -> Result<StoredPregnancy> {
        Ok(StoredPregnancy {
            is_pregnant: self.is_pregnant.unwrap_or(false),
            lmp: self.lmp.as_ref().map(StoredDate::calendar_date).transpose()?,
            due_date: self
                .due_date
                .as_ref()
                .map(StoredDate::calendar_date)
                .transpose()?,
        })
    }
}

/// A stored day count, or `default` when missing, non-numeric or below `min`
fn stored_days(field: &str, value: Option<&Value>, min: u32, default: u32) -> u32 {
    let Some(raw) = value else {
        tracing::debug!("No stored {}, using default {}", field, default);
        return default;
    };

    match lenient_number(raw) {
        Some(days) if days >= min => days,
        _ => {
            tracing::warn!("Stored {} {} is unusable, using default {}", field, raw, default);
            default
        }
    }
}

/// Read a non-negative whole number from a JSON number or numeric string.
///
/// Values past `u32::MAX` saturate so range validation still rejects them.
fn lenient_number(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    Some(u32::try_from(number).unwrap_or(u32::MAX))
}

/// Recursively merge `patch` into `target`. Objects merge key by key;
/// anything else replaces the existing value.
pub fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn ensure_object(patch: &Value) -> Result<()> {
    if patch.is_object() {
        Ok(())
    } else {
        Err(Error::validation("Document patch must be a JSON object"))
    }
}

// ============================================================================
// In-memory Store
// ============================================================================

/// Process-local store, used by tests and embedders
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<UserDocument>> {
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        documents
            .get(user_id)
            .cloned()
            .map(UserDocument::from_value)
            .transpose()
    }

    fn merge(&self, user_id: &str, patch: Value) -> Result<UserDocument> {
        ensure_object(&patch)?;
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        let document = documents
            .entry(user_id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        merge_json(document, patch);
        UserDocument::from_value(document.clone())
    }
}

// ============================================================================
// File Store
// ============================================================================

/// One JSON file per user under `<data_dir>/users/`, guarded by file locks
#[derive(Clone, Debug)]
pub struct FileProfileStore {
    dir: PathBuf,
}

impl FileProfileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("users"),
        }
    }

    fn document_path(&self, user_id: &str) -> Result<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{}.json", user_id)))
    }

    fn lock_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", user_id))
    }

    fn read_document(path: &Path) -> Result<Option<Value>> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let value = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded document from {:?}", path);
        Ok(Some(value))
    }
}

impl ProfileStore for FileProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<UserDocument>> {
        let path = self.document_path(user_id)?;
        Self::read_document(&path)?
            .map(UserDocument::from_value)
            .transpose()
    }

    fn merge(&self, user_id: &str, patch: Value) -> Result<UserDocument> {
        ensure_object(&patch)?;
        let path = self.document_path(user_id)?;
        std::fs::create_dir_all(&self.dir)?;

        // Serialize read-modify-write cycles for this user
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(user_id))?;
        lock.lock_exclusive()?;

        let mut document = match Self::read_document(&path)? {
            Some(existing) => existing,
            None => {
                tracing::info!("Creating document for user {}", user_id);
                Value::Object(Map::new())
            }
        };
        merge_json(&mut document, patch);

        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, &document)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        lock.unlock()?;
        tracing::debug!("Saved document to {:?}", path);

        UserDocument::from_value(document)
    }
}

fn validate_user_id(user_id: &str) -> Result<()> {
    let valid = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::validation(format!("Invalid user id: {:?}", user_id)))
    }
}
