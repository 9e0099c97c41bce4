//! Session persistence: the wire snapshot, partial-trust restore, and the
//! key-value store abstraction hosts implement.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;
use thiserror::Error;

use crate::data::{MissionCatalog, MissionId};
use crate::numbers::{integrity_from_f64, saturating_index, u64_to_usize};

/// Trait for abstracting the durable key-value slot.
/// Platform-specific implementations should provide this.
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be modified.
    fn remove(&mut self, key: &str) -> Result<(), Self::Error>;
}

/// Persisted shape of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub queue: Vec<MissionId>,
    pub current_index: usize,
    pub integrity: u8,
    pub hard_mode: bool,
}

impl SessionSnapshot {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Blob could not be trusted at all and must be discarded.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("persisted session is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("persisted session is not a JSON object")]
    NotAnObject,
}

/// Fields recovered from a persisted blob; `None` means absent or ill-typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestorePatch {
    pub queue: Option<Vec<MissionId>>,
    pub current_index: Option<usize>,
    pub integrity: Option<u8>,
    pub hard_mode: Option<bool>,
    /// Fields that were present but failed validation.
    pub skipped: Vec<&'static str>,
}

/// Parse a persisted blob, validating each field on its own.
///
/// # Errors
///
/// Returns an error when the blob is not JSON or not an object; individual
/// bad fields are dropped into [`RestorePatch::skipped`] instead.
pub fn parse_restore(raw: &str, catalog: &MissionCatalog) -> Result<RestorePatch, RestoreError> {
    let Value::Object(fields) = serde_json::from_str::<Value>(raw)? else {
        return Err(RestoreError::NotAnObject);
    };

    let mut skipped = Vec::new();
    let queue = checked_field(&fields, "queue", &mut skipped, |v| queue_field(v, catalog));
    let current_index = checked_field(&fields, "currentIndex", &mut skipped, |v| {
        v.as_u64().map_or_else(
            || v.as_f64().and_then(saturating_index),
            |n| Some(u64_to_usize(n).unwrap_or(usize::MAX)),
        )
    });
    let integrity = checked_field(&fields, "integrity", &mut skipped, |v| {
        v.as_f64().and_then(integrity_from_f64)
    });
    let hard_mode = checked_field(&fields, "hardMode", &mut skipped, Value::as_bool);
    Ok(RestorePatch {
        queue,
        current_index,
        integrity,
        hard_mode,
        skipped,
    })
}

fn checked_field<T>(
    fields: &Map<String, Value>,
    name: &'static str,
    skipped: &mut Vec<&'static str>,
    parse: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = fields.get(name)?;
    let parsed = parse(value);
    if parsed.is_none() {
        skipped.push(name);
    }
    parsed
}

fn non_negative_integer(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        let float = value.as_f64()?;
        if float >= 0.0 && float.fract() == 0.0 && float <= 9_007_199_254_740_991.0 {
            num_traits::cast(float)
        } else {
            None
        }
    })
}

fn queue_field(value: &Value, catalog: &MissionCatalog) -> Option<Vec<MissionId>> {
    let entries = value.as_array()?;
    if entries.is_empty() {
        return None;
    }
    entries
        .iter()
        .map(|entry| {
            let id = MissionId::try_from(non_negative_integer(entry)?).ok()?;
            catalog.contains(id).then_some(id)
        })
        .collect()
}

/// In-memory [`SessionStore`]. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot, e.g. with a blob from a previous page load.
    #[must_use]
    pub fn with_slot(self, key: &str, value: &str) -> Self {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl SessionStore for MemoryStore {
    type Error = Infallible;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
