// config.rs

use crate::error::{Error, Result};
use config::{File, FileFormat, Value, ValueKind};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "MIDI.json";
pub const DEFAULT_CHANNEL: u8 = 0;

/// Estimated length, in minutes, above which a performance is flagged
pub const LONG_PERFORMANCE_MINUTES: f64 = 10.0;

pub const SLOT_COUNT: usize = 8;
pub const DEGREE_COUNT: usize = 12;
pub const MODIFIER_SLOTS: usize = 3;
pub const MODIFIER_VALUES: usize = 8;

/// Raw shape of a `MIDI.json` document before validation.
///
/// Entries stay untyped so floats, strings and booleans are rejected instead
/// of being coerced to integers.
#[derive(Debug, Deserialize)]
struct RawTables {
    slot: Option<Vec<Value>>,
    notes: Option<Vec<Value>>,
    modifier1: Option<Vec<Value>>,
    modifier2: Option<Vec<Value>>,
    modifier3: Option<Vec<Value>>,
}

/// Validated note lookup tables for one device layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiConfig {
    slot_notes: Vec<u8>,
    degree_notes: Vec<u8>,
    modifier_notes: [Vec<u8>; MODIFIER_SLOTS],
}

impl MidiConfig {
    pub fn new(
        slot: Vec<u8>,
        notes: Vec<u8>,
        modifier1: Vec<u8>,
        modifier2: Vec<u8>,
        modifier3: Vec<u8>,
    ) -> Result<Self> {
        let widen = |table: Vec<u8>| Some(table.into_iter().map(Value::from).collect());
        Self::from_raw(RawTables {
            slot: widen(slot),
            notes: widen(notes),
            modifier1: widen(modifier1),
            modifier2: widen(modifier2),
            modifier3: widen(modifier3),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading MIDI configuration from {}", path.display());
        Self::from_source(File::from(path).format(FileFormat::Json))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_source(File::from_str(json, FileFormat::Json))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let raw = config::Config::builder()
            .add_source(source)
            .build()
            .and_then(|settings| settings.try_deserialize::<RawTables>())
            .map_err(|e| Error::Configuration(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawTables) -> Result<Self> {
        let missing: Vec<&str> = [
            ("slot", raw.slot.is_none()),
            ("notes", raw.notes.is_none()),
            ("modifier1", raw.modifier1.is_none()),
            ("modifier2", raw.modifier2.is_none()),
            ("modifier3", raw.modifier3.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            return Err(Error::Configuration(format!(
                "missing tables: [{}]",
                missing.join(", ")
            )));
        }

        let config = MidiConfig {
            slot_notes: validate_table("slot", raw.slot, SLOT_COUNT)?,
            degree_notes: validate_table("notes", raw.notes, DEGREE_COUNT)?,
            modifier_notes: [
                validate_table("modifier1", raw.modifier1, MODIFIER_VALUES)?,
                validate_table("modifier2", raw.modifier2, MODIFIER_VALUES)?,
                validate_table("modifier3", raw.modifier3, MODIFIER_VALUES)?,
            ],
        };
        debug!("Loaded MIDI configuration: {:?}", config);
        Ok(config)
    }

    pub fn slot_notes(&self) -> &[u8] {
        &self.slot_notes
    }

    pub fn degree_notes(&self) -> &[u8] {
        &self.degree_notes
    }

    /// Table for modifier slot `index` (1-3)
    pub fn modifier_notes(&self, index: u8) -> Option<&[u8]> {
        let slot = usize::from(index).checked_sub(1)?;
        self.modifier_notes.get(slot).map(Vec::as_slice)
    }
}

fn integer_entry(kind: &ValueKind) -> Option<i64> {
    match *kind {
        ValueKind::I64(value) => Some(value),
        ValueKind::I128(value) => i64::try_from(value).ok(),
        ValueKind::U64(value) => i64::try_from(value).ok(),
        ValueKind::U128(value) => i64::try_from(value).ok(),
        _ => None,
    }
}

fn validate_table(name: &str, table: Option<Vec<Value>>, expected_len: usize) -> Result<Vec<u8>> {
    let table = table.unwrap_or_default();
    if table.len() != expected_len {
        return Err(Error::Configuration(format!(
            "table '{}' must have {} entries, got {}",
            name,
            expected_len,
            table.len()
        )));
    }

    table
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            integer_entry(&value.kind)
                .and_then(|n| u8::try_from(n).ok())
                .filter(|note| *note <= 127)
                .ok_or_else(|| {
                    Error::Configuration(format!(
                        "table '{}' entry {} must be a MIDI note 0-127, got {:?}",
                        name, i, value.kind
                    ))
                })
        })
        .collect()
}
