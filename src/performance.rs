//! Performance description: the data model and its JSON input handler

use crate::config::LONG_PERFORMANCE_MINUTES;
use crate::error::{Error, Result};
use crate::timing::BEATS_PER_NOTE;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const REQUIRED_FIELDS: [&str; 3] = ["slot", "tempo", "notes"];

pub const MIN_SLOT: u8 = 1;
pub const MAX_SLOT: u8 = 8;
pub const MIN_TEMPO: u16 = 20;
pub const MAX_TEMPO: u16 = 600;
pub const MAX_MODIFIER_VALUE: u8 = 8;

/// One of the twelve scale-degree buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Degree {
    One,
    FlatTwo,
    Two,
    FlatThree,
    Three,
    Four,
    FlatFive,
    Five,
    FlatSix,
    Six,
    FlatSeven,
    Seven,
}

impl Degree {
    pub const ALL: [Degree; 12] = [
        Degree::One,
        Degree::FlatTwo,
        Degree::Two,
        Degree::FlatThree,
        Degree::Three,
        Degree::Four,
        Degree::FlatFive,
        Degree::Five,
        Degree::FlatSix,
        Degree::Six,
        Degree::FlatSeven,
        Degree::Seven,
    ];

    /// Semitone offset from the root, 0-11
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Degree::One => "1",
            Degree::FlatTwo => "2b",
            Degree::Two => "2",
            Degree::FlatThree => "3b",
            Degree::Three => "3",
            Degree::Four => "4",
            Degree::FlatFive => "5b",
            Degree::Five => "5",
            Degree::FlatSix => "6b",
            Degree::Six => "6",
            Degree::FlatSeven => "7b",
            Degree::Seven => "7",
        }
    }
}

impl FromStr for Degree {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Degree::ALL
            .iter()
            .copied()
            .find(|degree| degree.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Degree::ALL.iter().map(|d| d.as_str()).collect();
                Error::InvalidInput(format!(
                    "invalid degree: '{}'. Must be one of {:?}",
                    s, valid
                ))
            })
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One performed unit: a degree pressed eight times with up to three held modifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    degree: Degree,
    modifiers: [u8; 3],
}

impl NoteEntry {
    pub fn new(degree: &str, modifier1: u8, modifier2: u8, modifier3: u8) -> Result<Self> {
        let degree = degree.parse()?;
        let modifiers = [modifier1, modifier2, modifier3];
        for (i, value) in modifiers.iter().enumerate() {
            if *value > MAX_MODIFIER_VALUE {
                return Err(Error::InvalidInput(format!(
                    "modifier{} must be between 0 and {}, got {}",
                    i + 1,
                    MAX_MODIFIER_VALUE,
                    value
                )));
            }
        }
        Ok(NoteEntry { degree, modifiers })
    }

    /// A note with no modifiers held
    pub fn plain(degree: Degree) -> Self {
        NoteEntry {
            degree,
            modifiers: [0; 3],
        }
    }

    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Value of modifier slot `index` (1-3); 0 means inactive
    pub fn modifier(&self, index: u8) -> u8 {
        usize::from(index)
            .checked_sub(1)
            .and_then(|i| self.modifiers.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// `(slot index, value)` for every active modifier, in slot order
    pub fn active_modifiers(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (1u8..)
            .zip(self.modifiers.iter().copied())
            .filter(|(_, value)| *value > 0)
    }
}

/// Non-fatal observations about an otherwise valid performance
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    LongPerformance { minutes: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::LongPerformance { minutes } => write!(
                f,
                "performance is very long: approximately {:.1} minutes",
                minutes
            ),
        }
    }
}

/// A validated performance: slot, tempo and a non-empty list of notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Performance {
    slot: u8,
    tempo: u16,
    notes: Vec<NoteEntry>,
}

#[derive(Deserialize)]
struct RawNote {
    degree: String,
    #[serde(default)]
    modifier1: i64,
    #[serde(default)]
    modifier2: i64,
    #[serde(default)]
    modifier3: i64,
}

impl Performance {
    pub fn new(slot: u8, tempo: u16, notes: Vec<NoteEntry>) -> Result<Self> {
        check_range("slot", i64::from(slot), MIN_SLOT.into(), MAX_SLOT.into())?;
        check_range("tempo", i64::from(tempo), MIN_TEMPO.into(), MAX_TEMPO.into())?;
        if notes.is_empty() {
            return Err(Error::InvalidInput("notes list cannot be empty".to_string()));
        }
        Ok(Performance { slot, tempo, notes })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("malformed JSON: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::InvalidInput("performance must be a JSON object".to_string()))?;

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !object.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            return Err(Error::InvalidInput(format!(
                "missing required fields: [{}]",
                missing.join(", ")
            )));
        }

        let slot = integer_field(&object["slot"], "slot")?;
        let slot = check_range("slot", slot, MIN_SLOT.into(), MAX_SLOT.into())?;
        let tempo = integer_field(&object["tempo"], "tempo")?;
        let tempo = check_range("tempo", tempo, MIN_TEMPO.into(), MAX_TEMPO.into())?;
        let notes = parse_notes(&object["notes"])?;

        debug!(
            "Parsed performance: slot={}, tempo={}, notes={}",
            slot,
            tempo,
            notes.len()
        );
        // Both values were range-checked above.
        Self::new(slot as u8, tempo as u16, notes)
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn tempo(&self) -> u16 {
        self.tempo
    }

    pub fn notes(&self) -> &[NoteEntry] {
        &self.notes
    }

    /// Real playback length in minutes: eight beats per note at the given tempo
    pub fn estimated_minutes(&self) -> f64 {
        (self.notes.len() as f64 * BEATS_PER_NOTE as f64) / f64::from(self.tempo)
    }

    pub fn advisories(&self) -> Vec<Advisory> {
        let mut advisories = Vec::new();
        let minutes = self.estimated_minutes();
        if minutes > LONG_PERFORMANCE_MINUTES {
            let advisory = Advisory::LongPerformance { minutes };
            warn!("{}", advisory);
            advisories.push(advisory);
        }
        advisories
    }
}

fn integer_field(value: &Value, name: &str) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| Error::InvalidInput(format!("{} must be an integer, got {}", name, value)))
}

fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<i64> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )))
    }
}

fn parse_notes(value: &Value) -> Result<Vec<NoteEntry>> {
    let notes = value
        .as_array()
        .ok_or_else(|| Error::InvalidInput("notes must be a list".to_string()))?;

    notes
        .iter()
        .enumerate()
        .map(|(i, note)| {
            let object = note.as_object().ok_or_else(|| {
                Error::InvalidInput(format!("note at index {} must be an object", i))
            })?;
            if !object.contains_key("degree") {
                return Err(Error::InvalidInput(format!(
                    "note at index {} is missing 'degree' field",
                    i
                )));
            }

            let raw: RawNote = serde_json::from_value(note.clone())
                .map_err(|e| Error::InvalidInput(format!("note at index {}: {}", i, e)))?;
            let modifier = |slot: usize, value: i64| {
                u8::try_from(value)
                    .ok()
                    .filter(|v| *v <= MAX_MODIFIER_VALUE)
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "note at index {}: modifier{} must be between 0 and {}, got {}",
                            i, slot, MAX_MODIFIER_VALUE, value
                        ))
                    })
            };
            NoteEntry::new(
                &raw.degree,
                modifier(1, raw.modifier1)?,
                modifier(2, raw.modifier2)?,
                modifier(3, raw.modifier3)?,
            )
        })
        .collect()
}
