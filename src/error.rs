use crate::midi::MidiError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by loading, converting and playing a performance
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input document or a value outside its allowed range
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Malformed or missing MIDI lookup tables
    #[error("configuration error: {0}")]
    Configuration(String),

    /// MIDI device failure (no ports, unknown port, send failure, ...)
    #[error(transparent)]
    Device(#[from] MidiError),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
