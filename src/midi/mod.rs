//! MIDI output for kantanplay
//!
//! This module provides:
//! - [`MidiEngine`] trait for listing, opening and writing to output ports
//! - [`MidiMessage`] channel-voice messages and their wire encoding
//! - [`MidirEngine`] for real MIDI device communication
//! - [`MockMidiEngine`] for testing
//!
mod engine;
pub mod midir_engine;
pub mod mock_engine;

// Re-export main types from engine
pub use engine::{MidiEngine, MidiError, MidiMessage, Result};

// Re-export concrete implementations
pub use midir_engine::MidirEngine;
pub use mock_engine::MockMidiEngine;

// Set default engine type
#[cfg(not(feature = "test-mock"))]
pub type DefaultMidiEngine = MidirEngine;

#[cfg(feature = "test-mock")]
pub type DefaultMidiEngine = MockMidiEngine;
