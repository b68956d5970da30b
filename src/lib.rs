pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod midi;
pub mod performance;
pub mod player;
pub mod sequence;
pub mod state;
pub mod timing;
pub mod ui;

pub use config::MidiConfig;
pub use error::{Error, Result};
pub use mapper::NoteMapper;
pub use performance::{Degree, NoteEntry, Performance};
pub use player::MidiPlayer;
pub use sequence::{EventKind, ScheduledEvent, Sequence, SequenceBuilder};
pub use state::PlaybackState;

use midi::{DefaultMidiEngine, MidiEngine};

/// Names of the MIDI output ports currently available; empty if they can't be listed
pub fn handle_device_list() -> Vec<String> {
    match DefaultMidiEngine::default().list_ports() {
        Ok(ports) => ports,
        Err(e) => {
            log::error!("Failed to list MIDI output ports: {}", e);
            Vec::new()
        }
    }
}
