use thiserror::Error;

/// Error type for MIDI device operations
#[derive(Error, Debug)]
pub enum MidiError {
    #[error("no MIDI output ports available")]
    NoOutputPorts,

    #[error("MIDI port '{requested}' not found. Available: {available:?}")]
    PortNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// Error when opening or enumerating a MIDI device
    #[error("MIDI connection error: {0}")]
    ConnectionError(String),

    /// Error when sending a MIDI message
    #[error("MIDI send error: {0}")]
    SendError(String),

    #[error("MIDI device not connected")]
    NotConnected,

    #[error("already playing, stop the current playback first")]
    AlreadyPlaying,
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Channel voice messages emitted by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note On message with note number and velocity
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off message with note number and release velocity
    NoteOff { channel: u8, note: u8, velocity: u8 },
}

impl MidiMessage {
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => [0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
        }
    }

    pub fn parse(data: &[u8]) -> Option<MidiMessage> {
        if data.len() < 3 {
            return None;
        }

        match data[0] & 0xF0 {
            0x90 => Some(MidiMessage::NoteOn {
                channel: data[0] & 0x0F,
                note: data[1],
                velocity: data[2],
            }),
            0x80 => Some(MidiMessage::NoteOff {
                channel: data[0] & 0x0F,
                note: data[1],
                velocity: data[2],
            }),
            _ => None,
        }
    }

    pub fn note(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => note,
        }
    }
}

/// Output side of a MIDI device: enumerate ports, hold one open, write raw messages
pub trait MidiEngine: Send {
    /// Names of the output ports currently visible to the backend
    fn list_ports(&self) -> Result<Vec<String>>;

    /// Opens the port at `index` in the order returned by [`MidiEngine::list_ports`]
    fn open(&mut self, index: usize) -> Result<()>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Sends one raw channel-voice message
    fn send(&mut self, message: &[u8]) -> Result<()>;
}
