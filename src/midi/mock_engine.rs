use crate::midi::{MidiEngine, MidiError, MidiMessage, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

#[derive(Debug, Default)]
struct MockState {
    open_port: Option<usize>,
    sent: Vec<(Instant, Vec<u8>)>,
    failing_notes: Vec<u8>,
    refuse_open: bool,
}

/// In-memory MIDI output that records everything sent to it.
///
/// Clones share the same recording, so a test can keep one handle while the
/// player owns another.
#[derive(Debug, Clone)]
pub struct MockMidiEngine {
    ports: Vec<String>,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockMidiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMidiEngine {
    pub fn new() -> Self {
        Self::with_ports(&["Mock Device 1", "Mock Device 2"])
    }

    pub fn with_ports(ports: &[&str]) -> Self {
        MockMidiEngine {
            ports: ports.iter().map(|p| p.to_string()).collect(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every send touching `note` fail
    pub fn fail_note(&self, note: u8) {
        self.state().failing_notes.push(note);
    }

    /// Makes subsequent `open` calls fail
    pub fn refuse_open(&self) {
        self.state().refuse_open = true;
    }

    pub fn open_port(&self) -> Option<usize> {
        self.state().open_port
    }

    pub fn sent_messages(&self) -> Vec<MidiMessage> {
        self.state()
            .sent
            .iter()
            .filter_map(|(_, bytes)| MidiMessage::parse(bytes))
            .collect()
    }

    /// Sent messages with the instant each one reached the device
    pub fn sent_with_times(&self) -> Vec<(Instant, MidiMessage)> {
        self.state()
            .sent
            .iter()
            .filter_map(|(at, bytes)| MidiMessage::parse(bytes).map(|msg| (*at, msg)))
            .collect()
    }

    pub fn clear(&self) {
        self.state().sent.clear();
    }
}

impl MidiEngine for MockMidiEngine {
    fn list_ports(&self) -> Result<Vec<String>> {
        Ok(self.ports.clone())
    }

    fn open(&mut self, index: usize) -> Result<()> {
        let mut state = self.state();
        if state.refuse_open {
            return Err(MidiError::ConnectionError("mock port refused".to_string()));
        }
        if index >= self.ports.len() {
            return Err(MidiError::ConnectionError(format!(
                "no output port at index {}",
                index
            )));
        }
        state.open_port = Some(index);
        Ok(())
    }

    fn close(&mut self) {
        self.state().open_port = None;
    }

    fn is_open(&self) -> bool {
        self.state().open_port.is_some()
    }

    fn send(&mut self, message: &[u8]) -> Result<()> {
        let mut state = self.state();
        if state.open_port.is_none() {
            return Err(MidiError::NotConnected);
        }
        if let Some(note) = message.get(1) {
            if state.failing_notes.contains(note) {
                return Err(MidiError::SendError(format!("mock failure for note {}", note)));
            }
        }
        state.sent.push((Instant::now(), message.to_vec()));
        Ok(())
    }
}
