use crate::midi::{MidiEngine, MidiError, Result};
use log::{debug, info};
use midir::{MidiOutput, MidiOutputConnection};

const CLIENT_NAME: &str = "kantanplay-output";
const CONNECTION_NAME: &str = "kantanplay-output-conn";

/// MIDI output backed by the platform MIDI service through midir
#[derive(Default)]
pub struct MidirEngine {
    connection: Option<MidiOutputConnection>,
}

impl MidirEngine {
    pub fn new() -> Self {
        MidirEngine { connection: None }
    }

    fn client() -> Result<MidiOutput> {
        MidiOutput::new(CLIENT_NAME).map_err(|e| MidiError::ConnectionError(e.to_string()))
    }
}

impl MidiEngine for MidirEngine {
    fn list_ports(&self) -> Result<Vec<String>> {
        let midi_out = Self::client()?;
        let port_names = midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect();
        Ok(port_names)
    }

    fn open(&mut self, index: usize) -> Result<()> {
        self.close();

        let midi_out = Self::client()?;
        let out_ports = midi_out.ports();
        let port = out_ports
            .get(index)
            .ok_or_else(|| MidiError::ConnectionError(format!("no output port at index {}", index)))?;
        let port_name = midi_out
            .port_name(port)
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        info!("Connecting to MIDI output port: {}", port_name);
        let connection = midi_out
            .connect(port, CONNECTION_NAME)
            .map_err(|e| MidiError::ConnectionError(format!("failed to open MIDI port: {}", e)))?;
        self.connection = Some(connection);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            debug!("Closing MIDI output connection");
            connection.close();
        }
    }

    fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    fn send(&mut self, message: &[u8]) -> Result<()> {
        let conn = self.connection.as_mut().ok_or(MidiError::NotConnected)?;
        conn.send(message)
            .map_err(|e| MidiError::SendError(e.to_string()))
    }
}

impl Drop for MidirEngine {
    fn drop(&mut self) {
        self.close();
    }
}
