//! Hardware MIDI output through midir

use super::MidiTransport;
use crate::error::{ControlError, Result};
use midir::{MidiOutput, MidiOutputConnection};
use tracing::{info, warn};

const CLIENT_NAME: &str = "shodou";

/// Connection to a system MIDI output port
pub struct MidirTransport {
    conn: MidiOutputConnection,
    port_name: String,
}

impl MidirTransport {
    /// Names of the available output ports
    pub fn list_ports() -> Result<Vec<String>> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        Ok(midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect())
    }

    /// Connect to `port_name`, or to the first port if it is not present
    pub fn open(port_name: &str) -> Result<Self> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let ports = midi_out.ports();

        let port = match ports
            .iter()
            .find(|p| midi_out.port_name(p).map(|n| n == port_name).unwrap_or(false))
        {
            Some(port) => port.clone(),
            None => {
                let first = ports
                    .first()
                    .cloned()
                    .ok_or_else(|| ControlError::PortNotFound(port_name.to_string()))?;
                warn!(
                    "MIDI port '{}' not found, falling back to the first port",
                    port_name
                );
                first
            }
        };

        let name = midi_out
            .port_name(&port)
            .unwrap_or_else(|_| port_name.to_string());
        let conn = midi_out
            .connect(&port, "shodou-out")
            .map_err(|e| ControlError::MidiError(e.to_string()))?;

        info!("Connected to MIDI output port: {}", name);
        Ok(Self {
            conn,
            port_name: name,
        })
    }

    /// Name of the connected port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiTransport for MidirTransport {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        self.conn.send(message)?;
        Ok(())
    }
}
