//! Setup-time contract with the audio driver client.
//!
//! The driver owns port registration, the connection graph and the
//! client lifecycle. None of this runs on the audio thread.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of port a host registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    AudioInput,
    AudioOutput,
    MidiInput,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PortKind::AudioInput => "audio input",
            PortKind::AudioOutput => "audio output",
            PortKind::MidiInput => "MIDI input",
        })
    }
}

/// Driver-assigned port identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(u64);

impl PortId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// An open driver client.
pub trait AudioDriver: Send {
    fn client_name(&self) -> &str;

    /// Rate every host on this client is initialised with.
    fn sample_rate(&self) -> f64;

    fn register_port(&mut self, name: &str, kind: PortKind) -> Result<PortId>;

    fn unregister_port(&mut self, port: PortId) -> Result<()>;

    /// Connect two ports by full (`client:port`) or short name.
    fn connect(&mut self, from: &str, to: &str) -> Result<()>;

    fn activate(&mut self) -> Result<()>;

    fn deactivate(&mut self) -> Result<()>;

    /// Release the client. Further calls fail with `DriverClosed`.
    fn close(&mut self) -> Result<()>;
}

/// A registered port of an [`OfflineDriver`].
#[derive(Debug, Clone, PartialEq)]
pub struct PortRecord {
    pub id: PortId,
    pub name: String,
    pub kind: PortKind,
}

/// In-memory driver for offline rendering and tests.
///
/// Ports from other clients (any `client:port` name with a foreign client
/// prefix) are treated as existing.
#[derive(Debug)]
pub struct OfflineDriver {
    name: String,
    sample_rate: f64,
    ports: Vec<PortRecord>,
    next_id: u64,
    connections: Vec<(String, String)>,
    port_limit: Option<usize>,
    active: bool,
    closed: bool,
}

impl OfflineDriver {
    pub fn new(name: impl Into<String>, sample_rate: f64) -> Self {
        Self {
            name: name.into(),
            sample_rate,
            ports: Vec::new(),
            next_id: 1,
            connections: Vec::new(),
            port_limit: None,
            active: false,
            closed: false,
        }
    }

    /// Fail registration once `limit` ports are registered.
    pub fn with_port_limit(mut self, limit: usize) -> Self {
        self.port_limit = Some(limit);
        self
    }

    pub fn ports(&self) -> &[PortRecord] {
        &self.ports
    }

    pub fn port(&self, id: PortId) -> Option<&PortRecord> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub fn port_by_name(&self, name: &str) -> Option<&PortRecord> {
        let short = self.short_name(name)?;
        self.ports.iter().find(|p| p.name == short)
    }

    pub fn connections(&self) -> &[(String, String)] {
        &self.connections
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `client:port` form of a short port name.
    pub fn full_name(&self, port: &str) -> String {
        format!("{}:{}", self.name, port)
    }

    /// Short name for ports of this client, `None` for foreign ports.
    fn short_name<'n>(&self, name: &'n str) -> Option<&'n str> {
        match name.split_once(':') {
            Some((client, port)) if client == self.name => Some(port),
            Some(_) => None,
            None => Some(name),
        }
    }

    fn resolve(&self, name: &str) -> Option<String> {
        match self.short_name(name) {
            Some(short) => self
                .ports
                .iter()
                .any(|p| p.name == short)
                .then(|| self.full_name(short)),
            None => Some(name.to_string()),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::DriverClosed)
        } else {
            Ok(())
        }
    }
}

impl AudioDriver for OfflineDriver {
    fn client_name(&self) -> &str {
        &self.name
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn register_port(&mut self, name: &str, kind: PortKind) -> Result<PortId> {
        self.ensure_open()?;
        let at_limit = self.port_limit.is_some_and(|limit| self.ports.len() >= limit);
        if at_limit || name.is_empty() || self.ports.iter().any(|p| p.name == name) {
            return Err(Error::PortRegistration {
                name: name.to_string(),
                kind,
            });
        }

        let id = PortId::new(self.next_id);
        self.next_id += 1;
        self.ports.push(PortRecord {
            id,
            name: name.to_string(),
            kind,
        });
        Ok(id)
    }

    fn unregister_port(&mut self, port: PortId) -> Result<()> {
        self.ensure_open()?;
        if let Some(pos) = self.ports.iter().position(|p| p.id == port) {
            let full = self.full_name(&self.ports[pos].name);
            self.connections.retain(|(a, b)| *a != full && *b != full);
            self.ports.remove(pos);
        }
        Ok(())
    }

    fn connect(&mut self, from: &str, to: &str) -> Result<()> {
        self.ensure_open()?;
        let connection_error = || Error::Connection {
            from: from.to_string(),
            to: to.to_string(),
        };
        let a = self.resolve(from).ok_or_else(connection_error)?;
        let b = self.resolve(to).ok_or_else(connection_error)?;

        if !self.connections.iter().any(|(x, y)| *x == a && *y == b) {
            self.connections.push((a, b));
        }
        Ok(())
    }

    fn activate(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.active = true;
        Ok(())
    }

    fn deactivate(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.active = false;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.active = false;
        self.closed = true;
        self.connections.clear();
        self.ports.clear();
        Ok(())
    }
}
