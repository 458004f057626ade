//! Driver-client bookkeeping: port naming, host registration, teardown.

use crate::{Error, Result};
use modhost_core::{
    AudioDriver, HostConfig, HostHandle, PortId, PortKind, ProcessingHost, ProcessingModule,
};
use parking_lot::Mutex;

/// A port registered on behalf of a host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostPort {
    pub id: PortId,
    pub name: String,
    pub kind: PortKind,
}

/// A host opened on a [`HostClient`].
#[derive(Debug, Clone)]
pub struct HostEntry {
    name: String,
    ports: Vec<HostPort>,
    handle: HostHandle,
}

impl HostEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &HostHandle {
        &self.handle
    }

    pub fn ports(&self) -> &[HostPort] {
        &self.ports
    }

    pub fn input_ports(&self) -> impl Iterator<Item = &HostPort> {
        self.ports_of(PortKind::AudioInput)
    }

    pub fn output_ports(&self) -> impl Iterator<Item = &HostPort> {
        self.ports_of(PortKind::AudioOutput)
    }

    pub fn midi_port(&self) -> Option<&HostPort> {
        self.ports_of(PortKind::MidiInput).next()
    }

    fn ports_of(&self, kind: PortKind) -> impl Iterator<Item = &HostPort> {
        self.ports.iter().filter(move |p| p.kind == kind)
    }
}

struct ClientState<D> {
    driver: D,
    input_nr: usize,
    output_nr: usize,
    midi_nr: usize,
    entries: Vec<HostEntry>,
    closed: bool,
}

impl<D: AudioDriver> ClientState<D> {
    /// Next name for `kind`; the counter advances even if registration fails.
    fn next_port_name(&mut self, config: &HostConfig, kind: PortKind) -> String {
        let (template, counter) = match kind {
            PortKind::AudioInput => (&config.input_port_template, &mut self.input_nr),
            PortKind::AudioOutput => (&config.output_port_template, &mut self.output_nr),
            PortKind::MidiInput => (&config.midi_port_template, &mut self.midi_nr),
        };
        let name = port_name(template, *counter);
        *counter += 1;
        name
    }

    fn release(&mut self, ports: &[HostPort]) {
        for port in ports {
            if let Err(e) = self.driver.unregister_port(port.id) {
                tracing::warn!("Failed to unregister port '{}': {}", port.name, e);
            }
        }
    }
}

/// One open driver client and the hosts registered on it.
///
/// Port names come from the config templates with running counters shared
/// by every host on the client, so the second stereo host gets
/// `input_3`/`input_4`.
///
/// # Example
///
/// ```ignore
/// use modhost::prelude::*;
///
/// let client = HostClient::builder().build(OfflineDriver::new("calf", 48_000.0))?;
/// let (mut host, handle) = client.open_host(my_module)?;
/// client.connect("calf:output_1", "system:playback_1")?;
/// client.activate()?;
/// ```
pub struct HostClient<D: AudioDriver> {
    config: HostConfig,
    client_name: String,
    sample_rate: f64,
    state: Mutex<ClientState<D>>,
}

impl<D: AudioDriver> HostClient<D> {
    pub fn new(driver: D, config: HostConfig) -> Result<Self> {
        config.validate()?;
        let client_name = driver.client_name().to_string();
        let sample_rate = driver.sample_rate();
        tracing::info!("Client '{}' opened at {} Hz", client_name, sample_rate);

        Ok(Self {
            config,
            client_name,
            sample_rate,
            state: Mutex::new(ClientState {
                driver,
                input_nr: 1,
                output_nr: 1,
                midi_nr: 1,
                entries: Vec::new(),
                closed: false,
            }),
        })
    }

    pub fn builder() -> crate::HostClientBuilder {
        crate::HostClientBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.client_name
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Register ports for `module`, initialise it at the client's rate and
    /// record it. On failure every port registered for this module is
    /// released again.
    pub fn open_host<M: ProcessingModule>(
        &self,
        module: M,
    ) -> Result<(ProcessingHost<M>, HostHandle)> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(modhost_core::Error::DriverClosed.into());
        }

        let (mut host, handle) = ProcessingHost::new(module, &self.config)?;

        let mut kinds = Vec::with_capacity(host.input_count() + host.output_count() + 1);
        kinds.extend(std::iter::repeat(PortKind::AudioInput).take(host.input_count()));
        kinds.extend(std::iter::repeat(PortKind::AudioOutput).take(host.output_count()));
        if host.supports_midi() {
            kinds.push(PortKind::MidiInput);
        }

        let mut ports = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let name = state.next_port_name(&self.config, kind);
            match state.driver.register_port(&name, kind) {
                Ok(id) => ports.push(HostPort { id, name, kind }),
                Err(e) => {
                    tracing::warn!("Could not register {} port '{}': {}", kind, name, e);
                    state.release(&ports);
                    return Err(e.into());
                }
            }
        }

        if let Err(e) = host.init(self.sample_rate) {
            state.release(&ports);
            return Err(e.into());
        }

        tracing::info!(
            "Opened host '{}' on '{}' with {} ports",
            handle.name(),
            self.client_name,
            ports.len()
        );
        state.entries.push(HostEntry {
            name: handle.name().to_string(),
            ports,
            handle: handle.clone(),
        });

        Ok((host, handle))
    }

    /// Unregister the ports of the host at `index` and forget it.
    pub fn remove(&self, index: usize) -> Result<HostEntry> {
        let mut state = self.state.lock();
        let len = state.entries.len();
        if index >= len {
            return Err(Error::HostIndex { index, len });
        }
        let entry = state.entries.remove(index);
        state.release(&entry.ports);
        tracing::info!("Removed host '{}'", entry.name);
        Ok(entry)
    }

    /// Snapshot of the open hosts, in open order.
    pub fn hosts(&self) -> Vec<HostEntry> {
        self.state.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn connect(&self, from: &str, to: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.driver.connect(from, to)?;
        tracing::debug!("Connected '{}' -> '{}'", from, to);
        Ok(())
    }

    pub fn activate(&self) -> Result<()> {
        self.state.lock().driver.activate()?;
        Ok(())
    }

    pub fn deactivate(&self) -> Result<()> {
        self.state.lock().driver.deactivate()?;
        Ok(())
    }

    /// Unregister every port and close the driver. Calling it again is a
    /// no-op.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        let entries = std::mem::take(&mut state.entries);
        for entry in &entries {
            state.release(&entry.ports);
        }
        state.closed = true;
        state.driver.close()?;
        tracing::info!("Client '{}' closed", self.client_name);
        Ok(())
    }

    /// Run `f` against the driver, e.g. to inspect an `OfflineDriver`.
    pub fn with_driver<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.state.lock().driver)
    }
}

impl<D: AudioDriver> Drop for HostClient<D> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to close client '{}': {}", self.client_name, e);
        }
    }
}

impl<D: AudioDriver> std::fmt::Debug for HostClient<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostClient")
            .field("name", &self.client_name)
            .field("sample_rate", &self.sample_rate)
            .field("hosts", &self.len())
            .finish()
    }
}

/// Expand the first `%d` in `template` with `number`.
pub fn port_name(template: &str, number: usize) -> String {
    template.replacen("%d", &number.to_string(), 1)
}
