//! LED strip service: the lifecycle core.
//!
//! [`LedStripService`] owns the channel registry, the pin backend and the
//! settings port.  The host calls its hooks; the service never schedules
//! itself.
//!
//! ```text
//!  startup ─▶ on_settings_initialized ─▶ register_all
//!  save    ─▶ on_settings_save        ─▶ unregister_all → persist → register_all
//!  M150    ─▶ handle_gcode            ─▶ parse_m150 → dispatch
//!  exit    ─▶ on_shutdown             ─▶ unregister_all → disconnect
//! ```
//!
//! [`serve`](LedStripService::serve) runs the hooks off a line stream and
//! always ends in `on_shutdown`.
//!
//! Callers serialise hook invocations; there is no internal locking.

use std::io::{self, BufRead};

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::config::LedSettings;

use super::commands::HostCommand;
use super::dispatch::dispatch;
use super::gcode::{is_m150, parse_m150};
use super::ports::{PinBackend, SettingsError, SettingsPort};
use super::registry::{ChannelRegistry, ChannelSet};

pub struct LedStripService<B: PinBackend, S: SettingsPort> {
    backend: B,
    store: S,
    registry: ChannelRegistry<B::Pin>,
    settings: LedSettings,
}

impl<B: PinBackend, S: SettingsPort> LedStripService<B, S> {
    /// Construct the service.  Nothing is bound until
    /// [`on_settings_initialized`](Self::on_settings_initialized).
    pub fn new(backend: B, store: S) -> Self {
        Self {
            backend,
            store,
            registry: ChannelRegistry::new(),
            settings: LedSettings::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn on_after_startup(&self) {
        info!("LedStrip v{} started", env!("CARGO_PKG_VERSION"));
    }

    /// Load stored settings and bind channels.
    pub fn on_settings_initialized(&mut self) -> ChannelSet {
        self.settings = match self.store.load() {
            Ok(s) => s,
            Err(SettingsError::NotFound) => {
                info!("no stored settings, using defaults");
                LedSettings::default()
            }
            Err(e) => {
                warn!("settings load failed ({}), using defaults", e);
                LedSettings::default()
            }
        };
        info!("settings loaded: backend={:?}", self.settings.backend_kind());
        self.registry.register_all(&self.settings, &mut self.backend)
    }

    /// Apply a settings patch: tear down, persist, stand back up.
    pub fn on_settings_save(&mut self, patch: &Value) -> ChannelSet {
        debug!("on_settings_save: {}", patch);
        self.registry.unregister_all(&mut self.backend);

        self.settings.merge_patch(patch);
        if let Err(e) = self.store.save(&self.settings) {
            warn!("settings save failed ({}), applying for this session only", e);
        }

        self.registry.register_all(&self.settings, &mut self.backend)
    }

    pub fn on_shutdown(&mut self) {
        info!("LedStrip shutdown");
        self.registry.unregister_all(&mut self.backend);
        self.backend.disconnect();
    }

    // ── Command handling ──────────────────────────────────────

    /// Handle one command from the host's queue.  Anything other than a
    /// G-code `M150` is ignored.
    pub fn handle_gcode(&mut self, cmd: &str, is_gcode: bool) {
        if !is_gcode || !is_m150(cmd) {
            return;
        }
        debug!("M150 detected: {}", cmd);
        let duties = parse_m150(cmd);
        dispatch(&duties, &mut self.registry);
    }

    pub fn handle_command(&mut self, cmd: HostCommand) {
        match cmd {
            HostCommand::Gcode(line) => self.handle_gcode(&line, true),
            HostCommand::SaveSettings(patch) => {
                self.on_settings_save(&patch);
            }
            HostCommand::Shutdown => self.on_shutdown(),
        }
    }

    /// Feed commands from `input`, one per line, until EOF, `@shutdown` or
    /// a read error, then shut down.
    ///
    /// Bytes that are not UTF-8 are replaced, so a garbled line is just an
    /// unknown command.  A read error is returned after teardown.
    pub fn serve<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
        let mut buf = Vec::new();
        let result = loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => break Ok(()),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("command stream failed: {}", e);
                    break Err(e);
                }
            }

            match HostCommand::from_line(&String::from_utf8_lossy(&buf)) {
                Ok(Some(HostCommand::Shutdown)) => break Ok(()),
                Ok(Some(cmd)) => self.handle_command(cmd),
                Ok(None) => {}
                Err(e) => warn!("ignoring malformed settings line: {}", e),
            }
        };

        self.on_shutdown();
        result
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn settings(&self) -> &LedSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ChannelRegistry<B::Pin> {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
