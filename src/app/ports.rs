//! Port traits: the boundary between the LED core and the host.
//!
//! ```text
//!   Host hooks ──▶ LedStripService ──▶ PinBackend ──▶ PwmPin
//!                        │
//!                        └──▶ SettingsPort
//! ```
//!
//! Driven adapters (pin backends, settings storage) implement these traits.
//! The [`LedStripService`](super::service::LedStripService) and
//! [`ChannelRegistry`](super::registry::ChannelRegistry) consume them via
//! generics, so the core never touches a device node directly.

use crate::config::{BackendKind, LedSettings};
use crate::error::PinError;

// ───────────────────────────────────────────────────────────────
// PWM pin (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// A started PWM output.  Duty cycles are percent, 0.0–100.0.
pub trait PwmPin {
    /// Drive the output at `duty`.
    fn start(&mut self, duty: f32) -> Result<(), PinError>;

    /// Set the duty cycle to 0 and idle the output.
    fn stop(&mut self) -> Result<(), PinError>;

    /// Update the duty cycle of a running output.
    fn set_duty_cycle(&mut self, duty: f32) -> Result<(), PinError> {
        self.start(duty)
    }

    /// Last duty cycle written.
    fn duty_cycle(&self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Pin backend (driven adapter: factory for PwmPin)
// ───────────────────────────────────────────────────────────────

/// Constructs pins for a backend kind and owns the process-wide resources
/// (GPIO handle, daemon connection) behind them.
pub trait PinBackend {
    type Pin: PwmPin;

    /// Pick up backend endpoints (device path, daemon address) before a
    /// registration pass.
    fn configure(&mut self, _settings: &LedSettings) {}

    /// Construct a pin for the physical header position `physical_pin`.
    ///
    /// Errors are per channel: the caller leaves that channel unbound and
    /// carries on with the rest.
    fn open(&mut self, kind: BackendKind, physical_pin: u32) -> Result<Self::Pin, PinError>;

    /// Return the GPIO subsystem to its free state.  Called once after
    /// every pin of a direct-kind pass has been stopped.
    fn release(&mut self, kind: BackendKind);

    /// Close any daemon connection.  Shutdown only.
    fn disconnect(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ persistent settings)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`LedSettings`].
///
/// Callers sanitise through [`LedSettings::merge_patch`] before `save`.
pub trait SettingsPort {
    /// Load stored settings.  [`SettingsError::NotFound`] on first run.
    fn load(&self) -> Result<LedSettings, SettingsError>;

    /// Persist settings.
    fn save(&mut self, settings: &LedSettings) -> Result<(), SettingsError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SettingsPort`] operations.
#[derive(Debug)]
pub enum SettingsError {
    /// Nothing stored yet.
    NotFound,
    /// Stored settings failed to deserialise.
    Corrupted(String),
    /// Underlying storage failed.
    Io(std::io::Error),
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "settings not found"),
            Self::Corrupted(msg) => write!(f, "settings corrupted: {}", msg),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
