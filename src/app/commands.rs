//! Inbound commands to the LED strip service.
//!
//! These represent what the host pipeline asks for: a queued command line,
//! a settings save, or shutdown.  The
//! [`LedStripService`](super::service::LedStripService) interprets them.

use serde_json::Value;

/// Control-line prefix carrying a JSON settings patch.
pub const SETTINGS_PREFIX: &str = "@settings";
/// Control line requesting shutdown.
pub const SHUTDOWN_LINE: &str = "@shutdown";

/// Commands that the host can send into the service.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// A raw command from the printer command queue.
    Gcode(String),

    /// Persist a settings patch and re-register channels.
    SaveSettings(Value),

    /// Tear down every channel and release backends.
    Shutdown,
}

impl HostCommand {
    /// Parse one line of host input.  Blank lines yield `Ok(None)`.
    pub fn from_line(line: &str) -> Result<Option<Self>, serde_json::Error> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if line == SHUTDOWN_LINE {
            return Ok(Some(Self::Shutdown));
        }
        if let Some(json) = line.strip_prefix(SETTINGS_PREFIX) {
            return serde_json::from_str(json.trim()).map(|v| Some(Self::SaveSettings(v)));
        }
        Ok(Some(Self::Gcode(line.to_owned())))
    }
}
