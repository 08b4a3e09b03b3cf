//! LED strip settings
//!
//! Pin assignments and backend selection.  Persisted by whatever
//! [`SettingsPort`](crate::app::ports::SettingsPort) the host supplies;
//! updates arrive as loosely-typed JSON patches and are sanitised here
//! before they are stored.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::channel::Channel;

pub const DEFAULT_PIBLASTER_DEVICE: &str = "/dev/pi-blaster";
pub const DEFAULT_PIGPIOD_ADDR: &str = "127.0.0.1:8888";

/// Which PWM mechanism drives the channels for a registration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Software PWM on the GPIO header (`/dev/gpiomem`).
    SoftPwm,
    /// The pi-blaster device node.
    PiBlaster,
    /// The pigpiod daemon over its socket interface.
    Pigpiod,
}

impl BackendKind {
    /// Direct kinds hold the GPIO subsystem and must release it on teardown.
    pub fn is_direct(self) -> bool {
        !matches!(self, Self::Pigpiod)
    }
}

/// Persistent LED strip configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedSettings {
    // --- Channel pins (physical header position, 0 = disabled) ---
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub w: u32,

    // --- Backend selection ---
    /// Drive channels through the pi-blaster device node.
    pub piblaster: bool,
    /// Drive channels through pigpiod.  Takes precedence over `piblaster`.
    pub pigpiod: bool,
    /// Start registered channels at full brightness (otherwise off).
    pub on_startup: bool,

    // --- Backend endpoints ---
    pub piblaster_device: String,
    pub pigpiod_addr: String,
}

impl Default for LedSettings {
    fn default() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            w: 0,
            piblaster: false,
            pigpiod: false,
            on_startup: true,
            piblaster_device: DEFAULT_PIBLASTER_DEVICE.into(),
            pigpiod_addr: DEFAULT_PIGPIOD_ADDR.into(),
        }
    }
}

impl LedSettings {
    /// Configured physical pin for `channel`; `None` when disabled.
    pub fn pin(&self, channel: Channel) -> Option<u32> {
        let pin = match channel {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
            Channel::W => self.w,
        };
        (pin != 0).then_some(pin)
    }

    fn pin_mut(&mut self, channel: Channel) -> &mut u32 {
        match channel {
            Channel::R => &mut self.r,
            Channel::G => &mut self.g,
            Channel::B => &mut self.b,
            Channel::W => &mut self.w,
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        if self.pigpiod {
            BackendKind::Pigpiod
        } else if self.piblaster {
            BackendKind::PiBlaster
        } else {
            BackendKind::SoftPwm
        }
    }

    /// Merge a settings patch from the host.
    ///
    /// Pin values are coerced to non-negative integers; values that cannot
    /// be coerced are dropped with a warning and the stored value is kept.
    /// Unknown keys are ignored.
    pub fn merge_patch(&mut self, patch: &Value) {
        let Some(obj) = patch.as_object() else {
            warn!("settings patch is not an object, ignored");
            return;
        };

        for channel in Channel::ALL {
            if let Some(v) = obj.get(channel.key()) {
                match sanitize_pin(v) {
                    Some(pin) => *self.pin_mut(channel) = pin,
                    None => warn!(
                        "settings: {}={} is not a pin number, ignored",
                        channel.key(),
                        v
                    ),
                }
            }
        }

        for (key, slot) in [
            ("piblaster", &mut self.piblaster),
            ("pigpiod", &mut self.pigpiod),
            ("on_startup", &mut self.on_startup),
        ] {
            match obj.get(key) {
                Some(Value::Bool(b)) => *slot = *b,
                Some(other) => warn!("settings: {}={} is not a boolean, ignored", key, other),
                None => {}
            }
        }

        for (key, slot) in [
            ("piblaster_device", &mut self.piblaster_device),
            ("pigpiod_addr", &mut self.pigpiod_addr),
        ] {
            match obj.get(key) {
                Some(Value::String(s)) if !s.is_empty() => slot.clone_from(s),
                Some(other) => {
                    warn!("settings: {}={} is not a non-empty string, ignored", key, other);
                }
                None => {}
            }
        }
    }
}

/// Coerce a JSON value to a non-negative pin number.
///
/// Integers clamp at 0, floats truncate, numeric strings are parsed, `null`
/// means disabled.
fn sanitize_pin(v: &Value) -> Option<u32> {
    let n: i64 = match v {
        Value::Null => 0,
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0
            } else {
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))?
            }
        }
        _ => return None,
    };
    Some(n.clamp(0, i64::from(u32::MAX)) as u32)
}
