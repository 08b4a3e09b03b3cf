//! M150 parameter parsing (Marlin 1.1 syntax).
//!
//! ```text
//!   M150 R255 U128 B0 W
//!        │    │    │  └─ bare letter → full intensity
//!        │    │    └──── 0..=255 → 0 %
//!        │    └───────── U = green (Marlin RUB order)
//!        └────────────── 255 → 100 %
//! ```
//!
//! Parsing is pure: no I/O, no logging beyond `debug!`.

use log::debug;

use super::channel::Channel;

/// Command prefix this crate reacts to.  Case-sensitive.
pub const M150: &str = "M150";

/// Full intensity on the 0–255 Marlin scale.
const FULL_SCALE: u32 = 255;

/// Per-channel duty cycle (percent) produced by one M150 command.
///
/// Every channel is always present; anything the command does not mention
/// is 0.0 because M150 sets the full colour state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DutyCycles([f32; 4]);

impl DutyCycles {
    pub fn get(&self, channel: Channel) -> f32 {
        self.0[channel.index()]
    }

    pub fn set(&mut self, channel: Channel, duty: f32) {
        self.0[channel.index()] = duty.clamp(0.0, 100.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, f32)> + '_ {
        Channel::ALL.into_iter().map(|ch| (ch, self.get(ch)))
    }
}

/// True when `command` is an M150 this crate should handle.
pub fn is_m150(command: &str) -> bool {
    command.starts_with(M150)
}

/// Convert a 0–255 intensity to a clamped 0–100 duty cycle.
pub fn intensity_to_duty(value: u32) -> f32 {
    (value as f32 / FULL_SCALE as f32 * 100.0).clamp(0.0, 100.0)
}

/// Extract channel duty cycles from an M150 command string.
///
/// Scans left to right for `<letter> *<digits>*` with letter in
/// `RGBUW` (any case).  Missing or unparseable digits mean 255.  A later
/// match for the same channel overrides an earlier one.
pub fn parse_m150(command: &str) -> DutyCycles {
    let mut duties = DutyCycles::default();
    let bytes = command.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let Some(channel) = Channel::from_param(bytes[i] as char) else {
            i += 1;
            continue;
        };
        i += 1;

        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }

        // ASCII digits only, so the slice is valid UTF-8 on byte boundaries.
        let value = command[start..i].parse::<u32>().unwrap_or(FULL_SCALE);
        let duty = intensity_to_duty(value);
        debug!("M150 param {}={} -> {:.1}%", channel, value, duty);
        duties.set(channel, duty);
    }

    duties
}
