//! Applies parsed duty cycles to the bound channels.

use log::{debug, warn};

use super::gcode::DutyCycles;
use super::ports::PwmPin;
use super::registry::ChannelRegistry;

/// Write every channel's duty cycle to its pin.
///
/// Unbound channels are skipped.  A failed write is logged and the
/// remaining channels are still written.  Returns the number of successful
/// writes.
pub fn dispatch<P: PwmPin>(duties: &DutyCycles, registry: &mut ChannelRegistry<P>) -> usize {
    let mut written = 0;
    for (channel, duty) in duties.iter() {
        let Some(pin) = registry.pin_mut(channel) else {
            continue;
        };
        match pin.set_duty_cycle(duty) {
            Ok(()) => {
                debug!("channel {} -> {:.1}%", channel, duty);
                written += 1;
            }
            Err(e) => warn!("channel {}: write {:.1}% failed: {}", channel, duty, e),
        }
    }
    written
}
