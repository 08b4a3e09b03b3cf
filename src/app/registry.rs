//! Channel registry: binds channels to started pins.
//!
//! A slot is either empty or holds a started pin together with the
//! physical pin number it was opened on; there is no half-bound state.
//! One registry per process: the GPIO header and the PWM daemon are
//! process-wide resources.

use heapless::Vec;
use log::{debug, error, info, warn};

use crate::config::{BackendKind, LedSettings};

use super::channel::Channel;
use super::ports::{PinBackend, PwmPin};

/// A channel that owns a started pin.
#[derive(Debug)]
pub struct BoundChannel<P> {
    pub pin_number: u32,
    pub pin: P,
}

/// Set of channels returned by [`ChannelRegistry::register_all`].
pub type ChannelSet = Vec<Channel, 4>;

pub struct ChannelRegistry<P> {
    slots: [Option<BoundChannel<P>>; 4],
    /// Backend kind of the current pass; `None` when torn down.
    active: Option<BackendKind>,
}

impl<P: PwmPin> ChannelRegistry<P> {
    pub fn new() -> Self {
        Self {
            slots: [None, None, None, None],
            active: None,
        }
    }

    /// Bind every configured channel through `backend`.
    ///
    /// Tears down an existing pass first, so repeated calls never
    /// double-bind a hardware pin.  Per-channel failures are logged and
    /// the channel stays unbound.
    pub fn register_all<B>(&mut self, settings: &LedSettings, backend: &mut B) -> ChannelSet
    where
        B: PinBackend<Pin = P>,
    {
        if self.active.is_some() {
            self.unregister_all(backend);
        }

        backend.configure(settings);
        let kind = settings.backend_kind();
        let start_duty = if settings.on_startup { 100.0 } else { 0.0 };
        self.active = Some(kind);
        debug!("register_all: backend={:?} start={}%", kind, start_duty);

        let mut bound = ChannelSet::new();
        for channel in Channel::ALL {
            let Some(pin_number) = settings.pin(channel) else {
                debug!("channel {}: no pin configured", channel);
                continue;
            };

            let mut pin = match backend.open(kind, pin_number) {
                Ok(pin) => pin,
                Err(e) => {
                    let what = if e.is_config_error() { "configuration error" } else { "unavailable" };
                    error!("channel {}: pin {} {}: {}", channel, pin_number, what, e);
                    continue;
                }
            };

            if let Err(e) = pin.start(start_duty) {
                error!("channel {}: pin {} failed to start: {}", channel, pin_number, e);
                continue;
            }

            info!("channel {} bound to pin {} ({:?})", channel, pin_number, kind);
            self.slots[channel.index()] = Some(BoundChannel { pin_number, pin });
            let pushed = bound.push(channel);
            debug_assert!(pushed.is_ok(), "four channels fit a four-slot set");
        }
        bound
    }

    /// Stop and unbind every channel, then release the GPIO subsystem if
    /// the pass used a direct backend.  Safe to call when nothing is bound.
    pub fn unregister_all<B>(&mut self, backend: &mut B)
    where
        B: PinBackend<Pin = P>,
    {
        debug!("unregister_all: backend={:?}", self.active);
        for channel in Channel::ALL {
            let Some(mut bound) = self.slots[channel.index()].take() else {
                continue;
            };
            if let Err(e) = bound.pin.set_duty_cycle(0.0) {
                warn!("channel {}: zeroing pin {} failed: {}", channel, bound.pin_number, e);
            }
            if let Err(e) = bound.pin.stop() {
                warn!("channel {}: stopping pin {} failed: {}", channel, bound.pin_number, e);
            }
        }

        if let Some(kind) = self.active.take() {
            if kind.is_direct() {
                backend.release(kind);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_bound(&self, channel: Channel) -> bool {
        self.slots[channel.index()].is_some()
    }

    /// Physical pin a bound channel was opened on.
    pub fn pin_number(&self, channel: Channel) -> Option<u32> {
        self.slots[channel.index()].as_ref().map(|b| b.pin_number)
    }

    /// Mirrored duty cycle of a bound channel.
    pub fn duty_cycle(&self, channel: Channel) -> Option<f32> {
        self.slots[channel.index()].as_ref().map(|b| b.pin.duty_cycle())
    }

    pub fn bound(&self) -> ChannelSet {
        Channel::ALL
            .into_iter()
            .filter(|ch| self.is_bound(*ch))
            .collect()
    }

    pub fn active_backend(&self) -> Option<BackendKind> {
        self.active
    }

    pub(crate) fn pin_mut(&mut self, channel: Channel) -> Option<&mut P> {
        self.slots[channel.index()].as_mut().map(|b| &mut b.pin)
    }
}

impl<P: PwmPin> Default for ChannelRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
