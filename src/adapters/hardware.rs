//! Hardware adapter: bridges the PWM drivers to the [`PinBackend`] port.
//!
//! Owns the process-wide resources (GPIO handle, pigpiod connection) and
//! hands out [`LedPin`]s.  This is the only module that decides which driver
//! serves a channel.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use log::{debug, info};

use crate::app::ports::{PinBackend, PwmPin};
use crate::config::{BackendKind, DEFAULT_PIBLASTER_DEVICE, DEFAULT_PIGPIOD_ADDR, LedSettings};
use crate::drivers::pi_blaster::PiBlasterPin;
use crate::drivers::pigpiod::{PigpiodClient, PigpiodPin, SharedPigpiod};
use crate::drivers::soft_pwm::{self, Gpio, SoftPwmPin};
use crate::error::PinError;

/// `embedded-hal` duty resolution: 1000 = 100.0 %.
const HAL_MAX_DUTY: u16 = 1000;

// ── LedPin ────────────────────────────────────────────────────

/// A pin from any backend.
pub enum LedPin {
    Soft(SoftPwmPin),
    Blaster(PiBlasterPin),
    Daemon(PigpiodPin),
}

impl LedPin {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Soft(_) => BackendKind::SoftPwm,
            Self::Blaster(_) => BackendKind::PiBlaster,
            Self::Daemon(_) => BackendKind::Pigpiod,
        }
    }

    fn inner(&mut self) -> &mut dyn PwmPin {
        match self {
            Self::Soft(p) => p,
            Self::Blaster(p) => p,
            Self::Daemon(p) => p,
        }
    }
}

impl PwmPin for LedPin {
    fn start(&mut self, duty: f32) -> Result<(), PinError> {
        self.inner().start(duty)
    }

    fn stop(&mut self) -> Result<(), PinError> {
        self.inner().stop()
    }

    fn set_duty_cycle(&mut self, duty: f32) -> Result<(), PinError> {
        self.inner().set_duty_cycle(duty)
    }

    fn duty_cycle(&self) -> f32 {
        match self {
            Self::Soft(p) => p.duty_cycle(),
            Self::Blaster(p) => p.duty_cycle(),
            Self::Daemon(p) => p.duty_cycle(),
        }
    }
}

impl ErrorType for LedPin {
    type Error = PinError;
}

impl SetDutyCycle for LedPin {
    fn max_duty_cycle(&self) -> u16 {
        HAL_MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let percent = f32::from(duty.min(HAL_MAX_DUTY)) * 100.0 / f32::from(HAL_MAX_DUTY);
        PwmPin::set_duty_cycle(self, percent)
    }
}

// ── HardwareBackend ───────────────────────────────────────────

/// Concrete backend that serves all three driver kinds.
pub struct HardwareBackend {
    piblaster_device: PathBuf,
    pigpiod_addr: String,
    gpio: Option<Gpio>,
    pigpiod: Option<SharedPigpiod>,
}

impl HardwareBackend {
    pub fn new() -> Self {
        Self {
            piblaster_device: PathBuf::from(DEFAULT_PIBLASTER_DEVICE),
            pigpiod_addr: DEFAULT_PIGPIOD_ADDR.to_owned(),
            gpio: None,
            pigpiod: None,
        }
    }

    /// Whether the GPIO subsystem is currently held.
    pub fn holds_gpio(&self) -> bool {
        self.gpio.is_some()
    }

    pub fn daemon_connected(&self) -> bool {
        self.pigpiod
            .as_ref()
            .is_some_and(|c| c.borrow().is_connected())
    }

    fn gpio(&mut self) -> Result<&Gpio, PinError> {
        if self.gpio.is_none() {
            self.gpio = Some(soft_pwm::open_gpio()?);
        }
        self.gpio
            .as_ref()
            .ok_or_else(|| PinError::Gpio("GPIO handle unavailable".into()))
    }

    /// Shared daemon client, reconnecting if the link dropped since the last
    /// pass.
    fn daemon(&mut self) -> SharedPigpiod {
        let addr = &self.pigpiod_addr;
        let client = self
            .pigpiod
            .get_or_insert_with(|| Rc::new(RefCell::new(PigpiodClient::connect(addr))));
        client.borrow_mut().reconnect();
        Rc::clone(client)
    }
}

impl Default for HardwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PinBackend for HardwareBackend {
    type Pin = LedPin;

    fn configure(&mut self, settings: &LedSettings) {
        self.piblaster_device = PathBuf::from(&settings.piblaster_device);
        if settings.pigpiod_addr != self.pigpiod_addr {
            if let Some(old) = self.pigpiod.take() {
                old.borrow_mut().close();
            }
            self.pigpiod_addr.clone_from(&settings.pigpiod_addr);
        }
    }

    fn open(&mut self, kind: BackendKind, physical_pin: u32) -> Result<LedPin, PinError> {
        debug!("hardware: open {:?} pin {}", kind, physical_pin);
        match kind {
            BackendKind::SoftPwm => {
                let gpio = self.gpio()?;
                SoftPwmPin::open(gpio, physical_pin).map(LedPin::Soft)
            }
            BackendKind::PiBlaster => {
                PiBlasterPin::open(&self.piblaster_device, physical_pin).map(LedPin::Blaster)
            }
            BackendKind::Pigpiod => {
                let client = self.daemon();
                PigpiodPin::open(&client, physical_pin).map(LedPin::Daemon)
            }
        }
    }

    fn release(&mut self, kind: BackendKind) {
        if self.gpio.take().is_some() {
            info!("hardware: GPIO released after {:?} pass", kind);
        }
    }

    fn disconnect(&mut self) {
        if let Some(client) = self.pigpiod.take() {
            client.borrow_mut().close();
        }
    }
}
