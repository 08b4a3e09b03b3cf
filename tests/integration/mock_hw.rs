//! Mock pin backend for integration tests.
//!
//! Records every pin call in a shared log so tests can assert on the full
//! command history without touching real GPIO or device nodes.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use ledstrip::app::ports::{PinBackend, PwmPin, SettingsError, SettingsPort};
use ledstrip::config::{BackendKind, LedSettings};
use ledstrip::error::PinError;

// ── Pin call record ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PinCall {
    Open { kind: BackendKind, pin: u32 },
    Start { pin: u32, duty: f32 },
    Stop { pin: u32 },
    Release(BackendKind),
    Disconnect,
}

pub type CallLog = Rc<RefCell<Vec<PinCall>>>;
pub type LiveSet = Rc<RefCell<HashSet<u32>>>;

// ── MockPin ───────────────────────────────────────────────────

pub struct MockPin {
    pin: u32,
    duty: f32,
    started: bool,
    fail_after_start: bool,
    log: CallLog,
    live: LiveSet,
}

impl PwmPin for MockPin {
    fn start(&mut self, duty: f32) -> Result<(), PinError> {
        if self.started && self.fail_after_start {
            return Err(PinError::Io(std::io::Error::other("mock write failure")));
        }
        self.log.borrow_mut().push(PinCall::Start { pin: self.pin, duty });
        self.duty = duty;
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PinError> {
        self.log.borrow_mut().push(PinCall::Stop { pin: self.pin });
        self.live.borrow_mut().remove(&self.pin);
        self.duty = 0.0;
        Ok(())
    }

    fn duty_cycle(&self) -> f32 {
        self.duty
    }
}

// ── MockBackend ───────────────────────────────────────────────

pub struct MockBackend {
    pub log: CallLog,
    /// Pins whose `open` fails with [`PinError::DaemonUnavailable`].
    pub unavailable: HashSet<u32>,
    /// Pins whose `open` fails with a missing-device configuration error.
    pub missing_device: HashSet<u32>,
    /// Pins that open fine but whose writes fail after the initial start.
    pub failing_writes: HashSet<u32>,
    /// Pins currently open (opened and not yet stopped).
    pub live: LiveSet,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            unavailable: HashSet::new(),
            missing_device: HashSet::new(),
            failing_writes: HashSet::new(),
            live: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    pub fn calls(&self) -> Vec<PinCall> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// Last duty written to `pin`, if any.
    pub fn last_duty(&self, pin: u32) -> Option<f32> {
        self.log.borrow().iter().rev().find_map(|c| match c {
            PinCall::Start { pin: p, duty } if *p == pin => Some(*duty),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&PinCall) -> bool) -> usize {
        self.log.borrow().iter().filter(|c| pred(c)).count()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PinBackend for MockBackend {
    type Pin = MockPin;

    fn open(&mut self, kind: BackendKind, pin: u32) -> Result<MockPin, PinError> {
        if self.unavailable.contains(&pin) {
            return Err(PinError::DaemonUnavailable);
        }
        if self.missing_device.contains(&pin) {
            return Err(PinError::DeviceMissing("/dev/pi-blaster".into()));
        }
        assert!(
            self.live.borrow_mut().insert(pin),
            "pin {pin} opened twice without teardown"
        );
        self.log.borrow_mut().push(PinCall::Open { kind, pin });
        Ok(MockPin {
            pin,
            duty: 0.0,
            started: false,
            fail_after_start: self.failing_writes.contains(&pin),
            log: Rc::clone(&self.log),
            live: Rc::clone(&self.live),
        })
    }

    fn release(&mut self, kind: BackendKind) {
        self.log.borrow_mut().push(PinCall::Release(kind));
    }

    fn disconnect(&mut self) {
        self.log.borrow_mut().push(PinCall::Disconnect);
    }
}

// ── MemSettings ───────────────────────────────────────────────

pub struct MemSettings {
    pub stored: Option<LedSettings>,
    pub saves: usize,
    pub fail_save: bool,
}

#[allow(dead_code)]
impl MemSettings {
    pub fn new() -> Self {
        Self {
            stored: None,
            saves: 0,
            fail_save: false,
        }
    }

    pub fn with(settings: LedSettings) -> Self {
        Self {
            stored: Some(settings),
            ..Self::new()
        }
    }
}

impl Default for MemSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsPort for MemSettings {
    fn load(&self) -> Result<LedSettings, SettingsError> {
        self.stored.clone().ok_or(SettingsError::NotFound)
    }

    fn save(&mut self, settings: &LedSettings) -> Result<(), SettingsError> {
        if self.fail_save {
            return Err(SettingsError::Io(std::io::Error::other("disk full")));
        }
        self.saves += 1;
        self.stored = Some(settings.clone());
        Ok(())
    }
}

/// Settings with the given physical pins on r, g, b, w.
#[allow(dead_code)]
pub fn pins(r: u32, g: u32, b: u32, w: u32) -> LedSettings {
    LedSettings {
        r,
        g,
        b,
        w,
        ..LedSettings::default()
    }
}
