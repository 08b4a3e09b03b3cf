//! pi-blaster device-node driver.
//!
//! pi-blaster reads `"<gpio>=<fraction>\n"` lines from a FIFO
//! (`/dev/pi-blaster`).  Every write opens the node, writes one line and
//! closes it again, so a restarted daemon is picked up without reconnecting.
//! The pin number is written verbatim.
//!
//! The node is opened non-blocking: with no daemon reading the FIFO the open
//! fails with `ENXIO` instead of stalling the command stream.

use std::fs::File;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;
use rustix::fs::{Access, Mode, OFlags};

use crate::app::ports::PwmPin;
use crate::error::PinError;

pub struct PiBlasterPin {
    dev: PathBuf,
    pin: u32,
    duty: f32,
}

impl PiBlasterPin {
    /// Bind `pin` on the device node at `dev`.
    ///
    /// Fails with a configuration error when the node is missing or not
    /// writable, before anything is written.
    pub fn open(dev: impl Into<PathBuf>, pin: u32) -> Result<Self, PinError> {
        let dev = dev.into();
        check_device(&dev)?;
        Ok(Self { dev, pin, duty: 0.0 })
    }

    fn write_to_dev(&self, cmd: &str) -> Result<(), PinError> {
        check_device(&self.dev)?;
        let flags = OFlags::WRONLY | OFlags::NONBLOCK | OFlags::TRUNC | OFlags::CLOEXEC;
        let fd = rustix::fs::open(&self.dev, flags, Mode::empty())
            .map_err(|e| classify(&self.dev, e.into()))?;
        let mut f = File::from(fd);
        writeln!(f, "{cmd}")?;
        debug!("pi-blaster: {}", cmd);
        Ok(())
    }
}

impl PwmPin for PiBlasterPin {
    fn start(&mut self, duty: f32) -> Result<(), PinError> {
        let duty = duty.clamp(0.0, 100.0);
        self.write_to_dev(&format!("{}={}", self.pin, format_fraction(duty)))?;
        self.duty = duty;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PinError> {
        self.write_to_dev(&format!("{}=0", self.pin))?;
        self.duty = 0.0;
        Ok(())
    }

    fn duty_cycle(&self) -> f32 {
        self.duty
    }
}

fn check_device(dev: &Path) -> Result<(), PinError> {
    let meta = match std::fs::metadata(dev) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PinError::DeviceMissing(dev.to_path_buf()));
        }
        Err(e) => return Err(PinError::Io(e)),
    };
    if meta.permissions().readonly() {
        return Err(PinError::DeviceNotWritable(dev.to_path_buf()));
    }
    // Mode bits alone miss nodes owned by another user.
    rustix::fs::access(dev, Access::WRITE_OK).map_err(|e| classify(dev, e.into()))
}

fn classify(dev: &Path, e: io::Error) -> PinError {
    match e.kind() {
        ErrorKind::NotFound => PinError::DeviceMissing(dev.to_path_buf()),
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => {
            PinError::DeviceNotWritable(dev.to_path_buf())
        }
        _ => PinError::Io(e),
    }
}

/// pi-blaster fraction: one decimal, trailing zeros and dot trimmed.
fn format_fraction(duty: f32) -> String {
    let s = format!("{:.1}", duty / 100.0);
    s.trim_end_matches('0').trim_end_matches('.').to_owned()
}
