//! Error types for pin backends.
//!
//! Every backend variant funnels its failures into [`PinError`].  The
//! registry and dispatcher decide how loud each one is; nothing here is
//! allowed to reach the command stream as a panic.

use core::fmt;
use std::io;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Pin backend errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum PinError {
    /// The PWM device node does not exist.
    DeviceMissing(PathBuf),
    /// The PWM device node exists but cannot be opened for writing.
    DeviceNotWritable(PathBuf),
    /// The GPIO subsystem refused the request (missing `/dev/gpiomem`,
    /// permissions, pin already claimed).
    Gpio(String),
    /// No live connection to the PWM daemon.
    DaemonUnavailable,
    /// The daemon answered a command with a negative status code.
    DaemonRejected { cmd: u32, code: i32 },
    /// A write to an already-open device or socket failed.
    Io(io::Error),
}

impl PinError {
    /// Configuration errors mean the operator has to fix the host setup
    /// (device node, permissions, pin assignment) before the channel can
    /// ever work.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::DeviceMissing(_) | Self::DeviceNotWritable(_) | Self::Gpio(_)
        )
    }
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceMissing(path) => write!(f, "{} does not exist", path.display()),
            Self::DeviceNotWritable(path) => write!(f, "{} is not writable", path.display()),
            Self::Gpio(msg) => write!(f, "GPIO: {msg}"),
            Self::DaemonUnavailable => write!(f, "PWM daemon not connected"),
            Self::DaemonRejected { cmd, code } => {
                write!(f, "PWM daemon rejected cmd {cmd} (rc={code})")
            }
            Self::Io(e) => write!(f, "I/O: {e}"),
        }
    }
}

impl std::error::Error for PinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PinError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl embedded_hal::pwm::Error for PinError {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

#[cfg(feature = "rpi")]
impl From<rppal::gpio::Error> for PinError {
    fn from(e: rppal::gpio::Error) -> Self {
        Self::Gpio(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Backend-wide `Result` alias.
pub type Result<T> = core::result::Result<T, PinError>;
