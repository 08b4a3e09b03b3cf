//! pigpiod daemon driver.
//!
//! Talks to pigpiod over its socket interface.  Each request is four
//! little-endian `u32` words `cmd, p1, p2, p3`; the daemon answers with the
//! same 16 bytes, the last word replaced by a signed status (negative =
//! error).
//!
//! One [`PigpiodClient`] is shared by every daemon pin.  When the
//! connection drops, writes become silent no-ops until the next
//! registration pass reconnects.

use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::PwmPin;
use crate::error::PinError;
use crate::pins;

// ── Socket command numbers ────────────────────────────────────

/// Set GPIO mode.
pub const CMD_MODES: u32 = 0;
/// Start PWM with the given duty cycle (in PWM range units).
pub const CMD_PWM: u32 = 5;
/// Set PWM range.
pub const CMD_PRS: u32 = 6;

pub const MODE_OUTPUT: u32 = 1;

/// Bound on connect, read and write so a wedged daemon cannot stall the
/// command stream.
const IO_TIMEOUT: Duration = Duration::from_secs(1);

pub struct PigpiodClient {
    addr: String,
    stream: Option<TcpStream>,
}

/// Connection shared by all pins of a daemon pass (single thread).
pub type SharedPigpiod = Rc<RefCell<PigpiodClient>>;

impl PigpiodClient {
    /// Create a client and attempt the first connection.
    pub fn connect(addr: &str) -> Self {
        let mut client = Self {
            addr: addr.to_owned(),
            stream: None,
        };
        client.reconnect();
        client
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// (Re)establish the connection if it is down.  Returns the link state.
    pub fn reconnect(&mut self) -> bool {
        if self.stream.is_some() {
            return true;
        }
        match self.open_stream() {
            Ok(stream) => {
                info!("pigpiod: connected to {}", self.addr);
                self.stream = Some(stream);
                true
            }
            Err(e) => {
                warn!("pigpiod: connect to {} failed: {}", self.addr, e);
                false
            }
        }
    }

    fn open_stream(&self) -> std::io::Result<TcpStream> {
        let mut last_err = None;
        for addr in self.addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, IO_TIMEOUT) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    stream.set_read_timeout(Some(IO_TIMEOUT))?;
                    stream.set_write_timeout(Some(IO_TIMEOUT))?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "address did not resolve")
        }))
    }

    /// Send one command and return the daemon's non-negative status.
    ///
    /// A socket error drops the connection.
    pub fn command(&mut self, cmd: u32, p1: u32, p2: u32) -> Result<u32, PinError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(PinError::DaemonUnavailable);
        };

        let mut req = [0u8; 16];
        req[0..4].copy_from_slice(&cmd.to_le_bytes());
        req[4..8].copy_from_slice(&p1.to_le_bytes());
        req[8..12].copy_from_slice(&p2.to_le_bytes());

        let mut resp = [0u8; 16];
        if let Err(e) = stream.write_all(&req).and_then(|()| stream.read_exact(&mut resp)) {
            warn!("pigpiod: link lost ({}), dropping connection", e);
            self.stream = None;
            return Err(PinError::Io(e));
        }

        let code = i32::from_le_bytes([resp[12], resp[13], resp[14], resp[15]]);
        if code < 0 {
            return Err(PinError::DaemonRejected { cmd, code });
        }
        Ok(code as u32)
    }

    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            info!("pigpiod: disconnected from {}", self.addr);
        }
    }
}

pub struct PigpiodPin {
    client: SharedPigpiod,
    gpio: u32,
    duty: f32,
}

impl PigpiodPin {
    /// Translate `physical` to BCM and configure it as a PWM output.
    ///
    /// Returns [`PinError::DaemonUnavailable`] when the daemon link is down.
    pub fn open(client: &SharedPigpiod, physical: u32) -> Result<Self, PinError> {
        let gpio = pins::logical_pin(physical);
        {
            let mut c = client.borrow_mut();
            if !c.is_connected() {
                return Err(PinError::DaemonUnavailable);
            }
            c.command(CMD_MODES, gpio, MODE_OUTPUT)?;
            c.command(CMD_PRS, gpio, pins::DAEMON_PWM_RANGE)?;
        }
        debug!("pigpiod: header {} -> BCM {} configured", physical, gpio);
        Ok(Self {
            client: Rc::clone(client),
            gpio,
            duty: 0.0,
        })
    }

    pub fn gpio(&self) -> u32 {
        self.gpio
    }
}

impl PwmPin for PigpiodPin {
    fn start(&mut self, duty: f32) -> Result<(), PinError> {
        let duty = duty.clamp(0.0, 100.0);
        let mut c = self.client.borrow_mut();
        if !c.is_connected() {
            debug!("pigpiod: BCM {} {:.1}% dropped, not connected", self.gpio, duty);
            return Ok(());
        }
        let level = (duty / 100.0 * pins::DAEMON_PWM_RANGE as f32).round() as u32;
        c.command(CMD_PWM, self.gpio, level)?;
        self.duty = duty;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PinError> {
        self.start(0.0)
    }

    fn duty_cycle(&self) -> f32 {
        self.duty
    }
}
