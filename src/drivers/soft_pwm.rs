//! Direct GPIO software PWM driver.
//!
//! Drives a header pin with rppal's software PWM at
//! [`SOFT_PWM_FREQ_HZ`](crate::pins::SOFT_PWM_FREQ_HZ).  Settings name the
//! physical header position; it is translated to BCM here.
//!
//! ## Dual-target design
//!
//! With the `rpi` feature: real GPIO through `/dev/gpiomem`.
//! Without it: tracks state in-memory only.

use log::debug;

use crate::app::ports::PwmPin;
use crate::error::PinError;
use crate::pins;

/// Process-wide GPIO handle.  Dropping it (and every pin opened from it)
/// returns the header to its free state.
#[cfg(feature = "rpi")]
pub type Gpio = rppal::gpio::Gpio;

#[cfg(not(feature = "rpi"))]
#[derive(Debug, Clone, Default)]
pub struct Gpio;

/// Acquire the GPIO subsystem.  Fails when `/dev/gpiomem` is missing or
/// not accessible.
#[cfg(feature = "rpi")]
pub fn open_gpio() -> Result<Gpio, PinError> {
    Ok(rppal::gpio::Gpio::new()?)
}

#[cfg(not(feature = "rpi"))]
pub fn open_gpio() -> Result<Gpio, PinError> {
    log::info!("soft_pwm(sim): GPIO access simulated");
    Ok(Gpio)
}

pub struct SoftPwmPin {
    bcm: u32,
    duty: f32,
    #[cfg(feature = "rpi")]
    pin: rppal::gpio::OutputPin,
}

impl SoftPwmPin {
    /// Configure the pin as an output and drive it high.  PWM begins on the
    /// first [`start`](PwmPin::start).
    #[cfg(feature = "rpi")]
    pub fn open(gpio: &Gpio, physical: u32) -> Result<Self, PinError> {
        let bcm = pins::logical_pin(physical);
        let line = u8::try_from(bcm)
            .map_err(|_| PinError::Gpio(format!("pin {physical} has no GPIO line")))?;
        let pin = gpio.get(line)?.into_output_high();
        debug!("soft_pwm: header {} -> BCM {} output high", physical, bcm);
        Ok(Self { bcm, duty: 100.0, pin })
    }

    #[cfg(not(feature = "rpi"))]
    pub fn open(_gpio: &Gpio, physical: u32) -> Result<Self, PinError> {
        let bcm = pins::logical_pin(physical);
        debug!("soft_pwm(sim): header {} -> BCM {} output high", physical, bcm);
        Ok(Self { bcm, duty: 100.0 })
    }

    pub fn bcm(&self) -> u32 {
        self.bcm
    }

    #[cfg(feature = "rpi")]
    fn set_duty_hw(&mut self, duty: f32) -> Result<(), PinError> {
        self.pin
            .set_pwm_frequency(pins::SOFT_PWM_FREQ_HZ, f64::from(duty) / 100.0)?;
        Ok(())
    }

    #[cfg(not(feature = "rpi"))]
    fn set_duty_hw(&mut self, _duty: f32) -> Result<(), PinError> {
        Ok(())
    }

    #[cfg(feature = "rpi")]
    fn idle_hw(&mut self) -> Result<(), PinError> {
        self.pin.clear_pwm()?;
        self.pin.set_low();
        Ok(())
    }

    #[cfg(not(feature = "rpi"))]
    fn idle_hw(&mut self) -> Result<(), PinError> {
        Ok(())
    }
}

impl PwmPin for SoftPwmPin {
    fn start(&mut self, duty: f32) -> Result<(), PinError> {
        let duty = duty.clamp(0.0, 100.0);
        self.set_duty_hw(duty)?;
        self.duty = duty;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PinError> {
        self.duty = 0.0;
        self.idle_hw()
    }

    fn duty_cycle(&self) -> f32 {
        self.duty
    }
}
