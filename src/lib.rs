//! LedStrip library.
//!
//! Marlin `M150` colour commands → PWM on up to four LED channels of a
//! Raspberry Pi.  The pure-logic modules are exposed for integration
//! testing; direct GPIO access is guarded by the `rpi` feature inside
//! [`drivers::soft_pwm`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
