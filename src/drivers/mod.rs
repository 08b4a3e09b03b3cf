//! PWM pin drivers, one per backend kind.

pub mod pi_blaster;
pub mod pigpiod;
pub mod soft_pwm;
