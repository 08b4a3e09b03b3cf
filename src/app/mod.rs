//! Application core: pure LED logic, zero I/O.
//!
//! Parsing, channel bookkeeping and the lifecycle live here.  All
//! interaction with hardware and storage happens through the **port
//! traits** in [`ports`], so this layer is fully testable without a Pi.

pub mod channel;
pub mod commands;
pub mod dispatch;
pub mod gcode;
pub mod ports;
pub mod registry;
pub mod service;
