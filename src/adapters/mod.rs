//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter          | Implements     | Connects to                       |
//! |------------------|----------------|-----------------------------------|
//! | `hardware`       | PinBackend     | rppal GPIO, pi-blaster, pigpiod   |
//! | `settings_file`  | SettingsPort   | JSON file on disk                 |

pub mod hardware;
pub mod settings_file;
