//! Fuzz target: M150 parameter parser
//!
//! Feeds arbitrary bytes through `is_m150` / `parse_m150` and verifies:
//! - No panics on any input, including invalid UTF-8 and huge numbers
//! - Every parsed duty cycle is within [0, 100]
//!
//! cargo fuzz run fuzz_m150_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use ledstrip::app::gcode::{is_m150, parse_m150};

fuzz_target!(|data: &[u8]| {
    let cmd = String::from_utf8_lossy(data);
    let _ = is_m150(&cmd);

    let duties = parse_m150(&cmd);
    for (channel, duty) in duties.iter() {
        assert!(
            (0.0..=100.0).contains(&duty),
            "channel {channel} duty {duty} out of range"
        );
    }
});
