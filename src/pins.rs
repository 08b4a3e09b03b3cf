//! Raspberry Pi 40-pin header → BCM GPIO mapping.
//!
//! Settings name pins by their physical header position (the numbers printed
//! on pinout diagrams).  Backends that address the SoC directly need the BCM
//! GPIO number instead; this table is the single source of truth for the
//! translation.

/// Highest physical header position.
pub const HEADER_PINS: u32 = 40;

/// Software PWM frequency for direct GPIO channels.
pub const SOFT_PWM_FREQ_HZ: f64 = 100.0;

/// pigpiod PWM range.  1000 steps = 0.1 % resolution.
pub const DAEMON_PWM_RANGE: u32 = 1000;

/// Index = physical header position, value = BCM GPIO.  Power, ground and
/// index 0 carry no mapping.
const BOARD_TO_BCM: [Option<u8>; HEADER_PINS as usize + 1] = [
    None,     // 0  (unused)
    None,     // 1  3V3
    None,     // 2  5V
    Some(2),  // 3  SDA1
    None,     // 4  5V
    Some(3),  // 5  SCL1
    None,     // 6  GND
    Some(4),  // 7  GPCLK0
    Some(14), // 8  TXD
    None,     // 9  GND
    Some(15), // 10 RXD
    Some(17), // 11
    Some(18), // 12 PCM_CLK / PWM0
    Some(27), // 13
    None,     // 14 GND
    Some(22), // 15
    Some(23), // 16
    None,     // 17 3V3
    Some(24), // 18
    Some(10), // 19 MOSI
    None,     // 20 GND
    Some(9),  // 21 MISO
    Some(25), // 22
    Some(11), // 23 SCLK
    Some(8),  // 24 CE0
    None,     // 25 GND
    Some(7),  // 26 CE1
    Some(0),  // 27 ID_SD
    Some(1),  // 28 ID_SC
    Some(5),  // 29
    None,     // 30 GND
    Some(6),  // 31
    Some(12), // 32 PWM0
    Some(13), // 33 PWM1
    None,     // 34 GND
    Some(19), // 35 PWM1
    Some(16), // 36
    Some(26), // 37
    Some(20), // 38
    None,     // 39 GND
    Some(21), // 40
];

/// BCM GPIO for a physical header position, if that position carries one.
pub fn board_to_bcm(physical: u32) -> Option<u32> {
    BOARD_TO_BCM
        .get(physical as usize)
        .copied()
        .flatten()
        .map(u32::from)
}

/// Logical pin id for `physical`.  Unmapped positions pass through verbatim.
pub fn logical_pin(physical: u32) -> u32 {
    board_to_bcm(physical).unwrap_or(physical)
}
