//! Channel identities.

use core::fmt;

/// One colour channel of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    R,
    G,
    B,
    W,
}

impl Channel {
    /// Setup order.  Channels are independent, so the order only affects
    /// log output.
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::W];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Settings key for this channel's pin.
    pub const fn key(self) -> &'static str {
        match self {
            Self::R => "r",
            Self::G => "g",
            Self::B => "b",
            Self::W => "w",
        }
    }

    /// Channel addressed by an M150 parameter letter.  `U` is Marlin's
    /// historical alias for green.
    pub fn from_param(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'r' => Some(Self::R),
            'g' | 'u' => Some(Self::G),
            'b' => Some(Self::B),
            'w' => Some(Self::W),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
