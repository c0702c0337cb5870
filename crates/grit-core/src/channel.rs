//! Output channel identifiers.

/// One of the two output channels.
///
/// Left and right are processed independently; nothing in the engine relies
/// on their relative order within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Channel index 0.
    Left,
    /// Channel index 1.
    Right,
}

impl Channel {
    /// Number of channels.
    pub const COUNT: usize = 2;

    /// All channels in index order.
    pub const ALL: [Channel; Self::COUNT] = [Channel::Left, Channel::Right];

    /// Array index of this channel.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }

    /// Channel for an array index, if in range.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Channel::Left),
            1 => Some(Channel::Right),
            _ => None,
        }
    }

    /// Lowercase name, as used in config files and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Left => "left",
            Channel::Right => "right",
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_index(channel.index()), Some(channel));
        }
        assert_eq!(Channel::from_index(2), None);
    }
}
