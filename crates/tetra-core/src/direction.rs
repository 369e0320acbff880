#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum Direction {
    /// Downlink
    Dl,
    /// Uplink
    Ul,
}

impl Direction {
    /// Direction bit as used in keystream initialization values
    #[inline]
    pub fn to_bit(self) -> u32 {
        match self {
            Direction::Dl => 0,
            Direction::Ul => 1,
        }
    }
}
