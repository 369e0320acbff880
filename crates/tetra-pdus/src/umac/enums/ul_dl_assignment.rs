/// Clause 21.5.2 Up/downlink assigned
/// Bits: 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UlDlAssignment {
    /// Augmented channel allocation follows
    Augmented = 0,
    Dl = 1,
    Ul = 2,
    Both = 3,
}

impl std::convert::TryFrom<u64> for UlDlAssignment {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(UlDlAssignment::Augmented),
            1 => Ok(UlDlAssignment::Dl),
            2 => Ok(UlDlAssignment::Ul),
            3 => Ok(UlDlAssignment::Both),
            _ => Err(()),
        }
    }
}

impl UlDlAssignment {
    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

impl From<UlDlAssignment> for u64 {
    fn from(e: UlDlAssignment) -> Self { e.into_raw() }
}

impl core::fmt::Display for UlDlAssignment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UlDlAssignment::Augmented => write!(f, "Augmented"),
            UlDlAssignment::Dl => write!(f, "Downlink only"),
            UlDlAssignment::Ul => write!(f, "Uplink only"),
            UlDlAssignment::Both => write!(f, "Uplink + Downlink"),
        }
    }
}
