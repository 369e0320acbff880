/// Clause 21.4.4.1 Table 21.65: SYSINFO optional field flag
/// Bits: 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SysinfoOptFieldFlag {
    EvenMultiframe = 0,
    OddMultiframe = 1,
    DefaultAccessCodeA = 2,
    ExtServicesBroadcast = 3,
}

impl std::convert::TryFrom<u64> for SysinfoOptFieldFlag {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(SysinfoOptFieldFlag::EvenMultiframe),
            1 => Ok(SysinfoOptFieldFlag::OddMultiframe),
            2 => Ok(SysinfoOptFieldFlag::DefaultAccessCodeA),
            3 => Ok(SysinfoOptFieldFlag::ExtServicesBroadcast),
            _ => Err(()),
        }
    }
}

impl SysinfoOptFieldFlag {
    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

impl From<SysinfoOptFieldFlag> for u64 {
    fn from(e: SysinfoOptFieldFlag) -> Self { e.into_raw() }
}

impl core::fmt::Display for SysinfoOptFieldFlag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SysinfoOptFieldFlag::EvenMultiframe => write!(f, "Even multiframe definition for TS mode"),
            SysinfoOptFieldFlag::OddMultiframe => write!(f, "Odd multiframe definition for TS mode"),
            SysinfoOptFieldFlag::DefaultAccessCodeA => write!(f, "Default definition for access code A"),
            SysinfoOptFieldFlag::ExtServicesBroadcast => write!(f, "Extended services broadcast"),
        }
    }
}
