/// Clause 21.4.4.0 Table 21.64: Broadcast PDU subtypes
/// Bits: 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BroadcastType {
    Sysinfo = 0,
    AccessDefine = 1,
    SysinfoDa = 2,
}

impl std::convert::TryFrom<u64> for BroadcastType {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(BroadcastType::Sysinfo),
            1 => Ok(BroadcastType::AccessDefine),
            2 => Ok(BroadcastType::SysinfoDa),
            _ => Err(()),
        }
    }
}

impl BroadcastType {
    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

impl From<BroadcastType> for u64 {
    fn from(e: BroadcastType) -> Self { e.into_raw() }
}

impl core::fmt::Display for BroadcastType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BroadcastType::Sysinfo => write!(f, "SYSINFO"),
            BroadcastType::AccessDefine => write!(f, "ACCESS-DEFINE"),
            BroadcastType::SysinfoDa => write!(f, "SYSINFO-DA"),
        }
    }
}
