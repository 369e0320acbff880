/// Clause 21.5.2 Channel allocation type
/// Bits: 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChanAllocType {
    Replace = 0,
    Additional = 1,
    QuitAndGo = 2,
    /// Replace current channel, plus carrier specific signalling channel in slot 1
    ReplaceWithCarrierSignalling = 3,
}

impl std::convert::TryFrom<u64> for ChanAllocType {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(ChanAllocType::Replace),
            1 => Ok(ChanAllocType::Additional),
            2 => Ok(ChanAllocType::QuitAndGo),
            3 => Ok(ChanAllocType::ReplaceWithCarrierSignalling),
            _ => Err(()),
        }
    }
}

impl ChanAllocType {
    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

impl From<ChanAllocType> for u64 {
    fn from(e: ChanAllocType) -> Self { e.into_raw() }
}

impl core::fmt::Display for ChanAllocType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChanAllocType::Replace => write!(f, "Replace"),
            ChanAllocType::Additional => write!(f, "Additional"),
            ChanAllocType::QuitAndGo => write!(f, "Quit and go"),
            ChanAllocType::ReplaceWithCarrierSignalling => write!(f, "Replace + Slot1"),
        }
    }
}
