/// Clause 21.4.1 Table 21.38: MAC PDU types on SCH/F, SCH/HD and STCH
/// Bits: 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MacPduType {
    /// MAC-RESOURCE
    MacResource = 0,
    /// MAC-FRAG or MAC-END, told apart by the subtype bit
    MacFragMacEnd = 1,
    /// SYSINFO, ACCESS-DEFINE or SYSINFO-DA
    Broadcast = 2,
    /// MAC-D-BLCK
    Supplementary = 3,
}

impl std::convert::TryFrom<u64> for MacPduType {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(MacPduType::MacResource),
            1 => Ok(MacPduType::MacFragMacEnd),
            2 => Ok(MacPduType::Broadcast),
            3 => Ok(MacPduType::Supplementary),
            _ => Err(()),
        }
    }
}

impl MacPduType {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        self as u64
    }

    /// Short name as printed in decoder logs
    pub fn name(self) -> &'static str {
        match self {
            MacPduType::MacResource => "RESOURCE",
            MacPduType::MacFragMacEnd => "FRAG/END",
            MacPduType::Broadcast => "BROADCAST",
            MacPduType::Supplementary => "SUPPLEMENTARY",
        }
    }
}

impl From<MacPduType> for u64 {
    fn from(e: MacPduType) -> Self { e.into_raw() }
}

impl core::fmt::Display for MacPduType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}
