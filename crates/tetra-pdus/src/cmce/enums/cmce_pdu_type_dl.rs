/// Clause 14.8.28 CMCE PDU types, downlink
/// Bits: 5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CmcePduTypeDl {
    DAlert = 0,
    DCallProceeding = 1,
    DConnect = 2,
    DConnectAcknowledge = 3,
    DDisconnect = 4,
    DInfo = 5,
    DRelease = 6,
    DSetup = 7,
    DStatus = 8,
    DTxCeased = 9,
    DTxContinue = 10,
    DTxGranted = 11,
    DTxWait = 12,
    DTxInterrupt = 13,
    DCallRestore = 14,
    DSdsData = 15,
    DFacility = 16,
    CmceFunctionNotSupported = 31,
}

impl std::convert::TryFrom<u64> for CmcePduTypeDl {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(CmcePduTypeDl::DAlert),
            1 => Ok(CmcePduTypeDl::DCallProceeding),
            2 => Ok(CmcePduTypeDl::DConnect),
            3 => Ok(CmcePduTypeDl::DConnectAcknowledge),
            4 => Ok(CmcePduTypeDl::DDisconnect),
            5 => Ok(CmcePduTypeDl::DInfo),
            6 => Ok(CmcePduTypeDl::DRelease),
            7 => Ok(CmcePduTypeDl::DSetup),
            8 => Ok(CmcePduTypeDl::DStatus),
            9 => Ok(CmcePduTypeDl::DTxCeased),
            10 => Ok(CmcePduTypeDl::DTxContinue),
            11 => Ok(CmcePduTypeDl::DTxGranted),
            12 => Ok(CmcePduTypeDl::DTxWait),
            13 => Ok(CmcePduTypeDl::DTxInterrupt),
            14 => Ok(CmcePduTypeDl::DCallRestore),
            15 => Ok(CmcePduTypeDl::DSdsData),
            16 => Ok(CmcePduTypeDl::DFacility),
            31 => Ok(CmcePduTypeDl::CmceFunctionNotSupported),
            _ => Err(()),
        }
    }
}

impl CmcePduTypeDl {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        self as u64
    }

    pub fn name(self) -> &'static str {
        match self {
            CmcePduTypeDl::DAlert => "D-ALERT",
            CmcePduTypeDl::DCallProceeding => "D-CALL PROCEEDING",
            CmcePduTypeDl::DConnect => "D-CONNECT",
            CmcePduTypeDl::DConnectAcknowledge => "D-CONNECT ACK",
            CmcePduTypeDl::DDisconnect => "D-DISCONNECT",
            CmcePduTypeDl::DInfo => "D-INFO",
            CmcePduTypeDl::DRelease => "D-RELEASE",
            CmcePduTypeDl::DSetup => "D-SETUP",
            CmcePduTypeDl::DStatus => "D-STATUS",
            CmcePduTypeDl::DTxCeased => "D-TX CEASED",
            CmcePduTypeDl::DTxContinue => "D-TX CONTINUE",
            CmcePduTypeDl::DTxGranted => "D-TX GRANTED",
            CmcePduTypeDl::DTxWait => "D-TX WAIT",
            CmcePduTypeDl::DTxInterrupt => "D-TX INTERRUPT",
            CmcePduTypeDl::DCallRestore => "D-TX CALL RESTORE",
            CmcePduTypeDl::DSdsData => "D-SDS DATA",
            CmcePduTypeDl::DFacility => "D-FACILITY",
            CmcePduTypeDl::CmceFunctionNotSupported => "CMCE FUNCTION NOT SUPPORTED",
        }
    }
}

impl From<CmcePduTypeDl> for u64 {
    fn from(e: CmcePduTypeDl) -> Self { e.into_raw() }
}

impl core::fmt::Display for CmcePduTypeDl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}
