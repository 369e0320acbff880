/// Clause 28.4 SNDCP PDU types, downlink
/// Bits: 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SndcpPduType {
    SnActivatePdpAccept = 0,
    SnDeactivatePdpAccept = 1,
    SnDeactivatePdpDemand = 2,
    SnActivatePdpReject = 3,
    SnUnitdata = 4,
    SnData = 5,
    SnDataTxRequest = 6,
    SnDataTxResponse = 7,
    SnEndOfData = 8,
    SnReconnect = 9,
    SnPageRequest = 10,
    SnNotSupported = 11,
    SnDataPriority = 12,
    SnModify = 13,
}

impl std::convert::TryFrom<u64> for SndcpPduType {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(SndcpPduType::SnActivatePdpAccept),
            1 => Ok(SndcpPduType::SnDeactivatePdpAccept),
            2 => Ok(SndcpPduType::SnDeactivatePdpDemand),
            3 => Ok(SndcpPduType::SnActivatePdpReject),
            4 => Ok(SndcpPduType::SnUnitdata),
            5 => Ok(SndcpPduType::SnData),
            6 => Ok(SndcpPduType::SnDataTxRequest),
            7 => Ok(SndcpPduType::SnDataTxResponse),
            8 => Ok(SndcpPduType::SnEndOfData),
            9 => Ok(SndcpPduType::SnReconnect),
            10 => Ok(SndcpPduType::SnPageRequest),
            11 => Ok(SndcpPduType::SnNotSupported),
            12 => Ok(SndcpPduType::SnDataPriority),
            13 => Ok(SndcpPduType::SnModify),
            _ => Err(()),
        }
    }
}

impl SndcpPduType {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        self as u64
    }

    pub fn name(self) -> &'static str {
        match self {
            SndcpPduType::SnActivatePdpAccept => "SN-ACTIVATE PDP ACCEPT",
            SndcpPduType::SnDeactivatePdpAccept => "SN-DEACTIVATE PDP ACCEPT",
            SndcpPduType::SnDeactivatePdpDemand => "SN-DEACTIVATE PDP DEMAND",
            SndcpPduType::SnActivatePdpReject => "SN-ACTIVATE PDP REJECT",
            SndcpPduType::SnUnitdata => "SN-UNITDATA",
            SndcpPduType::SnData => "SN-DATA",
            SndcpPduType::SnDataTxRequest => "SN-DATA TX REQUEST",
            SndcpPduType::SnDataTxResponse => "SN-DATA TX RESPONSE",
            SndcpPduType::SnEndOfData => "SN-END OF DATA",
            SndcpPduType::SnReconnect => "SN-RECONNECT",
            SndcpPduType::SnPageRequest => "SN-PAGE REQUEST",
            SndcpPduType::SnNotSupported => "SN-NOT SUPPORTED",
            SndcpPduType::SnDataPriority => "SN-DATA PRIORITY",
            SndcpPduType::SnModify => "SN-MODIFY",
        }
    }
}

impl From<SndcpPduType> for u64 {
    fn from(e: SndcpPduType) -> Self { e.into_raw() }
}

impl core::fmt::Display for SndcpPduType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}
