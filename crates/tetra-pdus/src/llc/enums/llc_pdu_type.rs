/// Clause 21.2.1 LLC PDU types
/// Bits: 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LlcPduType {
    BlAdata = 0,
    BlData = 1,
    BlUdata = 2,
    BlAck = 3,
    BlAdataFcs = 4,
    BlDataFcs = 5,
    BlUdataFcs = 6,
    BlAckFcs = 7,
    AlSetup = 8,
    AlDataAlFinal = 9,
    AlUdataAlUfinal = 10,
    AlAckAlRnr = 11,
    AlReconnect = 12,
    SuppLlcPdu = 13,
    L2SigPdu = 14,
    AlDisc = 15,
}

impl std::convert::TryFrom<u64> for LlcPduType {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(LlcPduType::BlAdata),
            1 => Ok(LlcPduType::BlData),
            2 => Ok(LlcPduType::BlUdata),
            3 => Ok(LlcPduType::BlAck),
            4 => Ok(LlcPduType::BlAdataFcs),
            5 => Ok(LlcPduType::BlDataFcs),
            6 => Ok(LlcPduType::BlUdataFcs),
            7 => Ok(LlcPduType::BlAckFcs),
            8 => Ok(LlcPduType::AlSetup),
            9 => Ok(LlcPduType::AlDataAlFinal),
            10 => Ok(LlcPduType::AlUdataAlUfinal),
            11 => Ok(LlcPduType::AlAckAlRnr),
            12 => Ok(LlcPduType::AlReconnect),
            13 => Ok(LlcPduType::SuppLlcPdu),
            14 => Ok(LlcPduType::L2SigPdu),
            15 => Ok(LlcPduType::AlDisc),
            _ => Err(()),
        }
    }
}

impl LlcPduType {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        self as u64
    }

    pub fn name(self) -> &'static str {
        match self {
            LlcPduType::BlAdata => "BL-ADATA",
            LlcPduType::BlData => "BL-DATA",
            LlcPduType::BlUdata => "BL-UDATA",
            LlcPduType::BlAck => "BL-ACK",
            LlcPduType::BlAdataFcs => "BL-ADATA-FCS",
            LlcPduType::BlDataFcs => "BL-DATA-FCS",
            LlcPduType::BlUdataFcs => "BL-UDATA-FCS",
            LlcPduType::BlAckFcs => "BL-ACK-FCS",
            LlcPduType::AlSetup => "AL-SETUP",
            LlcPduType::AlDataAlFinal => "AL-DATA/FINAL",
            LlcPduType::AlUdataAlUfinal => "AL-UDATA/FINAL",
            LlcPduType::AlAckAlRnr => "AL-ACK/AL-RNR",
            LlcPduType::AlReconnect => "AL-RECONNECT",
            LlcPduType::SuppLlcPdu => "AL-SUPPLEMENTARY",
            LlcPduType::L2SigPdu => "AL-L2SIG",
            LlcPduType::AlDisc => "AL-DISC",
        }
    }
}

impl From<LlcPduType> for u64 {
    fn from(e: LlcPduType) -> Self { e.into_raw() }
}

impl core::fmt::Display for LlcPduType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Minimum PDU length in bits, including the 4-bit type, needed to parse each PDU type
const LLC_PDU_MIN_LEN: [usize; 16] = [6, 5, 4, 5, 6 + 32, 5 + 32, 4 + 32, 5 + 32, 0, 13, 17, 1, 0, 0, 0, 0];

impl LlcPduType {
    pub fn min_len(self) -> usize {
        LLC_PDU_MIN_LEN[self as usize]
    }

    /// Basic link PDUs with a trailing 32-bit frame check sequence
    pub fn has_fcs(self) -> bool {
        matches!(self, LlcPduType::BlAdataFcs | LlcPduType::BlDataFcs | LlcPduType::BlUdataFcs | LlcPduType::BlAckFcs)
    }
}
