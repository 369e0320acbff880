/// Clause 16.10.39 MM PDU types, downlink
/// Bits: 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MmPduTypeDl {
    DOtar = 0,
    DAuthentication = 1,
    DCkChangeDemand = 2,
    DDisable = 3,
    DEnable = 4,
    DLocationUpdateAccept = 5,
    DLocationUpdateCommand = 6,
    DLocationUpdateReject = 7,
    DLocationUpdateProceeding = 9,
    DAttachDetachGroupIdentity = 10,
    DAttachDetachGroupIdentityAck = 11,
    DMmStatus = 12,
    MmPduFunctionNotSupported = 15,
}

impl std::convert::TryFrom<u64> for MmPduTypeDl {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(MmPduTypeDl::DOtar),
            1 => Ok(MmPduTypeDl::DAuthentication),
            2 => Ok(MmPduTypeDl::DCkChangeDemand),
            3 => Ok(MmPduTypeDl::DDisable),
            4 => Ok(MmPduTypeDl::DEnable),
            5 => Ok(MmPduTypeDl::DLocationUpdateAccept),
            6 => Ok(MmPduTypeDl::DLocationUpdateCommand),
            7 => Ok(MmPduTypeDl::DLocationUpdateReject),
            9 => Ok(MmPduTypeDl::DLocationUpdateProceeding),
            10 => Ok(MmPduTypeDl::DAttachDetachGroupIdentity),
            11 => Ok(MmPduTypeDl::DAttachDetachGroupIdentityAck),
            12 => Ok(MmPduTypeDl::DMmStatus),
            15 => Ok(MmPduTypeDl::MmPduFunctionNotSupported),
            _ => Err(()),
        }
    }
}

impl MmPduTypeDl {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        self as u64
    }

    pub fn name(self) -> &'static str {
        match self {
            MmPduTypeDl::DOtar => "D-OTAR",
            MmPduTypeDl::DAuthentication => "D-AUTHENTICATION",
            MmPduTypeDl::DCkChangeDemand => "D-CK CHANGE DEMAND",
            MmPduTypeDl::DDisable => "D-DISABLE",
            MmPduTypeDl::DEnable => "D-ENABLE",
            MmPduTypeDl::DLocationUpdateAccept => "D-LOCATION UPDATE ACCEPT",
            MmPduTypeDl::DLocationUpdateCommand => "D-LOCATION UPDATE COMMAND",
            MmPduTypeDl::DLocationUpdateReject => "D-LOCATION UPDATE REJECT",
            MmPduTypeDl::DLocationUpdateProceeding => "D-LOCATION UPDATE PROCEEDING",
            MmPduTypeDl::DAttachDetachGroupIdentity => "D-ATTACH/DETACH GROUP ID",
            MmPduTypeDl::DAttachDetachGroupIdentityAck => "D-ATTACH/DETACH GROUP ID ACK",
            MmPduTypeDl::DMmStatus => "D-MM STATUS",
            MmPduTypeDl::MmPduFunctionNotSupported => "MM PDU/FUNCTION NOT SUPPORTED",
        }
    }
}

impl From<MmPduTypeDl> for u64 {
    fn from(e: MmPduTypeDl) -> Self { e.into_raw() }
}

impl core::fmt::Display for MmPduTypeDl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}
