/// Clause 18.5.21 Protocol discriminator
/// Bits: 3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MleProtocolDiscriminator {
    Mm = 1,
    Cmce = 2,
    Sndcp = 4,
    Mle = 5,
    TetraManagementEntity = 6,
    Testing = 7,
}

impl std::convert::TryFrom<u64> for MleProtocolDiscriminator {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            1 => Ok(MleProtocolDiscriminator::Mm),
            2 => Ok(MleProtocolDiscriminator::Cmce),
            4 => Ok(MleProtocolDiscriminator::Sndcp),
            5 => Ok(MleProtocolDiscriminator::Mle),
            6 => Ok(MleProtocolDiscriminator::TetraManagementEntity),
            7 => Ok(MleProtocolDiscriminator::Testing),
            _ => Err(()),
        }
    }
}

impl MleProtocolDiscriminator {
    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

impl From<MleProtocolDiscriminator> for u64 {
    fn from(e: MleProtocolDiscriminator) -> Self { e.into_raw() }
}

impl core::fmt::Display for MleProtocolDiscriminator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MleProtocolDiscriminator::Mm => write!(f, "MM"),
            MleProtocolDiscriminator::Cmce => write!(f, "CMCE"),
            MleProtocolDiscriminator::Sndcp => write!(f, "SNDCP"),
            MleProtocolDiscriminator::Mle => write!(f, "MLE"),
            MleProtocolDiscriminator::TetraManagementEntity => write!(f, "MGMT"),
            MleProtocolDiscriminator::Testing => write!(f, "TEST"),
        }
    }
}
