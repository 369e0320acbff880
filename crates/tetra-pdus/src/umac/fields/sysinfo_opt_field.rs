use tetra_core::{BitBuffer, pdu_parse_error::PduParseErr};

use crate::umac::enums::sysinfo_opt_field_flag::SysinfoOptFieldFlag;

/// Clause 21.4.4.1 SYSINFO 20-bit optional field, tagged by the preceding 2-bit flag.
/// Contents are kept raw; the receiver only logs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysinfoOptField {
    /// TS common frames bitmap for even multiframes
    EvenMultiframe(u32),
    /// TS common frames bitmap for odd multiframes
    OddMultiframe(u32),
    DefaultAccessCodeA(u32),
    ExtServices(u32),
}

impl SysinfoOptField {
    pub const LEN: usize = 20;

    pub fn from_bitbuf(flag: SysinfoOptFieldFlag, buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let v = buf.read_field(Self::LEN, "option_field")? as u32;
        Ok(match flag {
            SysinfoOptFieldFlag::EvenMultiframe => SysinfoOptField::EvenMultiframe(v),
            SysinfoOptFieldFlag::OddMultiframe => SysinfoOptField::OddMultiframe(v),
            SysinfoOptFieldFlag::DefaultAccessCodeA => SysinfoOptField::DefaultAccessCodeA(v),
            SysinfoOptFieldFlag::ExtServicesBroadcast => SysinfoOptField::ExtServices(v),
        })
    }

    pub fn flag(&self) -> SysinfoOptFieldFlag {
        match self {
            SysinfoOptField::EvenMultiframe(_) => SysinfoOptFieldFlag::EvenMultiframe,
            SysinfoOptField::OddMultiframe(_) => SysinfoOptFieldFlag::OddMultiframe,
            SysinfoOptField::DefaultAccessCodeA(_) => SysinfoOptFieldFlag::DefaultAccessCodeA,
            SysinfoOptField::ExtServices(_) => SysinfoOptFieldFlag::ExtServicesBroadcast,
        }
    }

    pub fn raw(&self) -> u32 {
        match *self {
            SysinfoOptField::EvenMultiframe(v)
            | SysinfoOptField::OddMultiframe(v)
            | SysinfoOptField::DefaultAccessCodeA(v)
            | SysinfoOptField::ExtServices(v) => v,
        }
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(self.flag().into_raw(), 2);
        buf.write_bits(self.raw() as u64, Self::LEN);
    }
}
