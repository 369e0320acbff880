use core::fmt;

use tetra_core::{BitBuffer, expect_pdu_type, expect_value};
use tetra_core::pdu_parse_error::PduParseErr;

use crate::umac::enums::mac_pdu_type::MacPduType;

/// Clause 21.4.3.2 MAC-FRAG (downlink). The TM-SDU fragment follows the 4-bit header.
#[derive(Debug, Clone)]
pub struct MacFragDl {
    // 1
    pub fill_bits: bool,
}

impl MacFragDl {
    pub const HDR_LEN: usize = 4;

    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let mac_pdu_type = buf.read_field(2, "mac_pdu_type")?;
        expect_pdu_type!(mac_pdu_type, MacPduType::MacFragMacEnd)?;
        let pdu_subtype = buf.read_field(1, "pdu_subtype")?;
        expect_value!(pdu_subtype, 0)?;
        let fill_bits = buf.read_field(1, "fill_bits")? != 0;

        Ok(MacFragDl {
            fill_bits,
        })
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(MacPduType::MacFragMacEnd.into_raw(), 2);
        buf.write_bits(0, 1);
        buf.write_bits(self.fill_bits as u8 as u64, 1);
    }
}

impl fmt::Display for MacFragDl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MAC-FRAG fill_bits: {}", self.fill_bits)
    }
}
