use core::fmt;

use tetra_core::{BitBuffer, expect_pdu_type, expect_value};
use tetra_core::pdu_parse_error::PduParseErr;

use crate::umac::enums::mac_pdu_type::MacPduType;
use crate::umac::fields::basic_slotgrant::BasicSlotgrant;


/// Clause 21.4.3.4 MAC-D-BLCK, the downlink MAC-SUPPLEMENTARY PDU.
/// The TM-SDU starts at bit 18, or at bit 26 when a slot granting element is present.
#[derive(Debug, Clone)]
pub struct MacDBlck {
    // 1
    pub fill_bits: bool,
    // 2
    pub encryption_mode: u8,
    // 10
    pub event_label: u16,
    // 1
    pub imm_napping_permission: bool,
    // 8 opt
    pub slot_granting_element: Option<BasicSlotgrant>,
}

impl MacDBlck {
    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let mac_pdu_type = buf.read_field(2, "mac_pdu_type")?;
        expect_pdu_type!(mac_pdu_type, MacPduType::Supplementary)?;
        let pdu_subtype = buf.read_field(1, "pdu_subtype")?;
        expect_value!(pdu_subtype, 0)?;

        let fill_bits = buf.read_field(1, "fill_bits")? != 0;
        let encryption_mode = buf.read_field(2, "encryption_mode")? as u8;
        let event_label = buf.read_field(10, "event_label")? as u16;
        let imm_napping_permission = buf.read_field(1, "imm_napping_permission")? != 0;
        let slot_granting_element = match buf.read_field(1, "slot_granting_flag")? {
            1 => Some(BasicSlotgrant::from_bitbuf(buf)?),
            _ => None,
        };

        Ok(MacDBlck {
            fill_bits,
            encryption_mode,
            event_label,
            imm_napping_permission,
            slot_granting_element,
        })
    }

    /// Offset of the TM-SDU from the start of the PDU
    pub fn sdu_offset(&self) -> usize {
        18 + self.slot_granting_element.map_or(0, |_| BasicSlotgrant::LEN)
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(MacPduType::Supplementary.into_raw(), 2);
        buf.write_bits(0, 1);

        buf.write_bits(self.fill_bits as u8 as u64, 1);
        buf.write_bits(self.encryption_mode as u64, 2);
        buf.write_bits(self.event_label as u64, 10);
        buf.write_bits(self.imm_napping_permission as u8 as u64, 1);

        if let Some(v) = &self.slot_granting_element {
            buf.write_bits(1, 1);
            v.to_bitbuf(buf);
        } else {
            buf.write_bits(0, 1);
        }
    }
}

impl fmt::Display for MacDBlck {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MAC-D-BLCK Encr={} E{}", self.encryption_mode, self.event_label)?;
        if let Some(v) = &self.slot_granting_element {
            write!(f, " SlotGrant={}", v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdu_offset() {
        let pdu = MacDBlck {
            fill_bits: false,
            encryption_mode: 0,
            event_label: 513,
            imm_napping_permission: false,
            slot_granting_element: Some(BasicSlotgrant { capacity_allocation: 1, granting_delay: 0 }),
        };
        let mut buf = BitBuffer::new_autoexpand(32);
        pdu.to_bitbuf(&mut buf);
        buf.write_bits(0b101, 3);
        buf.seek(0);

        let parsed = MacDBlck::from_bitbuf(&mut buf).unwrap();
        assert_eq!(parsed.event_label, 513);
        assert_eq!(buf.get_pos(), 26);
        assert_eq!(parsed.sdu_offset(), 26);
        assert_eq!(parsed.to_string(), "MAC-D-BLCK Encr=0 E513 SlotGrant=1/0");
    }
}
