use core::fmt;

use tetra_core::{BitBuffer, expect_pdu_type, expect_value};
use tetra_core::pdu_parse_error::PduParseErr;

use crate::umac::enums::mac_pdu_type::MacPduType;
use crate::umac::fields::basic_slotgrant::BasicSlotgrant;
use crate::umac::fields::channel_allocation::ChanAllocElement;


/// Clause 21.4.3.3 MAC-END (downlink)
///
/// As with MAC-RESOURCE, the channel allocation element is only decoded when the
/// fragment is not encrypted. Otherwise the buffer is left at the start of the element.
#[derive(Debug, Clone)]
pub struct MacEndDl {
    // 1
    pub fill_bits: bool,
    // 1
    pub pos_of_grant: u8,
    /// 6 bits, length of the whole MAC-END PDU in octets
    pub length_ind: u8,
    // 8 opt
    pub slot_granting_element: Option<BasicSlotgrant>,
    // 1
    pub chan_alloc_flag: bool,
    pub chan_alloc_element: Option<ChanAllocElement>,
}

impl MacEndDl {
    pub fn from_bitbuf(buf: &mut BitBuffer, encrypted: bool) -> Result<Self, PduParseErr> {
        let mac_pdu_type = buf.read_field(2, "mac_pdu_type")?;
        expect_pdu_type!(mac_pdu_type, MacPduType::MacFragMacEnd)?;
        let pdu_subtype = buf.read_field(1, "pdu_subtype")?;
        expect_value!(pdu_subtype, 1)?;

        let fill_bits = buf.read_field(1, "fill_bits")? != 0;
        let pos_of_grant = buf.read_field(1, "pos_of_grant")? as u8;
        let length_ind = buf.read_field(6, "length_ind")? as u8;

        let slot_granting_element = match buf.read_field(1, "slot_granting_flag")? {
            1 => Some(BasicSlotgrant::from_bitbuf(buf)?),
            _ => None,
        };
        let chan_alloc_flag = buf.read_field(1, "chan_alloc_flag")? == 1;
        let chan_alloc_element = if chan_alloc_flag && !encrypted {
            Some(ChanAllocElement::from_bitbuf(buf)?)
        } else {
            None
        };

        Ok(MacEndDl {
            fill_bits,
            pos_of_grant,
            length_ind,
            slot_granting_element,
            chan_alloc_flag,
            chan_alloc_element,
        })
    }

    /// Decodes a channel allocation element skipped while the fragment was encrypted.
    /// Returns the element length in bits.
    pub fn decode_chan_alloc(&mut self, buf: &mut BitBuffer) -> Result<usize, PduParseErr> {
        let elem = ChanAllocElement::from_bitbuf(buf)?;
        let len = elem.compute_len();
        self.chan_alloc_element = Some(elem);
        Ok(len)
    }

    /// Bits consumed from the MAC block by this PDU
    pub fn pdu_bits(&self) -> usize {
        self.length_ind as usize * 8
    }

    /// Header length up to, but not including, the channel allocation element
    pub fn fixed_hdr_len(&self) -> usize {
        13 + self.slot_granting_element.map_or(0, |_| BasicSlotgrant::LEN)
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(MacPduType::MacFragMacEnd.into_raw(), 2);
        buf.write_bits(1, 1);

        buf.write_bits(self.fill_bits as u8 as u64, 1);
        buf.write_bits(self.pos_of_grant as u64, 1);
        buf.write_bits(self.length_ind as u64, 6);

        if let Some(v) = &self.slot_granting_element {
            buf.write_bits(1, 1);
            v.to_bitbuf(buf);
        } else {
            buf.write_bits(0, 1);
        }

        if let Some(v) = &self.chan_alloc_element {
            buf.write_bits(1, 1);
            v.to_bitbuf(buf);
        } else {
            buf.write_bits(0, 1);
        }
    }
}

impl fmt::Display for MacEndDl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MAC-END fill_bits: {} len: {}", self.fill_bits, self.length_ind)?;
        if let Some(v) = &self.slot_granting_element {
            write!(f, " SlotGrant={}", v)?;
        }
        if self.chan_alloc_flag {
            match &self.chan_alloc_element {
                Some(ca) => write!(f, " ChanAlloc={}", ca)?,
                None => write!(f, " ChanAlloc=ENCRYPTED")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_with_slotgrant() {
        // fill 1, pos 0, li 12, slot grant 0x21, no chanalloc, then SDU bits
        let mut buf = BitBuffer::from_bitstr("011100011001001000010101");
        let pdu = MacEndDl::from_bitbuf(&mut buf, false).unwrap();
        assert!(pdu.fill_bits);
        assert_eq!(pdu.length_ind, 12);
        assert_eq!(pdu.pdu_bits(), 96);
        assert_eq!(pdu.slot_granting_element.map(|sg| sg.capacity_allocation), Some(2));
        assert!(!pdu.chan_alloc_flag);
        assert_eq!(buf.get_pos(), pdu.fixed_hdr_len());
        assert_eq!(buf.get_len_remaining(), 3);
    }

    #[test]
    fn test_encrypted_chanalloc_left_in_place() {
        let mut buf = BitBuffer::from_bitstr(concat!("0110000101001", "0110001100010111111000011", "11"));
        let mut pdu = MacEndDl::from_bitbuf(&mut buf, true).unwrap();
        assert!(pdu.chan_alloc_flag);
        assert!(pdu.chan_alloc_element.is_none());
        assert_eq!(buf.get_pos(), 13);
        assert_eq!(pdu.decode_chan_alloc(&mut buf).unwrap(), 25);
        assert_eq!(buf.get_len_remaining(), 2);
    }
}
