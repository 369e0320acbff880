use core::fmt;

use tetra_core::{AddressType, BitBuffer, TetraAddress, expect_pdu_type};
use tetra_core::pdu_parse_error::PduParseErr;

use crate::umac::enums::mac_pdu_type::MacPduType;
use crate::umac::enums::mac_resource_length::MacResourceLength;
use crate::umac::fields::basic_slotgrant::BasicSlotgrant;
use crate::umac::fields::channel_allocation::ChanAllocElement;


/// Clause 21.4.3.1 MAC-RESOURCE
///
/// After `from_bitbuf` the buffer position is the start of the TM-SDU, unless a channel
/// allocation element is present but still encrypted. In that case the position is the
/// start of the (encrypted) element and `chan_alloc_element` is None; call
/// `decode_chan_alloc` once the PDU has been decrypted.
#[derive(Debug, Clone, Default)]
pub struct MacResource {
    /// 1 bit, TM-SDU is followed by fill bits
    pub fill_bits: bool,
    /// 1 bit. 0 -> current channel, 1 -> allocated channel
    pub pos_of_grant: u8,
    /// 2 bits, nonzero when the PDU is air interface encrypted
    pub encryption_mode: u8,
    // 1
    pub random_access_flag: bool,
    /// 6 bits, raw length indication
    pub length_ind: u8,
    /// 3 bits type plus address, Null PDU ends parsing
    pub addr: TetraAddress,
    /// 4 opt
    pub power_control_element: Option<u8>,
    /// 8 opt
    pub slot_granting_element: Option<BasicSlotgrant>,
    // 1
    pub chan_alloc_flag: bool,
    pub chan_alloc_element: Option<ChanAllocElement>,
    /// True while the fields after the address are still encrypted
    pub is_encrypted: bool,
}

impl MacResource {
    /// Parses the MAC-RESOURCE header. `is_decrypted` tells whether the caller already
    /// decrypted the PDU, which makes the channel allocation element readable.
    pub fn from_bitbuf(buf: &mut BitBuffer, is_decrypted: bool) -> Result<Self, PduParseErr> {
        let pdu_type = buf.read_field(2, "mac_pdu_type")?;
        expect_pdu_type!(pdu_type, MacPduType::MacResource)?;

        let mut s = MacResource {
            fill_bits: buf.read_field(1, "fill_bits")? != 0,
            pos_of_grant: buf.read_field(1, "pos_of_grant")? as u8,
            encryption_mode: buf.read_field(2, "encryption_mode")? as u8,
            random_access_flag: buf.read_field(1, "random_access_flag")? != 0,
            length_ind: buf.read_field(6, "length_ind")? as u8,
            ..Default::default()
        };
        s.is_encrypted = s.encryption_mode > 0 && !is_decrypted;

        let val = buf.read_field(3, "addr_type")?;
        let addr_type = AddressType::try_from(val)
            .map_err(|_| PduParseErr::InvalidValue { field: "addr_type", value: val })?;
        s.addr = Self::parse_address(buf, addr_type, s.encryption_mode != 0)?;
        if s.addr.is_null() {
            return Ok(s);
        }

        if buf.read_field(1, "power_control_flag")? == 1 {
            s.power_control_element = Some(buf.read_field(4, "power_control_element")? as u8);
        }
        if buf.read_field(1, "slot_granting_flag")? == 1 {
            s.slot_granting_element = Some(BasicSlotgrant::from_bitbuf(buf)?);
        }
        s.chan_alloc_flag = buf.read_field(1, "chan_alloc_flag")? == 1;
        if s.chan_alloc_flag && !s.is_encrypted {
            s.chan_alloc_element = Some(ChanAllocElement::from_bitbuf(buf)?);
        }

        Ok(s)
    }

    fn parse_address(buf: &mut BitBuffer, addr_type: AddressType, encrypted: bool) -> Result<TetraAddress, PduParseErr> {
        let mut addr = TetraAddress::new(addr_type, 0);
        addr.encrypted = encrypted && addr.has_ssi();
        match addr_type {
            AddressType::NullPdu => {
                addr.encrypted = false;
            }
            AddressType::Ssi | AddressType::Ussi | AddressType::Smi => {
                addr.ssi = buf.read_field(24, "ssi")? as u32;
            }
            AddressType::EventLabel => {
                addr.event_label = Some(buf.read_field(10, "event_label")? as u16);
            }
            AddressType::SsiAndEventLabel | AddressType::SmiAndEventLabel => {
                addr.ssi = buf.read_field(24, "ssi")? as u32;
                addr.event_label = Some(buf.read_field(10, "event_label")? as u16);
            }
            AddressType::SsiAndUsageMarker => {
                addr.ssi = buf.read_field(24, "ssi")? as u32;
                addr.usage_marker = Some(buf.read_field(6, "usage_marker")? as u8);
            }
        }
        Ok(addr)
    }

    /// Decodes a channel allocation element that was skipped because the PDU was encrypted.
    /// The buffer must be positioned at the element, and is left at the start of the TM-SDU.
    /// Returns the element length in bits.
    pub fn decode_chan_alloc(&mut self, buf: &mut BitBuffer) -> Result<usize, PduParseErr> {
        let elem = ChanAllocElement::from_bitbuf(buf)?;
        let len = elem.compute_len();
        self.chan_alloc_element = Some(elem);
        self.is_encrypted = false;
        Ok(len)
    }

    /// Decoded length indication, None for reserved codes
    pub fn length(&self) -> Option<MacResourceLength> {
        MacResourceLength::from_length_ind(self.length_ind)
    }

    pub fn is_null_pdu(&self) -> bool {
        self.addr.is_null()
    }

    pub fn is_frag_start(&self) -> bool {
        self.length() == Some(MacResourceLength::StartOfFragmentation)
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(MacPduType::MacResource.into_raw(), 2);
        buf.write_bits(self.fill_bits as u64, 1);
        buf.write_bits(self.pos_of_grant as u64, 1);
        buf.write_bits(self.encryption_mode as u64, 2);
        buf.write_bits(self.random_access_flag as u64, 1);
        buf.write_bits(self.length_ind as u64, 6);

        buf.write_bits(self.addr.addr_type.into_raw(), 3);
        match self.addr.addr_type {
            AddressType::NullPdu => return,
            AddressType::Ssi | AddressType::Ussi | AddressType::Smi => {
                buf.write_bits(self.addr.ssi as u64, 24);
            }
            AddressType::EventLabel => {
                buf.write_bits(self.addr.event_label.unwrap_or(0) as u64, 10);
            }
            AddressType::SsiAndEventLabel | AddressType::SmiAndEventLabel => {
                buf.write_bits(self.addr.ssi as u64, 24);
                buf.write_bits(self.addr.event_label.unwrap_or(0) as u64, 10);
            }
            AddressType::SsiAndUsageMarker => {
                buf.write_bits(self.addr.ssi as u64, 24);
                buf.write_bits(self.addr.usage_marker.unwrap_or(0) as u64, 6);
            }
        }

        if let Some(v) = self.power_control_element {
            buf.write_bits(1, 1);
            buf.write_bits(v as u64, 4);
        } else {
            buf.write_bits(0, 1);
        }
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

    /// Header length in bits, up to the start of the TM-SDU
    pub fn compute_header_len(&self) -> usize {
        let mut len = 16;
        if self.is_null_pdu() {
            return len;
        }
        len += self.addr.addr_type.num_bits();
        len += 1 + self.power_control_element.map_or(0, |_| 4);
        len += 1 + self.slot_granting_element.map_or(0, |_| BasicSlotgrant::LEN);
        len += 1 + self.chan_alloc_element.as_ref().map_or(0, |c| c.compute_len());
        len
    }
}

impl fmt::Display for MacResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RESOURCE Encr={}", self.encryption_mode)?;
        if self.encryption_mode != 0 && !self.is_encrypted {
            write!(f, " DECRYPTED")?;
        }
        match self.length() {
            Some(l) => write!(f, " len={}", l)?,
            None => write!(f, " len=invalid({})", self.length_ind)?,
        }
        write!(f, " Addr={}", self.addr)?;
        if let Some(v) = self.power_control_element {
            write!(f, " PowerCtl={}", v)?;
        }
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
