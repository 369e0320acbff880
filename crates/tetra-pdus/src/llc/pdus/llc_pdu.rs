use core::fmt;

use tetra_core::BitBuffer;
use tetra_core::pdu_parse_error::PduParseErr;

use crate::llc::enums::llc_pdu_type::LlcPduType;


/// LLC PDU kind after resolving the sub-type bits of combined PDU types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlcPduKind {
    BlAdata,
    BlData,
    BlUdata,
    BlAck,
    AlSetup,
    AlData,
    AlFinal,
    AlUdata,
    AlUfinal,
    AlAck,
    AlRnr,
    AlReconnect,
    AlDisc,
    /// Supplementary and layer 2 signalling PDUs, not parsed further
    Unknown,
}

impl fmt::Display for LlcPduKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LlcPduKind::BlAdata => "BL-ADATA",
            LlcPduKind::BlData => "BL-DATA",
            LlcPduKind::BlUdata => "BL-UDATA",
            LlcPduKind::BlAck => "BL-ACK",
            LlcPduKind::AlSetup => "AL-SETUP",
            LlcPduKind::AlData => "AL-DATA",
            LlcPduKind::AlFinal => "AL-FINAL",
            LlcPduKind::AlUdata => "AL-UDATA",
            LlcPduKind::AlUfinal => "AL-UFINAL",
            LlcPduKind::AlAck => "AL-ACK",
            LlcPduKind::AlRnr => "AL-RNR",
            LlcPduKind::AlReconnect => "AL-RECONNECT",
            LlcPduKind::AlDisc => "AL-DISC",
            LlcPduKind::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// Frame check sequence over a TL-SDU: CRC-32 with polynomial 0x04C11DB7, initial value
/// 0xFFFFFFFF, complemented. Inputs shorter than 32 bits pre-shift the register.
pub fn compute_fcs(bits: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    if bits.len() < 32 {
        crc = crc.checked_shl((32 - bits.len()) as u32).unwrap_or(0);
    }
    for &b in bits {
        let bit = (b as u32 ^ (crc >> 31)) & 1;
        crc <<= 1;
        if bit != 0 {
            crc ^= 0x04C1_1DB7;
        }
    }
    !crc
}

/// Clause 21.2 LLC PDU header, common to the basic and advanced link
///
/// `from_bitbuf` leaves the buffer positioned at the start of the TL-SDU. For the
/// FCS variants the 32-bit FCS is checked and removed from the buffer tail.
#[derive(Debug, Clone)]
pub struct LlcPdu {
    pub pdu_type: LlcPduType,
    pub kind: LlcPduKind,
    /// Receive sequence number N(R)
    pub nr: Option<u8>,
    /// Send sequence number N(S)
    pub ns: Option<u8>,
    /// Segment sequence number S(S), advanced link only
    pub ss: Option<u8>,
    /// AL-FINAL acknowledgement request
    pub ar: bool,
    pub fcs: Option<u32>,
    /// False when a received FCS does not match the TL-SDU
    pub fcs_valid: bool,
    /// Offset of the TL-SDU from the start of the LLC PDU
    pub tl_sdu_offset: usize,
    pub tl_sdu_len: usize,
}

impl LlcPdu {
    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let start = buf.get_pos();
        let len = buf.get_len_remaining();

        let val = buf.read_field(4, "llc_pdu_type")?;
        let pdu_type = LlcPduType::try_from(val)
            .map_err(|_| PduParseErr::InvalidValue { field: "llc_pdu_type", value: val })?;
        if len < pdu_type.min_len() {
            return Err(PduParseErr::InconsistentLength { expected: pdu_type.min_len(), found: len });
        }

        let mut s = LlcPdu {
            pdu_type,
            kind: LlcPduKind::Unknown,
            nr: None,
            ns: None,
            ss: None,
            ar: false,
            fcs: None,
            fcs_valid: true,
            tl_sdu_offset: 0,
            tl_sdu_len: 0,
        };
        // Only the PDUs carrying a TL-SDU keep the remainder of the buffer
        let mut has_sdu = true;

        match pdu_type {
            LlcPduType::BlAdata | LlcPduType::BlAdataFcs => {
                s.kind = LlcPduKind::BlAdata;
                s.nr = Some(buf.read_field(1, "nr")? as u8);
                s.ns = Some(buf.read_field(1, "ns")? as u8);
            }
            LlcPduType::BlData | LlcPduType::BlDataFcs => {
                s.kind = LlcPduKind::BlData;
                s.ns = Some(buf.read_field(1, "ns")? as u8);
            }
            LlcPduType::BlUdata | LlcPduType::BlUdataFcs => {
                s.kind = LlcPduKind::BlUdata;
            }
            LlcPduType::BlAck | LlcPduType::BlAckFcs => {
                s.kind = LlcPduKind::BlAck;
                s.nr = Some(buf.read_field(1, "nr")? as u8);
            }
            LlcPduType::AlSetup => {
                s.kind = LlcPduKind::AlSetup;
                has_sdu = false;
            }
            LlcPduType::AlDataAlFinal => {
                let is_final = buf.read_field(1, "final")? == 1;
                s.ar = buf.read_field(1, "ar")? == 1 && is_final;
                s.ns = Some(buf.read_field(3, "ns")? as u8);
                s.ss = Some(buf.read_field(8, "ss")? as u8);
                s.kind = if is_final { LlcPduKind::AlFinal } else { LlcPduKind::AlData };
            }
            LlcPduType::AlUdataAlUfinal => {
                let is_final = buf.read_field(1, "final")? == 1;
                s.ns = Some(buf.read_field(8, "ns")? as u8);
                s.ss = Some(buf.read_field(8, "ss")? as u8);
                s.kind = if is_final { LlcPduKind::AlUfinal } else { LlcPduKind::AlUdata };
            }
            LlcPduType::AlAckAlRnr => {
                s.kind = if buf.read_field(1, "ack")? == 1 { LlcPduKind::AlAck } else { LlcPduKind::AlRnr };
                has_sdu = false;
            }
            LlcPduType::AlReconnect => {
                s.kind = LlcPduKind::AlReconnect;
                has_sdu = false;
            }
            LlcPduType::AlDisc => {
                s.kind = LlcPduKind::AlDisc;
                has_sdu = false;
            }
            LlcPduType::SuppLlcPdu | LlcPduType::L2SigPdu => {
                has_sdu = false;
            }
        }

        s.tl_sdu_offset = buf.get_pos() - start;
        if !has_sdu {
            return Ok(s);
        }

        s.tl_sdu_len = buf.get_len_remaining();
        if pdu_type.has_fcs() {
            s.tl_sdu_len -= 32;
            let fcs_pos = buf.get_pos() + s.tl_sdu_len;
            let fcs = buf.peek_bits_startoffset(fcs_pos, 32)
                .ok_or(PduParseErr::BufferEnded { field: Some("fcs") })?;
            buf.truncate_tail(32);
            s.fcs = Some(fcs as u32);
            s.fcs_valid = compute_fcs(buf.remaining_bits()) == fcs as u32;
        }

        Ok(s)
    }

    pub fn name(&self) -> &'static str {
        self.pdu_type.name()
    }
}

impl fmt::Display for LlcPdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(nr) = self.nr {
            write!(f, " N(R)={}", nr)?;
        }
        if let Some(ns) = self.ns {
            write!(f, " N(S)={}", ns)?;
        }
        if let Some(ss) = self.ss {
            write!(f, " S(S)={}", ss)?;
        }
        if self.fcs.is_some() {
            write!(f, " FCS={}", if self.fcs_valid { "OK" } else { "BAD" })?;
        }
        write!(f, " TL-SDU {} bits", self.tl_sdu_len)
    }
}
