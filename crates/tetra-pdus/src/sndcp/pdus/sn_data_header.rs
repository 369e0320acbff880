use core::fmt;

use tetra_core::BitBuffer;
use tetra_core::pdu_parse_error::PduParseErr;

use crate::sndcp::enums::sndcp_pdu_type::SndcpPduType;


/// Clause 28.4.4 SN-DATA / SN-UNITDATA header fields preceding the N-PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnDataHeader {
    pub pdu_type: SndcpPduType,
    // 4
    pub nsapi: u8,
    // 4
    pub pcomp: u8,
    // 4
    pub dcomp: u8,
    /// Version, header length in octets and protocol of an uncompressed IPv4 N-PDU
    pub ip: Option<(u8, u8, u8)>,
}

impl SnDataHeader {
    /// Parses the header following the 4-bit SNDCP PDU type, which must already have been read
    pub fn from_bitbuf(buf: &mut BitBuffer, pdu_type: SndcpPduType) -> Result<Self, PduParseErr> {
        let nsapi = buf.read_field(4, "nsapi")? as u8;
        let pcomp = buf.read_field(4, "pcomp")? as u8;
        let dcomp = buf.read_field(4, "dcomp")? as u8;

        // Peek into the IP header when it is not compressed, without consuming it
        let ip = if pcomp == 0 && dcomp == 0 {
            let pos = buf.get_pos();
            match (buf.peek_bits_startoffset(pos, 4), buf.peek_bits_startoffset(pos + 4, 4), buf.peek_bits_startoffset(pos + 72, 8)) {
                (Some(v), Some(ihl), Some(proto)) => Some((v as u8, ihl as u8 * 4, proto as u8)),
                _ => None,
            }
        } else {
            None
        };

        Ok(SnDataHeader { pdu_type, nsapi, pcomp, dcomp, ip })
    }
}

impl fmt::Display for SnDataHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} NSAPI={} PCOMP={}, DCOMP={}", self.pdu_type, self.nsapi, self.pcomp, self.dcomp)?;
        if let Some((version, ihl, proto)) = self.ip {
            write!(f, " V{}, IHL={} Proto={}", version, ihl, proto)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unitdata_with_ipv4() {
        // NSAPI 1, no compression, then an IPv4 header with IHL 5 and protocol 17
        let mut bits = String::from("0001 0000 0000 0100 0101");
        bits.push_str(&"0".repeat(64));
        bits.push_str("00010001");
        let mut buf = BitBuffer::from_bitstr(&bits);
        let hdr = SnDataHeader::from_bitbuf(&mut buf, SndcpPduType::SnUnitdata).unwrap();
        assert_eq!(hdr.nsapi, 1);
        assert_eq!(hdr.ip, Some((4, 20, 17)));
        assert_eq!(buf.get_pos(), 12);
        assert_eq!(hdr.to_string(), "SN-UNITDATA NSAPI=1 PCOMP=0, DCOMP=0 V4, IHL=20 Proto=17");
    }

    #[test]
    fn test_compressed_has_no_ip_view() {
        let mut buf = BitBuffer::from_bitstr("0101 0001 0000 1111");
        let hdr = SnDataHeader::from_bitbuf(&mut buf, SndcpPduType::SnData).unwrap();
        assert_eq!((hdr.nsapi, hdr.pcomp), (5, 1));
        assert_eq!(hdr.ip, None);
    }
}
