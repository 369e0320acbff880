use core::fmt;

use tetra_core::{BitBuffer, Layer, TdmaTime, TetraAddress};
use tetra_pdus::cmce::enums::cmce_pdu_type_dl::CmcePduTypeDl;
use tetra_pdus::mle::enums::mle_pdu_type_dl::MlePduTypeDl;
use tetra_pdus::mle::enums::mle_protocol_discriminator::MleProtocolDiscriminator;
use tetra_pdus::mm::enums::mm_pdu_type_dl::MmPduTypeDl;
use tetra_pdus::sndcp::enums::sndcp_pdu_type::SndcpPduType;
use tetra_pdus::sndcp::pdus::sn_data_header::SnDataHeader;
use tetra_saps::tla::TlaTlDataIndBl;


/// What the MLE found in a TL-SDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MleContent {
    Mm(MmPduTypeDl),
    Cmce(CmcePduTypeDl),
    Sndcp(SndcpPduType),
    /// SN-DATA or SN-UNITDATA, with the decoded header
    SndcpData(SnDataHeader),
    Mle(MlePduTypeDl),
    /// TETRA management entity or testing PDUs, not looked into
    Other(MleProtocolDiscriminator),
    /// Protocol discriminator known, but the PDU type is reserved
    UnknownType(MleProtocolDiscriminator, u64),
}

impl fmt::Display for MleContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MleContent::Mm(t) => write!(f, "MM {}", t),
            MleContent::Cmce(t) => write!(f, "CMCE {}", t),
            MleContent::Sndcp(t) => write!(f, "SNDCP {}", t),
            MleContent::SndcpData(hdr) => write!(f, "SNDCP {}", hdr),
            MleContent::Mle(t) => write!(f, "MLE {}", t),
            MleContent::Other(pdisc) => write!(f, "{}", pdisc),
            MleContent::UnknownType(pdisc, t) => write!(f, "{} unknown PDU type {}", pdisc, t),
        }
    }
}

/// A TL-SDU as identified by the MLE
#[derive(Debug, Clone)]
pub struct MleUnitdata {
    pub main_address: TetraAddress,
    pub endpoint_id: u8,
    pub content: MleContent,
    pub time: TdmaTime,
}

/// Receive side of the mobile link entity: routes TL-SDUs by protocol discriminator
/// and names the PDU they carry. MM, CMCE and SNDCP PDUs are not decoded any further.
#[derive(Default)]
pub struct Mle {}

impl Mle {
    pub fn new() -> Self {
        Self {}
    }

    pub fn rx_tla_data_ind(&mut self, prim: TlaTlDataIndBl) -> Option<MleUnitdata> {
        tracing::trace!("rx_tla_data_ind");

        let mut sdu = prim.tl_sdu;
        if sdu.seek_layer(Layer::L3).is_none() {
            tracing::warn!("rx_tla_data_ind: TL-SDU without L3 marker: {}", sdu.dump_bin());
            return None;
        }

        let Some(bits) = sdu.read_bits(3) else {
            tracing::warn!("insufficient bits: {}", sdu.dump_bin());
            return None;
        };
        let Ok(pdisc) = MleProtocolDiscriminator::try_from(bits) else {
            tracing::warn!("rx_tla_data_ind: invalid protocol discriminator {} in {}", bits, sdu.dump_bin());
            return None;
        };
        sdu.set_layer(Layer::L4, sdu.get_pos());

        let content = Self::identify(pdisc, &mut sdu)?;
        tracing::info!("{} {} TN{} {}", prim.time, prim.main_address, prim.endpoint_id, content);

        Some(MleUnitdata {
            main_address: prim.main_address,
            endpoint_id: prim.endpoint_id,
            content,
            time: prim.time,
        })
    }

    fn identify(pdisc: MleProtocolDiscriminator, sdu: &mut BitBuffer) -> Option<MleContent> {
        let type_len = match pdisc {
            MleProtocolDiscriminator::Mm => 4,
            MleProtocolDiscriminator::Cmce => 5,
            MleProtocolDiscriminator::Sndcp => 4,
            MleProtocolDiscriminator::Mle => 3,
            MleProtocolDiscriminator::TetraManagementEntity | MleProtocolDiscriminator::Testing => {
                return Some(MleContent::Other(pdisc));
            }
        };
        let Some(t) = sdu.read_bits(type_len) else {
            tracing::warn!("rx_tla_data_ind: {} PDU too short: {}", pdisc, sdu.dump_bin());
            return None;
        };

        let content = match pdisc {
            MleProtocolDiscriminator::Mm => MmPduTypeDl::try_from(t).ok().map(MleContent::Mm),
            MleProtocolDiscriminator::Cmce => CmcePduTypeDl::try_from(t).ok().map(MleContent::Cmce),
            MleProtocolDiscriminator::Mle => MlePduTypeDl::try_from(t).ok().map(MleContent::Mle),
            MleProtocolDiscriminator::Sndcp => match SndcpPduType::try_from(t) {
                Ok(pdu_type @ (SndcpPduType::SnData | SndcpPduType::SnUnitdata)) => {
                    match SnDataHeader::from_bitbuf(sdu, pdu_type) {
                        Ok(hdr) => Some(MleContent::SndcpData(hdr)),
                        Err(e) => {
                            tracing::warn!("Failed parsing SnDataHeader: {:?} {}", e, sdu.dump_bin());
                            Some(MleContent::Sndcp(pdu_type))
                        }
                    }
                }
                Ok(pdu_type) => Some(MleContent::Sndcp(pdu_type)),
                Err(_) => None,
            },
            MleProtocolDiscriminator::TetraManagementEntity | MleProtocolDiscriminator::Testing => None,
        };

        Some(content.unwrap_or(MleContent::UnknownType(pdisc, t)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tetra_core::debug;

    fn tla(bitstr: &str) -> TlaTlDataIndBl {
        let mut tl_sdu = BitBuffer::from_bitstr(bitstr);
        tl_sdu.set_layer(Layer::L3, 0);
        TlaTlDataIndBl {
            main_address: TetraAddress::ssi(7015011),
            endpoint_id: 1,
            tl_sdu,
            fcs_pass: None,
            acknowledged: true,
            time: TdmaTime::default(),
        }
    }

    #[test]
    fn test_cmce_sds() {
        debug::setup_logging_verbose();
        let mut mle = Mle::new();
        let ind = mle.rx_tla_data_ind(tla("010 01111 0000000")).unwrap();
        assert_eq!(ind.content, MleContent::Cmce(CmcePduTypeDl::DSdsData));
        assert_eq!(ind.main_address.ssi, 7015011);
    }

    #[test]
    fn test_pdiscs() {
        let mut mle = Mle::new();
        let content = |mle: &mut Mle, s: &str| mle.rx_tla_data_ind(tla(s)).map(|i| i.content);

        assert_eq!(content(&mut mle, "001 0101 00"), Some(MleContent::Mm(MmPduTypeDl::DLocationUpdateAccept)));
        assert_eq!(content(&mut mle, "101 010 1111"), Some(MleContent::Mle(MlePduTypeDl::DNwrkBroadcast)));
        assert_eq!(content(&mut mle, "100 1000"), Some(MleContent::Sndcp(SndcpPduType::SnEndOfData)));
        assert_eq!(content(&mut mle, "001 1000"), Some(MleContent::UnknownType(MleProtocolDiscriminator::Mm, 8)));
        assert_eq!(content(&mut mle, "110 0000"), Some(MleContent::Other(MleProtocolDiscriminator::TetraManagementEntity)));
        // Reserved discriminator, and a PDU type cut short
        assert_eq!(content(&mut mle, "000 0000"), None);
        assert_eq!(content(&mut mle, "010 01"), None);
    }

    #[test]
    fn test_sndcp_unitdata() {
        let mut mle = Mle::new();
        let mut bits = String::from("100 0100 0001 0000 0000 0100 0101");
        bits.push_str(&"0".repeat(64));
        bits.push_str("00000110");
        let ind = mle.rx_tla_data_ind(tla(&bits)).unwrap();
        let MleContent::SndcpData(hdr) = ind.content else {
            panic!("expected SN-UNITDATA, got {}", ind.content);
        };
        assert_eq!(hdr.nsapi, 1);
        assert_eq!(hdr.ip, Some((4, 20, 6)));
    }
}
