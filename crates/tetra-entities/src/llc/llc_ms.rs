use tetra_core::Layer;
use tetra_pdus::llc::pdus::llc_pdu::{LlcPdu, LlcPduKind};
use tetra_saps::tla::TlaTlDataIndBl;
use tetra_saps::tma::TmaUnitdataInd;


/// Receive side of the logical link control. Strips the LLC header (and FCS, when
/// present) from TM-SDUs and hands basic link TL-SDUs to the MLE. No link state is
/// kept, as the receiver never acknowledges.
#[derive(Default)]
pub struct Llc {
    /// PDUs parsed, for the status line
    rx_count: u64,
    fcs_errors: u64,
}

impl Llc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rx_count(&self) -> u64 {
        self.rx_count
    }

    pub fn fcs_errors(&self) -> u64 {
        self.fcs_errors
    }

    pub fn rx_tma_unitdata_ind(&mut self, prim: TmaUnitdataInd) -> Option<TlaTlDataIndBl> {
        tracing::trace!("rx_tma_unitdata_ind");

        let mut pdu = prim.pdu;
        if pdu.seek_layer(Layer::L2).is_none() {
            tracing::warn!("rx_tma_unitdata_ind: TM-SDU without L2 marker: {}", pdu.dump_bin());
            return None;
        }

        let llc = match LlcPdu::from_bitbuf(&mut pdu) {
            Ok(llc) => llc,
            Err(e) => {
                tracing::warn!("Failed parsing LlcPdu: {:?} {}", e, pdu.dump_bin());
                return None;
            }
        };
        self.rx_count += 1;
        tracing::debug!("<- {} {} {}", prim.time, prim.main_address, llc);

        if !llc.fcs_valid {
            self.fcs_errors += 1;
            tracing::warn!("rx_tma_unitdata_ind: FCS check failed for {} from {}", llc.name(), prim.main_address);
            return None;
        }

        let acknowledged = match llc.kind {
            LlcPduKind::BlAdata | LlcPduKind::BlData => true,
            LlcPduKind::BlUdata | LlcPduKind::BlAck => false,
            other => {
                // Advanced link segments are not reassembled
                tracing::debug!("rx_tma_unitdata_ind: {} not passed to MLE", other);
                return None;
            }
        };
        if llc.tl_sdu_len == 0 {
            return None;
        }

        let tl_sdu_start = pdu.get_pos();
        pdu.set_layer(Layer::L3, tl_sdu_start);

        Some(TlaTlDataIndBl {
            main_address: prim.main_address,
            endpoint_id: prim.endpoint_id,
            tl_sdu: pdu,
            fcs_pass: llc.fcs.map(|_| llc.fcs_valid),
            acknowledged,
            time: prim.time,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tetra_core::{BitBuffer, TdmaTime, TetraAddress, debug};
    use tetra_pdus::llc::pdus::llc_pdu::compute_fcs;

    /// TM-SDU with `mac_hdr` bits of MAC header in front of the LLC PDU
    fn tma(mac_hdr: usize, llc: &[u8]) -> TmaUnitdataInd {
        let mut pdu = BitBuffer::new_autoexpand(64);
        pdu.write_zeroes(mac_hdr);
        pdu.write_bitarr(llc);
        pdu.seek(0);
        pdu.set_layer(Layer::L2, mac_hdr);
        TmaUnitdataInd {
            pdu,
            main_address: TetraAddress::ssi(2001),
            scrambling_code: 3,
            endpoint_id: 2,
            air_interface_encryption: 0,
            num_frags: 1,
            time: TdmaTime::default(),
        }
    }

    #[test]
    fn test_bl_data() {
        debug::setup_logging_verbose();
        let mut llc = Llc::new();
        // BL-DATA N(S)=1, then CMCE D-SDS-DATA
        let bits = BitBuffer::from_bitstr("0001 1 010 01111 0110");
        let ind = llc.rx_tma_unitdata_ind(tma(43, bits.as_bits())).unwrap();

        assert!(ind.acknowledged);
        assert_eq!(ind.fcs_pass, None);
        assert_eq!(ind.endpoint_id, 2);
        assert_eq!(ind.main_address.ssi, 2001);
        assert_eq!(ind.tl_sdu.layer_offset(Layer::L3), Some(48));
        assert_eq!(ind.tl_sdu.layer_bits(Layer::L3), BitBuffer::from_bitstr("010011110110").as_bits());
        assert_eq!(llc.rx_count(), 1);
    }

    #[test]
    fn test_bl_udata_fcs() {
        let mut llc = Llc::new();
        let sdu = BitBuffer::from_bitstr("0010011000011111");
        let mut bits = BitBuffer::new_autoexpand(64);
        bits.write_bits(0b0110, 4);
        bits.write_bitarr(sdu.as_bits());
        bits.write_bits(compute_fcs(sdu.as_bits()) as u64, 32);

        let ind = llc.rx_tma_unitdata_ind(tma(20, bits.as_bits())).unwrap();
        assert!(!ind.acknowledged);
        assert_eq!(ind.fcs_pass, Some(true));
        assert_eq!(ind.tl_sdu.layer_bits(Layer::L3), sdu.as_bits());

        // Corrupt one TL-SDU bit
        let mut bad = bits.as_bits().to_vec();
        bad[7] ^= 1;
        assert!(llc.rx_tma_unitdata_ind(tma(20, &bad)).is_none());
        assert_eq!(llc.fcs_errors(), 1);
    }

    #[test]
    fn test_not_delivered() {
        let mut llc = Llc::new();

        // AL-RNR carries no TL-SDU
        let bits = BitBuffer::from_bitstr("1011 0 1111");
        assert!(llc.rx_tma_unitdata_ind(tma(16, bits.as_bits())).is_none());

        // No L2 marker
        let mut prim = tma(16, bits.as_bits());
        prim.pdu.clear_layers();
        assert!(llc.rx_tma_unitdata_ind(prim).is_none());
        assert_eq!(llc.rx_count(), 1);
    }
}
