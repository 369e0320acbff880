use tetra_core::{AddressType, BitBuffer, Layer, TetraAddress};
use tetra_saps::tma::TmaUnitdataInd;
use tetra_saps::tmv::TmvUnitdataInd;
use tetra_saps::tmv::enums::logical_chans::LogicalChannel;

use tetra_pdus::umac::enums::broadcast_type::BroadcastType;
use tetra_pdus::umac::enums::mac_pdu_type::MacPduType;
use tetra_pdus::umac::enums::mac_resource_length::MacResourceLength;
use tetra_pdus::umac::pdus::access_assign::AccessAssign;
use tetra_pdus::umac::pdus::mac_d_blck::MacDBlck;
use tetra_pdus::umac::pdus::mac_end_dl::MacEndDl;
use tetra_pdus::umac::pdus::mac_frag_dl::MacFragDl;
use tetra_pdus::umac::pdus::mac_resource::MacResource;
use tetra_pdus::umac::pdus::mac_sysinfo::{CckOrHyperframe, MacSysinfo};

use crate::crypto::TetraCrypto;
use crate::lmac::lmac_ms::CurBurst;
use crate::status::ReceiverStatus;
use crate::umac::subcomp::fillbits;
use crate::umac::subcomp::ms_defrag::{FirstFragment, MsDefrag};

/// A block ending in fewer bits than a Null PDU carries no further MAC PDUs
const MIN_PDU_BITS: usize = 16;

/// State shared with the rest of the receive chain, borrowed for the duration of one block
pub struct UmacCtx<'a> {
    pub crypto: &'a mut TetraCrypto,
    pub cur_burst: &'a mut CurBurst,
    pub status: &'a mut ReceiverStatus,
}

/// Everything the upper MAC produces from one block
#[derive(Debug, Default)]
pub struct UmacOutput {
    /// TM-SDUs for the LLC, in the order they completed
    pub tma: Vec<TmaUnitdataInd>,
    /// Hyperframe number broadcast in SYSINFO, to be applied to cell time
    pub hyperframe: Option<u16>,
}

/// Outcome of parsing one MAC PDU inside a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parsed {
    /// The PDU extends to the end of the block, or the rest of the block can't be parsed
    SlotFilled,
    /// The PDU took this many bits, including fill bits. Another PDU may follow.
    Consumed(usize),
}

/// Downlink upper MAC: splits MAC blocks into PDUs, decrypts them, reassembles
/// fragmented TM-SDUs and delivers them towards the LLC.
#[derive(Default)]
pub struct UmacMs {
    defrag: MsDefrag,
    /// Hyperframe and multiframe of the last fragment slot aging pass
    last_aged: Option<(u16, u8)>,
    /// Frequency band and offset index of the serving cell, from SYSINFO
    cell_band: Option<(u8, u8)>,
}

impl UmacMs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defrag(&self) -> &MsDefrag {
        &self.defrag
    }

    pub fn rx_tmv_block(&mut self, mut prim: TmvUnitdataInd, ctx: &mut UmacCtx) -> UmacOutput {
        tracing::trace!("rx_tmv_block: {:?} {:?} {}", prim.logical_channel, prim.block_num, prim.time);
        let mut out = UmacOutput::default();

        if !prim.crc_pass {
            return out;
        }

        // Fragment slots age once per multiframe
        if prim.time.f == 18 && self.last_aged != Some((prim.time.h, prim.time.m)) {
            self.last_aged = Some((prim.time.h, prim.time.m));
            self.defrag.age_buffers();
        }

        match prim.logical_channel {
            LogicalChannel::Aach => {
                self.rx_tmv_aach(&mut prim, ctx);
            }
            LogicalChannel::Bnch
            | LogicalChannel::Unknown
            | LogicalChannel::SchF
            | LogicalChannel::SchHd
            | LogicalChannel::Stch => {
                self.rx_tmv_sch(&mut prim, ctx, &mut out);
            }
            LogicalChannel::Bsch | LogicalChannel::TchS => {}
        }

        out
    }

    fn rx_tmv_aach(&mut self, prim: &mut TmvUnitdataInd, ctx: &mut UmacCtx) {
        let aa = match AccessAssign::from_bitbuf(&mut prim.pdu, prim.time.f == 18) {
            Ok(aa) => aa,
            Err(e) => {
                tracing::warn!("Failed parsing AccessAssign: {:?} {}", e, prim.pdu.dump_bin());
                return;
            }
        };
        tracing::debug!("<- {} {}", prim.time, aa);

        let status = &mut *ctx.status;
        status.access1_code = aa.access1.map(|a| a.code_letter());
        status.access2_code = aa.access2.map(|a| a.code_letter());
        status.dl_usage = aa.dl_usage.map_or(0, |u| u.to_usage_marker());
        status.ul_usage = aa.ul_usage.map_or(0, |u| u.to_usage_marker());

        *ctx.cur_burst = CurBurst {
            is_traffic: aa.is_traffic(),
            usage: aa.dl_usage.map(|u| u.to_usage_marker()),
            blk1_stolen: false,
            blk2_stolen: false,
        };
    }

    /// Parses all MAC PDUs in a signalling block. The pdu window is moved past each
    /// PDU until the block is used up.
    fn rx_tmv_sch(&mut self, prim: &mut TmvUnitdataInd, ctx: &mut UmacCtx, out: &mut UmacOutput) {
        let block_end = prim.pdu.get_raw_end();

        loop {
            if prim.pdu.get_len() <= MIN_PDU_BITS {
                break;
            }
            prim.pdu.seek(0);
            prim.pdu.clear_layers();

            let n = match self.rx_mac_pdu(prim, ctx, out) {
                Parsed::SlotFilled | Parsed::Consumed(0) => break,
                Parsed::Consumed(n) => n,
            };

            let next = prim.pdu.get_raw_start() + n;
            if next >= block_end {
                break;
            }
            prim.pdu.set_raw_end(block_end);
            prim.pdu.set_raw_start(next);
            tracing::trace!("rx_tmv_sch: {} bits left: {}", prim.pdu.get_len(), prim.pdu.dump_bin());
        }
    }

    fn rx_mac_pdu(&mut self, prim: &mut TmvUnitdataInd, ctx: &mut UmacCtx, out: &mut UmacOutput) -> Parsed {
        let Some(bits) = prim.pdu.peek_bits_startoffset(0, 3) else {
            return Parsed::SlotFilled;
        };
        let Ok(pdu_type) = MacPduType::try_from(bits >> 1) else {
            return Parsed::SlotFilled;
        };
        tracing::trace!("rx_mac_pdu: {} on {:?}", pdu_type.name(), prim.logical_channel);

        match pdu_type {
            MacPduType::MacResource => self.rx_mac_resource(prim, ctx, out),
            MacPduType::MacFragMacEnd => {
                // Third bit tells MAC-FRAG from MAC-END
                if bits & 1 == 0 {
                    self.rx_mac_frag(prim, ctx)
                } else {
                    self.rx_mac_end(prim, ctx, out)
                }
            }
            MacPduType::Broadcast => self.rx_broadcast(prim, ctx, out),
            MacPduType::Supplementary => self.rx_supp(prim, out),
        }
    }

    fn rx_broadcast(&mut self, prim: &mut TmvUnitdataInd, ctx: &mut UmacCtx, out: &mut UmacOutput) -> Parsed {
        let bits = prim.pdu.peek_bits_startoffset(2, 2).unwrap_or(3);
        match BroadcastType::try_from(bits) {
            Ok(BroadcastType::Sysinfo) => {
                self.rx_broadcast_sysinfo(prim, ctx, out);
            }
            Ok(other) => {
                tracing::debug!("rx_broadcast: {:?} not decoded", other);
            }
            Err(_) => {
                tracing::debug!("rx_broadcast: reserved broadcast type {}", bits);
            }
        }
        Parsed::SlotFilled
    }

    fn rx_broadcast_sysinfo(&mut self, prim: &mut TmvUnitdataInd, ctx: &mut UmacCtx, out: &mut UmacOutput) {
        let pdu = match MacSysinfo::from_bitbuf(&mut prim.pdu) {
            Ok(pdu) => pdu,
            Err(e) => {
                tracing::warn!("Failed parsing MacSysinfo: {:?} {}", e, prim.pdu.dump_bin());
                return;
            }
        };
        tracing::debug!("<- {}", pdu);

        let (dl_freq, ul_freq) = pdu.freq_info().get_freqs();
        let la = pdu.mle_sysinfo.location_area;
        let status = &mut *ctx.status;
        status.dl_freq = dl_freq;
        status.ul_freq = ul_freq;
        status.la = la;
        status.service_details = Some(pdu.mle_sysinfo.bs_service_details);
        self.cell_band = Some((pdu.freq_band, pdu.freq_offset_index));

        ctx.crypto.set_la(la);
        ctx.crypto.set_cn(pdu.main_carrier);
        match pdu.cck_or_hyperframe {
            CckOrHyperframe::CckId(cck_id) => {
                ctx.crypto.set_cck_id(cck_id);
            }
            CckOrHyperframe::Hyperframe(hn) => {
                status.curr_hyperframe = hn;
                ctx.crypto.set_hn(hn);
                out.hyperframe = Some(hn);
            }
        }
    }

    fn rx_mac_resource(&mut self, prim: &mut TmvUnitdataInd, ctx: &mut UmacCtx, out: &mut UmacOutput) -> Parsed {
        let mut pdu = match MacResource::from_bitbuf(&mut prim.pdu, false) {
            Ok(pdu) => pdu,
            Err(e) => {
                tracing::warn!("Failed parsing MacResource: {:?} {}", e, prim.pdu.dump_bin());
                return Parsed::SlotFilled;
            }
        };
        if pdu.is_null_pdu() {
            tracing::trace!("rx_mac_resource: Null PDU");
            return Parsed::SlotFilled;
        }

        let block_len = prim.pdu.get_len();
        let (mut pdu_len_bits, consumed) = match pdu.length() {
            Some(MacResourceLength::Octets(n)) => {
                let bits = n as usize * 8;
                (bits, Parsed::Consumed(bits))
            }
            Some(MacResourceLength::SecondHalfSlotStolen) => {
                ctx.cur_burst.blk2_stolen = true;
                (block_len, Parsed::SlotFilled)
            }
            Some(MacResourceLength::StartOfFragmentation) => (block_len, Parsed::SlotFilled),
            None => {
                tracing::warn!("rx_mac_resource: reserved length_ind {}", pdu.length_ind);
                return Parsed::SlotFilled;
            }
        };
        if pdu_len_bits > block_len {
            tracing::warn!("rx_mac_resource: length_ind {} exceeds block, truncating from {} to {}",
                pdu.length_ind, pdu_len_bits, block_len);
            pdu_len_bits = block_len;
        }

        if pdu.fill_bits {
            pdu_len_bits -= fillbits::removal::get_num_fill_bits(&prim.pdu, pdu_len_bits, false);
        }
        prim.pdu.set_len(pdu_len_bits);

        // Position is at the TM-SDU, or at the channel allocation if that is still encrypted
        let mut sdu_offset = prim.pdu.get_pos();
        let mut key = None;
        if pdu.is_encrypted && ctx.crypto.has_keys() {
            if let Err(e) = ctx.crypto.decrypt_identity(&mut pdu.addr) {
                tracing::trace!("rx_mac_resource: identity not decrypted: {}", e);
            }
            key = ctx.crypto.get_ksg_key(pdu.addr.ssi);
            if let Some(k) = &key {
                match ctx.crypto.decrypt_mac_element(prim, k, pdu_len_bits, sdu_offset) {
                    Ok(()) => {
                        pdu.is_encrypted = false;
                        if pdu.chan_alloc_flag {
                            prim.pdu.seek(sdu_offset);
                            match pdu.decode_chan_alloc(&mut prim.pdu) {
                                Ok(len) => sdu_offset += len,
                                Err(e) => {
                                    tracing::warn!("rx_mac_resource: bad channel allocation after decryption: {:?}", e);
                                    return consumed;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        tracing::debug!("rx_mac_resource: not decrypted: {}", e);
                    }
                }
            }
        }
        prim.pdu.set_layer(Layer::L2, sdu_offset);
        tracing::debug!("<- {} {}", prim.time, pdu);

        if let (Some(ca), Some((band, offset_idx))) = (&pdu.chan_alloc_element, self.cell_band) {
            tracing::info!("rx_mac_resource: ssi {} {}", pdu.addr.ssi, ca.dump(band, offset_idx));
        }

        if sdu_offset >= pdu_len_bits {
            return consumed;
        }
        if pdu.is_encrypted {
            tracing::debug!("rx_mac_resource: ssi {} still encrypted, not delivered", pdu.addr.ssi);
            return consumed;
        }

        if pdu.is_frag_start() {
            let first = FirstFragment {
                pdu: &prim.pdu,
                sdu_offset,
                addr: pdu.addr,
                encryption_mode: pdu.encryption_mode,
                key,
                scrambling_code: prim.scrambling_code,
            };
            self.defrag.insert_first(first, prim.time);
        } else {
            let mut sdu = BitBuffer::from_bitbuffer(&prim.pdu);
            sdu.set_layer(Layer::L2, sdu_offset);
            out.tma.push(TmaUnitdataInd {
                pdu: sdu,
                main_address: pdu.addr,
                scrambling_code: prim.scrambling_code,
                endpoint_id: prim.time.t,
                air_interface_encryption: pdu.encryption_mode,
                num_frags: 1,
                time: prim.time,
            });
        }

        consumed
    }

    fn rx_mac_frag(&mut self, prim: &mut TmvUnitdataInd, ctx: &mut UmacCtx) -> Parsed {
        if let Err(e) = MacFragDl::from_bitbuf(&mut prim.pdu) {
            tracing::warn!("Failed parsing MacFragDl: {:?} {}", e, prim.pdu.dump_bin());
            return Parsed::SlotFilled;
        }

        let slot = self.defrag.get(prim.time);
        if !slot.is_active() {
            tracing::warn!("rx_mac_frag: no fragmented SDU open on timeslot {}", prim.time.t);
            return Parsed::SlotFilled;
        }
        let (encrypted, key) = (slot.is_encrypted(), slot.key);

        // A MAC-FRAG always fills the rest of the block
        let fill_bit_flag = prim.pdu.peek_bits_startoffset(3, 1) == Some(1);
        let mut pdu_len_bits = prim.pdu.get_len();
        if fill_bit_flag {
            pdu_len_bits -= fillbits::removal::get_num_fill_bits(&prim.pdu, pdu_len_bits, false);
        }
        prim.pdu.set_len(pdu_len_bits);

        let sdu_offset = MacFragDl::HDR_LEN;
        if let (true, Some(k)) = (encrypted, &key) {
            if let Err(e) = ctx.crypto.decrypt_mac_element(prim, k, pdu_len_bits, sdu_offset) {
                tracing::debug!("rx_mac_frag: not decrypted: {}", e);
            }
        }

        prim.pdu.seek(sdu_offset.min(pdu_len_bits));
        self.defrag.insert_next(prim.pdu.remaining_bits(), prim.time);
        Parsed::SlotFilled
    }

    fn rx_mac_end(&mut self, prim: &mut TmvUnitdataInd, ctx: &mut UmacCtx, out: &mut UmacOutput) -> Parsed {
        let slot = self.defrag.get(prim.time);
        let active = slot.is_active();
        let (encrypted, key, encryption_mode) = (slot.is_encrypted(), slot.key, slot.encryption_mode);

        let mut pdu = match MacEndDl::from_bitbuf(&mut prim.pdu, encrypted) {
            Ok(pdu) => pdu,
            Err(e) => {
                tracing::warn!("Failed parsing MacEndDl: {:?} {}", e, prim.pdu.dump_bin());
                self.defrag.discard(prim.time);
                return Parsed::SlotFilled;
            }
        };
        tracing::debug!("<- {} {}", prim.time, pdu);

        let block_len = prim.pdu.get_len();
        let consumed = Parsed::Consumed(pdu.pdu_bits());
        if !active {
            tracing::warn!("rx_mac_end: no fragmented SDU open on timeslot {}", prim.time.t);
            return consumed;
        }

        let mut pdu_len_bits = pdu.pdu_bits();
        if pdu_len_bits == 0 || pdu_len_bits > block_len {
            tracing::warn!("rx_mac_end: length_ind {} does not fit block of {} bits", pdu.length_ind, block_len);
            pdu_len_bits = block_len;
        }
        if pdu.fill_bits {
            pdu_len_bits -= fillbits::removal::get_num_fill_bits(&prim.pdu, pdu_len_bits, false);
        }
        prim.pdu.set_len(pdu_len_bits);

        let mut sdu_offset = prim.pdu.get_pos();
        let mut decrypted = !encrypted;
        if let (true, Some(k)) = (encrypted, &key) {
            sdu_offset = pdu.fixed_hdr_len();
            match ctx.crypto.decrypt_mac_element(prim, k, pdu_len_bits, sdu_offset) {
                Ok(()) => {
                    decrypted = true;
                    if pdu.chan_alloc_flag {
                        prim.pdu.seek(sdu_offset);
                        match pdu.decode_chan_alloc(&mut prim.pdu) {
                            Ok(len) => sdu_offset += len,
                            Err(e) => {
                                tracing::warn!("rx_mac_end: bad channel allocation after decryption: {:?}", e);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!("rx_mac_end: not decrypted: {}", e);
                }
            }
        }

        if let (Some(ca), Some((band, offset_idx))) = (&pdu.chan_alloc_element, self.cell_band) {
            tracing::info!("rx_mac_end: {}", ca.dump(band, offset_idx));
        }

        prim.pdu.seek(sdu_offset.min(pdu_len_bits));
        self.defrag.insert_last(prim.pdu.remaining_bits(), prim.time);

        if decrypted {
            if let Some(defragbuf) = self.defrag.take_defragged_buf(prim.time) {
                tracing::debug!("rx_mac_end: ssi {} reassembled {} bits from {} fragments",
                    defragbuf.addr.ssi, defragbuf.sdu_len, defragbuf.num_frags);
                out.tma.push(TmaUnitdataInd {
                    pdu: defragbuf.buffer,
                    main_address: defragbuf.addr,
                    scrambling_code: defragbuf.scrambling_code,
                    endpoint_id: prim.time.t,
                    air_interface_encryption: encryption_mode,
                    num_frags: defragbuf.num_frags as u32,
                    time: prim.time,
                });
            }
        } else {
            tracing::debug!("rx_mac_end: reassembled SDU still encrypted, not delivered");
        }
        self.defrag.discard(prim.time);

        consumed
    }

    fn rx_supp(&mut self, prim: &mut TmvUnitdataInd, out: &mut UmacOutput) -> Parsed {
        if prim.logical_channel == LogicalChannel::Stch {
            tracing::debug!("rx_supp: MAC-U-SIGNAL on STCH ignored");
            return Parsed::SlotFilled;
        }

        let pdu = match MacDBlck::from_bitbuf(&mut prim.pdu) {
            Ok(pdu) => pdu,
            Err(e) => {
                tracing::warn!("Failed parsing MacDBlck: {:?} {}", e, prim.pdu.dump_bin());
                return Parsed::SlotFilled;
            }
        };
        tracing::debug!("<- {} {:?}", prim.time, pdu);

        let mut pdu_len_bits = prim.pdu.get_len();
        if pdu.fill_bits {
            pdu_len_bits -= fillbits::removal::get_num_fill_bits(&prim.pdu, pdu_len_bits, false);
        }
        prim.pdu.set_len(pdu_len_bits);

        let sdu_offset = pdu.sdu_offset();
        if pdu.encryption_mode > 0 {
            tracing::debug!("rx_supp: event label {} encrypted, not delivered", pdu.event_label);
            return Parsed::SlotFilled;
        }
        if sdu_offset >= pdu_len_bits {
            return Parsed::SlotFilled;
        }

        let mut addr = TetraAddress::new(AddressType::EventLabel, 0);
        addr.event_label = Some(pdu.event_label);
        let mut sdu = BitBuffer::from_bitbuffer(&prim.pdu);
        sdu.set_layer(Layer::L2, sdu_offset);
        out.tma.push(TmaUnitdataInd {
            pdu: sdu,
            main_address: addr,
            scrambling_code: prim.scrambling_code,
            endpoint_id: prim.time.t,
            air_interface_encryption: 0,
            num_frags: 1,
            time: prim.time,
        });
        Parsed::SlotFilled
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tetra_core::{PhyBlockNum, PhyBlockType, TdmaTime, debug};

    use crate::crypto::tetra_crypto::tests::{crypto_with_keys, ready};

    /// SDU reassembled from FRAG_START and FRAG_END
    const FRAG_SDU: &str = "00011010011110101101011111000010011000011000010010001100000000000110001010100000000100110010001100000011010000101100001100010";
    /// MAC-RESOURCE to SSI 7015011 starting a fragmented SDU
    const FRAG_START: &str = "0000000111111001011010110000101001100011000000110100111101011010111110000100110000110000100100011000000000001100010101000000";
    /// MAC-END with slot grant, followed by a Null PDU
    const FRAG_END: &str = "0111000100110000000000010011001000110000001101000010110000110001010000000000110000010000100000000000000000000000000000000000";

    struct Harness {
        umac: UmacMs,
        crypto: TetraCrypto,
        cur_burst: CurBurst,
        status: ReceiverStatus,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                umac: UmacMs::new(),
                crypto: TetraCrypto::default(),
                cur_burst: CurBurst::default(),
                status: ReceiverStatus::default(),
            }
        }

        fn rx(&mut self, prim: TmvUnitdataInd) -> UmacOutput {
            let mut ctx = UmacCtx {
                crypto: &mut self.crypto,
                cur_burst: &mut self.cur_burst,
                status: &mut self.status,
            };
            self.umac.rx_tmv_block(prim, &mut ctx)
        }
    }

    fn tmv(pdu: BitBuffer, lchan: LogicalChannel, block_num: PhyBlockNum, time: TdmaTime) -> TmvUnitdataInd {
        TmvUnitdataInd {
            pdu,
            block_num,
            block_type: PhyBlockType::NDB,
            logical_channel: lchan,
            crc_pass: true,
            scrambling_code: 0x3,
            time,
        }
    }

    fn sch_hd(bitstr: &str, time: TdmaTime) -> TmvUnitdataInd {
        tmv(BitBuffer::from_bitstr(bitstr), LogicalChannel::SchHd, PhyBlockNum::Block1, time)
    }

    fn aach(header: u64, field1: u64, field2: u64, time: TdmaTime) -> TmvUnitdataInd {
        let mut buf = BitBuffer::new(14);
        buf.write_bits(header, 2);
        buf.write_bits(field1, 6);
        buf.write_bits(field2, 6);
        buf.seek(0);
        tmv(buf, LogicalChannel::Aach, PhyBlockNum::Undefined, time)
    }

    #[test]
    fn test_resource_without_sdu() {
        debug::setup_logging_verbose();
        let mut h = Harness::new();

        // MAC-RESOURCE to SSI 7015050 with nothing but fill bits, then a Null PDU
        let out = h.rx(sch_hd("0010001000110001011010110000101010001010000100000000110000010000100000000000000000000000000000000000000000000000000000000000", TdmaTime::default()));
        assert!(out.tma.is_empty());
        assert!(out.hyperframe.is_none());
    }

    #[test]
    fn test_crc_fail_ignored() {
        let mut h = Harness::new();
        let mut prim = sch_hd(FRAG_START, TdmaTime::default());
        prim.crc_pass = false;
        h.rx(prim);
        assert!(!h.umac.defrag().get(TdmaTime::default()).is_active());
    }

    #[test]
    fn test_fragmented_sdu() {
        debug::setup_logging_verbose();
        let mut h = Harness::new();
        let t1 = TdmaTime { h: 0, m: 56, f: 1, t: 1, s: 1 };
        let t2 = t1.add_frames(1);

        let out = h.rx(sch_hd(FRAG_START, t1));
        assert!(out.tma.is_empty());
        assert!(h.umac.defrag().get(t1).is_active());

        let mut out = h.rx(sch_hd(FRAG_END, t2));
        assert_eq!(out.tma.len(), 1);
        let sdu = out.tma.pop().unwrap();
        assert_eq!(sdu.main_address.ssi, 7015011);
        assert_eq!(sdu.num_frags, 2);
        assert_eq!(sdu.endpoint_id, 1);
        assert_eq!(sdu.air_interface_encryption, 0);
        assert_eq!(sdu.scrambling_code, 0x3);
        assert_eq!(BitBuffer::from_bitarr(sdu.pdu.layer_bits(Layer::L2)).to_bitstr(), FRAG_SDU);
        assert!(!h.umac.defrag().get(t2).is_active());
    }

    #[test]
    fn test_end_without_start() {
        let mut h = Harness::new();
        let out = h.rx(sch_hd(FRAG_END, TdmaTime::default()));
        assert!(out.tma.is_empty());
    }

    #[test]
    fn test_fragments_age_out() {
        debug::setup_logging_verbose();
        let mut h = Harness::new();
        let t = TdmaTime { h: 0, m: 1, f: 1, t: 1, s: 1 };
        h.rx(sch_hd(FRAG_START, t));

        // Aging happens once per multiframe, however many blocks arrive in frame 18
        for m in 1..=5 {
            for tn in 1..=4 {
                h.rx(aach(0, 0, 0, TdmaTime { h: 0, m, f: 18, t: tn, s: 1 }));
            }
        }
        assert!(h.umac.defrag().get(t).is_active());

        h.rx(aach(0, 0, 0, TdmaTime { h: 0, m: 6, f: 18, t: 1, s: 1 }));
        assert!(!h.umac.defrag().get(t).is_active());

        let out = h.rx(sch_hd(FRAG_END, TdmaTime { h: 0, m: 7, f: 1, t: 1, s: 1 }));
        assert!(out.tma.is_empty());
    }

    #[test]
    fn test_sysinfo() {
        debug::setup_logging_verbose();
        let mut h = Harness::new();
        let prim = tmv(
            BitBuffer::from_bitstr("1000010000111111010001000000100001101001111100000000000000011101000011100000000000000000000000101111111111100101110101110111"),
            LogicalChannel::Bnch,
            PhyBlockNum::Block2,
            TdmaTime { h: 0, m: 7, f: 18, t: 2, s: 1 },
        );
        let out = h.rx(prim);

        assert!(out.tma.is_empty());
        assert!(out.hyperframe.is_none());
        assert_eq!(h.status.dl_freq, 427181250);
        assert_eq!(h.status.ul_freq, 417181250);
        assert_eq!(h.status.la, 2);
        assert!(h.status.air_encryption());
        assert_eq!(h.crypto.state().cck_id, Some(1));
        assert_eq!(h.crypto.state().la, Some(2));
        assert_eq!(h.crypto.state().cn, Some(1087));
    }

    #[test]
    fn test_aach_traffic() {
        let mut h = Harness::new();
        h.cur_burst.blk1_stolen = true;

        // DL and UL usage markers, not frame 18
        h.rx(aach(3, 9, 10, TdmaTime::default()));
        assert!(h.cur_burst.is_traffic);
        assert_eq!(h.cur_burst.usage, Some(9));
        assert!(!h.cur_burst.blk1_stolen);
        assert_eq!(h.status.dl_usage, 9);
        assert_eq!(h.status.ul_usage, 10);

        // Frame 18 only carries access fields
        h.rx(aach(0, 0b010001, 0b000010, TdmaTime { f: 18, ..TdmaTime::default() }));
        assert!(!h.cur_burst.is_traffic);
        assert_eq!(h.status.access1_code, Some('B'));
        assert_eq!(h.status.access2_code, Some('A'));
    }

    #[test]
    fn test_second_half_slot_stolen() {
        let mut h = Harness::new();
        h.cur_burst.is_traffic = true;
        h.cur_burst.blk1_stolen = true;

        let mut buf = BitBuffer::new(124);
        buf.write_bits(0, 4); // MAC-RESOURCE, no fill bits, no grant
        buf.write_bits(0, 2); // clear
        buf.write_bits(0, 1);
        buf.write_bits(0x3E, 6); // second half slot stolen
        buf.write_bits(1, 3); // SSI
        buf.write_bits(300, 24);
        buf.write_bits(0, 3);
        buf.seek(0);

        h.rx(tmv(buf, LogicalChannel::Stch, PhyBlockNum::Block1, TdmaTime::default()));
        assert!(h.cur_burst.blk1_stolen);
        assert!(h.cur_burst.blk2_stolen);
    }

    /// MAC-RESOURCE with encryption mode 1 to `ssi`, followed by `sdu`, no fill bits
    fn encrypted_resource(ssi: u32, sdu: &[u8]) -> BitBuffer {
        let len_bits = 43 + sdu.len();
        assert_eq!(len_bits % 8, 0);
        let mut buf = BitBuffer::new(124);
        buf.write_bits(0, 2); // MAC-RESOURCE
        buf.write_bits(0, 1); // fill bits
        buf.write_bits(0, 1); // position of grant
        buf.write_bits(1, 2); // encryption mode
        buf.write_bits(0, 1); // random access
        buf.write_bits((len_bits / 8) as u64, 6);
        buf.write_bits(1, 3); // SSI
        buf.write_bits(ssi as u64, 24);
        buf.write_bits(0, 3); // no power control, slot grant or channel allocation
        buf.write_bitarr(sdu);
        buf.seek(0);
        buf
    }

    #[test]
    fn test_encrypted_resource() {
        debug::setup_logging_verbose();
        let plain: Vec<u8> = (0..45).map(|_| rand::random_range(0..2u8)).collect();

        let mut h = Harness::new();
        h.crypto = crypto_with_keys();
        ready(&mut h.crypto);
        let key = h.crypto.get_ksg_key(1000).unwrap();
        let t = TdmaTime::default();
        let ks = h.crypto.generate_keystream(&key, t, plain.len()).unwrap();
        let cipher: Vec<u8> = plain.iter().zip(&ks).map(|(p, k)| p ^ k).collect();

        let mut out = h.rx(sch_hd(&encrypted_resource(1000, &cipher).to_bitstr(), t));
        assert_eq!(out.tma.len(), 1);
        let sdu = out.tma.pop().unwrap();
        assert_eq!(sdu.air_interface_encryption, 1);
        assert_eq!(sdu.main_address.ssi, 1000);
        assert_eq!(sdu.pdu.layer_bits(Layer::L2), &plain[..]);
    }

    #[test]
    fn test_encrypted_resource_without_key() {
        let mut h = Harness::new();
        let sdu = vec![1u8; 45];
        let out = h.rx(sch_hd(&encrypted_resource(1000, &sdu).to_bitstr(), TdmaTime::default()));
        assert!(out.tma.is_empty());
    }

    #[test]
    fn test_two_pdus_in_block() {
        let mut h = Harness::new();
        // Two clear MAC-RESOURCEs of 6 octets with 5 SDU bits each, then a Null PDU
        let mut buf = BitBuffer::new(124);
        for ssi in [100u64, 200] {
            buf.write_bits(0, 4);
            buf.write_bits(0, 2);
            buf.write_bits(0, 1);
            buf.write_bits(6, 6);
            buf.write_bits(1, 3);
            buf.write_bits(ssi, 24);
            buf.write_bits(0, 3);
            buf.write_bits(0b10111, 5);
        }
        buf.seek(0);

        let out = h.rx(tmv(buf, LogicalChannel::SchHd, PhyBlockNum::Block1, TdmaTime::default()));
        let ssis: Vec<u32> = out.tma.iter().map(|t| t.main_address.ssi).collect();
        assert_eq!(ssis, [100, 200]);
        for t in &out.tma {
            assert_eq!(t.pdu.get_len(), 48);
            assert_eq!(t.pdu.layer_bits(Layer::L2), &[1, 0, 1, 1, 1]);
        }
    }
}
