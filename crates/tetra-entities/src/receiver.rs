use std::sync::Arc;

use tetra_core::{TdmaTime, TrainingSequence};
use tetra_saps::tmd::TmdCircuitDataInd;
use tetra_saps::tmv::TmvUnitdataInd;

use crate::crypto::{CipherSuite, KeyStore, TetraCrypto};
use crate::llc::llc_ms::Llc;
use crate::lmac::lmac_ms::{CurBurst, LmacMs, SPEECH_FRAME_LEN, SyncInfo};
use crate::mle::mle_ms::{Mle, MleUnitdata};
use crate::phy::burst_split::{SlotContent, split_burst};
use crate::phy::burst_sync::{BurstSync, SlotEvent};
use crate::status::ReceiverStatus;
use crate::umac::umac_ms::{UmacCtx, UmacMs};
use crate::voice::VoiceBridge;

/// Something the receiver recovered from the bit stream
#[derive(Debug)]
pub enum RxEvent {
    /// A SYNC PDU passed its CRC, cell time was aligned to it
    Sync(SyncInfo),
    /// A TL-SDU made it through the MAC, LLC and MLE
    Sdu(MleUnitdata),
    /// Speech frame of a traffic slot, decrypted when the cell uses air interface encryption
    Voice(TmdCircuitDataInd),
    /// Burst synchronization was lost, the receiver is searching for SYNC again
    LockLost,
}

/// One downlink receive chain. Owns the cell time, the crypto state and all MAC state,
/// so independent receivers can run side by side.
pub struct Receiver {
    burst_sync: BurstSync,
    time: TdmaTime,
    lmac: LmacMs,
    umac: UmacMs,
    llc: Llc,
    mle: Mle,
    crypto: TetraCrypto,
    voice: Option<VoiceBridge>,
    status: ReceiverStatus,
    slots: u64,
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new(TetraCrypto::default())
    }
}

impl Receiver {
    pub fn new(crypto: TetraCrypto) -> Self {
        Self {
            burst_sync: BurstSync::new(),
            time: TdmaTime::default(),
            lmac: LmacMs::new(),
            umac: UmacMs::new(),
            llc: Llc::new(),
            mle: Mle::new(),
            crypto,
            voice: None,
            status: ReceiverStatus::default(),
            slots: 0,
        }
    }

    pub fn with_keys(keystore: Arc<KeyStore>, ciphers: Box<dyn CipherSuite>) -> Self {
        Self::new(TetraCrypto::new(keystore, ciphers))
    }

    /// Route speech frames of traffic slots through a codec
    pub fn set_voice_bridge(&mut self, bridge: VoiceBridge) {
        self.voice = Some(bridge);
    }

    pub fn voice_bridge(&self) -> Option<&VoiceBridge> {
        self.voice.as_ref()
    }

    /// Cell time of the last received timeslot
    pub fn time(&self) -> TdmaTime {
        self.time
    }

    pub fn status(&self) -> &ReceiverStatus {
        &self.status
    }

    pub fn crypto(&self) -> &TetraCrypto {
        &self.crypto
    }

    pub fn umac(&self) -> &UmacMs {
        &self.umac
    }

    pub fn llc(&self) -> &Llc {
        &self.llc
    }

    pub fn is_locked(&self) -> bool {
        self.burst_sync.is_locked()
    }

    /// Timeslots processed since the receiver was created
    pub fn slots_received(&self) -> u64 {
        self.slots
    }

    /// Feed demodulated bits, one bit per byte. Bits may arrive in chunks of any size.
    pub fn rx_bits(&mut self, bits: &[u8]) -> Vec<RxEvent> {
        let mut events = Vec::new();
        for ev in self.burst_sync.rx_bits(bits) {
            match ev {
                SlotEvent::Burst { bits, train_seq } => {
                    events.extend(self.rx_burst(&bits, train_seq));
                }
                SlotEvent::LockLost => {
                    tracing::warn!("rx_bits: lock lost at {} after {} slots", self.time, self.slots);
                    events.push(RxEvent::LockLost);
                }
            }
        }
        events
    }

    /// Process one synchronized 510-bit timeslot. Cell time advances by one slot first.
    pub fn rx_burst(&mut self, burst: &[u8], train_seq: TrainingSequence) -> Vec<RxEvent> {
        let mut events = Vec::new();
        self.time = self.time.add_timeslots(1);
        self.slots += 1;
        self.lmac.cur_burst = CurBurst::default();

        for mut blk in split_burst(burst, train_seq, self.time) {
            // A SYNC PDU earlier in this burst may have moved the cell time
            blk.time = self.time;
            let out = self.lmac.rx_tp_block(blk, &mut self.status);

            if let Some(sync) = out.sync {
                self.apply_sync(sync);
                events.push(RxEvent::Sync(sync));
            }
            if let Some(tmv) = out.tmv {
                self.rx_tmv(tmv, &mut events);
            }
            if let Some(voice) = out.voice {
                self.rx_voice(voice, &mut events);
            }
        }

        self.status.curr_hyperframe = self.time.h;
        self.status.curr_multiframe = self.time.m;
        self.status.curr_frame = self.time.f;
        self.status.timeslot_content[self.time.t as usize - 1] = SlotContent::classify(train_seq, self.lmac.cur_burst.is_traffic);
        events
    }

    fn apply_sync(&mut self, sync: SyncInfo) {
        let time = TdmaTime { h: self.time.h, m: sync.time.m, f: sync.time.f, t: sync.time.t, s: 1 };
        if time != self.time {
            tracing::debug!("apply_sync: cell time {} -> {}", self.time, time);
        }
        self.time = time;

        self.crypto.set_cc(sync.colour_code);
        let st = self.crypto.state();
        if st.mcc != Some(sync.mcc) || st.mnc != Some(sync.mnc) {
            self.crypto.update_current_network(sync.mcc, sync.mnc);
        }
    }

    fn rx_tmv(&mut self, tmv: TmvUnitdataInd, events: &mut Vec<RxEvent>) {
        let mut ctx = UmacCtx {
            crypto: &mut self.crypto,
            cur_burst: &mut self.lmac.cur_burst,
            status: &mut self.status,
        };
        let out = self.umac.rx_tmv_block(tmv, &mut ctx);

        if let Some(hn) = out.hyperframe {
            if hn != self.time.h {
                tracing::debug!("rx_tmv: hyperframe {} -> {}", self.time.h, hn);
            }
            self.time.h = hn;
        }

        for tma in out.tma {
            let Some(tla) = self.llc.rx_tma_unitdata_ind(tma) else {
                continue;
            };
            if let Some(unit) = self.mle.rx_tla_data_ind(tla) {
                events.push(RxEvent::Sdu(unit));
            }
        }
    }

    fn rx_voice(&mut self, mut prim: TmdCircuitDataInd, events: &mut Vec<RxEvent>) {
        if self.status.air_encryption() {
            match <&mut [i16; SPEECH_FRAME_LEN]>::try_from(prim.data.as_mut_slice()) {
                Ok(frame) => {
                    if let Err(e) = self.crypto.decrypt_voice_timeslot(prim.time, frame) {
                        tracing::debug!("rx_voice: TN{} left encrypted: {}", prim.ts, e);
                    }
                }
                Err(_) => {
                    tracing::warn!("rx_voice: speech frame of {} values", prim.data.len());
                }
            }
        }

        if let Some(bridge) = self.voice.as_mut() {
            bridge.rx_tmd_circuit_data_ind(&prim);
        }
        events.push(RxEvent::Voice(prim));
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tetra_core::BitBuffer;
    use crate::lmac::components::errorcontrol;
    use crate::lmac::components::errorcontrol_params::{NDB_PARAMS, SB1_PARAMS, SB2_PARAMS};
    use crate::lmac::components::scrambler;
    use crate::lmac::lmac_ms::tests::sync_type1;
    use crate::phy::components::burst_builder::{build_norm_burst, build_sync_burst};

    const SYNC_TIME: TdmaTime = TdmaTime { h: 0, m: 7, f: 3, t: 2, s: 1 };

    fn scramb() -> u32 {
        scrambler::tetra_scramb_get_init(123, 456, 5)
    }

    fn bits<const N: usize>(buf: &BitBuffer) -> [u8; N] {
        let mut arr = [0u8; N];
        arr.copy_from_slice(buf.as_bits());
        arr
    }

    /// AACH with header 0: two access fields, no traffic
    fn aach() -> BitBuffer {
        errorcontrol::encode_aach(&BitBuffer::from_bitstr("00 000000 000000"), scramb()).unwrap()
    }

    fn sync_burst(time: TdmaTime) -> [u8; 510] {
        let sb1 = errorcontrol::encode_cp(&SB1_PARAMS, &sync_type1(123, 456, 5, time), scrambler::SCRAMB_INIT).unwrap();
        let sb2 = errorcontrol::encode_cp(&SB2_PARAMS, &BitBuffer::new(124), scramb()).unwrap();
        build_sync_burst(&bits(&sb1), &bits(&aach()), &bits(&sb2))
    }

    fn norm2_burst(blk1: &BitBuffer) -> [u8; 510] {
        let ndb1 = errorcontrol::encode_cp(&NDB_PARAMS, blk1, scramb()).unwrap();
        let ndb2 = errorcontrol::encode_cp(&NDB_PARAMS, &BitBuffer::new(124), scramb()).unwrap();
        build_norm_burst(&bits(&ndb1), &bits(&aach()), &bits(&ndb2), true)
    }

    #[test]
    fn test_sync_burst_aligns_time() {
        tetra_core::debug::setup_logging_verbose();
        let mut rx = Receiver::default();
        let events = rx.rx_burst(&sync_burst(SYNC_TIME), TrainingSequence::SyncTrainSeq);

        assert!(matches!(events[..], [RxEvent::Sync(SyncInfo { colour_code: 5, mcc: 123, mnc: 456, .. })]));
        assert_eq!(rx.time(), SYNC_TIME);
        assert_eq!(rx.crypto().state().cc, Some(5));
        assert_eq!(rx.crypto().state().mcc, Some(123));
        assert_eq!(rx.status().timeslot_content[1], SlotContent::Sync);
        assert_eq!((rx.status().curr_multiframe, rx.status().curr_frame), (7, 3));
        assert_eq!(rx.slots_received(), 1);
    }

    #[test]
    fn test_time_advances_per_slot() {
        let mut rx = Receiver::default();
        rx.rx_burst(&sync_burst(SYNC_TIME), TrainingSequence::SyncTrainSeq);

        let blk1 = BitBuffer::new(124);
        for _ in 0..3 {
            rx.rx_burst(&norm2_burst(&blk1), TrainingSequence::NormalTrainSeq2);
        }
        assert_eq!(rx.time(), TdmaTime { h: 0, m: 7, f: 4, t: 1, s: 1 });
        assert_eq!(rx.status().timeslot_content, [
            SlotContent::HalfSlots, SlotContent::Sync, SlotContent::HalfSlots, SlotContent::HalfSlots,
        ]);
    }

    #[test]
    fn test_resource_to_mle() {
        let mut rx = Receiver::default();
        rx.rx_burst(&sync_burst(SYNC_TIME), TrainingSequence::SyncTrainSeq);

        // MAC-RESOURCE of 8 octets to SSI 2001, carrying BL-DATA with a CMCE D-SDS-DATA
        let mut blk1 = BitBuffer::new(124);
        blk1.write_bits(0b00_0_0_00_0_001000_001, 16);
        blk1.write_bits(2001, 24);
        blk1.write_bits(0b000, 3);
        blk1.write_bits(0b0001, 4); // BL-DATA
        blk1.write_bits(1, 1); // N(S)
        blk1.write_bits(0b010, 3); // CMCE
        blk1.write_bits(0b01111, 5); // D-SDS-DATA
        blk1.write_bits(0b0110, 4);
        // Pad to the 64 bits announced in the length field
        blk1.write_bits(0, 4);
        assert_eq!(blk1.get_pos(), 64);
        blk1.seek(0);

        let events = rx.rx_burst(&norm2_burst(&blk1), TrainingSequence::NormalTrainSeq2);
        let [RxEvent::Sdu(unit)] = &events[..] else {
            panic!("expected one SDU, got {:?}", events);
        };
        assert_eq!(unit.main_address.ssi, 2001);
        assert_eq!(unit.endpoint_id, 3);
        assert_eq!(unit.time, SYNC_TIME.add_timeslots(1));
        assert_eq!(unit.content.to_string(), "CMCE D-SDS DATA");
        assert_eq!(rx.llc().rx_count(), 1);
    }

    #[test]
    fn test_rx_bits_until_lock_lost() {
        let mut rx = Receiver::default();
        let mut stream = vec![0u8; 100];
        stream.extend_from_slice(&sync_burst(SYNC_TIME));
        stream.extend_from_slice(&norm2_burst(&BitBuffer::new(124)));
        stream.extend_from_slice(&sync_burst(SYNC_TIME.add_timeslots(2)));
        stream.extend_from_slice(&[0u8; 510]);

        // Split at an odd position to cross burst boundaries
        let mut events = rx.rx_bits(&stream[..333]);
        events.extend(rx.rx_bits(&stream[333..]));

        // The first SYNC only serves to find the slot boundary
        assert!(matches!(events[..], [RxEvent::Sync(_), RxEvent::LockLost]));
        assert_eq!(rx.time(), SYNC_TIME.add_timeslots(2));
        assert!(!rx.is_locked());
    }
}
