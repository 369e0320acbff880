use tetra_core::{BitBuffer, PhyBlockNum, PhyBlockType, TdmaTime};
use tetra_pdus::mle::pdus::d_mle_sync::DMleSync;
use tetra_pdus::umac::pdus::mac_sync::MacSync;
use tetra_saps::tmd::TmdCircuitDataInd;
use tetra_saps::tmv::TmvUnitdataInd;
use tetra_saps::tmv::enums::logical_chans::LogicalChannel;
use tetra_saps::tp::TpUnitdataInd;

use crate::lmac::components::errorcontrol::{self, MAX_TYPE345_BITS, TCH_S_BITS};
use crate::lmac::components::errorcontrol_params;
use crate::lmac::components::{scrambler, viterbi};
use crate::status::ReceiverStatus;

/// Speech frame handed to the codec: [bfi, 137 bits, bfi, 137 bits]
pub const SPEECH_FRAME_LEN: usize = 2 * (1 + TCH_S_BITS / 2);

/// Details about the current burst, parsed from the ACCESS-ASSIGN in its broadcast block
#[derive(Debug, Default, Clone)]
pub struct CurBurst {
    pub is_traffic: bool,
    pub usage: Option<u8>,
    pub blk1_stolen: bool,
    pub blk2_stolen: bool,
}

/// Cell identity from the last SYNC PDU that passed its CRC
#[derive(Debug, Clone, Copy)]
struct CellData {
    colour_code: u8,
    mcc: u16,
    mnc: u16,
    scrambling_code: u32,
}

/// Contents of a SYNC PDU that passed its CRC, to be applied to cell time and crypto state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncInfo {
    pub colour_code: u8,
    /// Multiframe, frame and timeslot of the burst carrying the SYNC PDU. Hyperframe is not sent.
    pub time: TdmaTime,
    pub mcc: u16,
    pub mnc: u16,
}

/// Everything the lower MAC produces from one block
#[derive(Debug, Default)]
pub struct LmacOutput {
    /// Decoded block for the upper MAC
    pub tmv: Option<TmvUnitdataInd>,
    /// Speech frame, for full slots on a traffic channel
    pub voice: Option<TmdCircuitDataInd>,
    pub sync: Option<SyncInfo>,
}

/// Downlink lower MAC: descrambling, error control decoding and logical channel
/// assignment for the blocks of each received burst.
#[derive(Default)]
pub struct LmacMs {
    /// Retrieved from SYNC
    cell: Option<CellData>,
    /// Set by the upper MAC from the AACH, consumed for the blocks that follow it
    pub cur_burst: CurBurst,
}

impl LmacMs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scrambling code of the current cell, None until a SYNC PDU was received
    pub fn scrambling_code(&self) -> Option<u32> {
        self.cell.map(|c| c.scrambling_code)
    }

    fn determine_logical_channel_dl(&self, blk: &TpUnitdataInd) -> LogicalChannel {
        match blk.block_type {
            PhyBlockType::BBK => LogicalChannel::Aach,
            PhyBlockType::SB1 => LogicalChannel::Bsch,
            PhyBlockType::SchF => LogicalChannel::SchF,
            // SB2 is broadcast if scheduled according to time
            PhyBlockType::SB2 if blk.time.is_mandatory_bnch() => LogicalChannel::Bnch,
            // Which half slot channel this is, is only known after parsing
            PhyBlockType::SB2 | PhyBlockType::NDB => LogicalChannel::Unknown,
        }
    }

    /// Process one block of a burst. Blocks must be passed in the order the burst
    /// splitter produces them, with the upper MAC having handled the AACH in between.
    pub fn rx_tp_block(&mut self, blk: TpUnitdataInd, status: &mut ReceiverStatus) -> LmacOutput {
        let lchan = self.determine_logical_channel_dl(&blk);
        tracing::trace!("rx_tp_block {} {:?} {:?} type5 {}", blk.time, blk.block_type, blk.block_num, blk.block.dump_bin());

        if lchan == LogicalChannel::Aach {
            return self.rx_bbk(blk, status);
        }

        let scrambling_code = if lchan == LogicalChannel::Bsch {
            scrambler::SCRAMB_INIT
        } else if let Some(code) = self.scrambling_code() {
            code
        } else {
            tracing::trace!("rx_tp_block: no scrambling code yet, dropping {:?}", blk.block_type);
            return LmacOutput::default();
        };

        // Block 1 of a traffic slot sent with a normal training sequence 2 is stolen for signalling
        if self.cur_burst.is_traffic && blk.block_type == PhyBlockType::NDB && blk.block_num == PhyBlockNum::Block1 {
            self.cur_burst.blk1_stolen = true;
        }
        let lchan = self.stolen_channel(&blk).unwrap_or(lchan);

        self.rx_blk_cp(blk, lchan, scrambling_code, status)
    }

    /// STCH for the half slots taken from a traffic slot. Block 2 is only stolen when the
    /// MAC-RESOURCE in block 1 said so, otherwise it stays undetermined.
    fn stolen_channel(&self, blk: &TpUnitdataInd) -> Option<LogicalChannel> {
        if blk.block_type != PhyBlockType::NDB || !self.cur_burst.blk1_stolen {
            return None;
        }
        match blk.block_num {
            PhyBlockNum::Block1 => Some(LogicalChannel::Stch),
            PhyBlockNum::Block2 if self.cur_burst.blk2_stolen => Some(LogicalChannel::Stch),
            _ => None,
        }
    }

    fn rx_bbk(&mut self, bbk: TpUnitdataInd, status: &mut ReceiverStatus) -> LmacOutput {
        let Some(scrambling_code) = self.scrambling_code() else {
            tracing::trace!("rx_bbk: no scrambling code set, need to receive SYNC first");
            return LmacOutput::default();
        };

        let Some(type1) = errorcontrol::decode_aach(&bbk.block, scrambling_code) else {
            tracing::warn!("rx_bbk: BBK of {} bits", bbk.block.get_len());
            return LmacOutput::default();
        };
        status.last_crc_fail = false;

        LmacOutput {
            tmv: Some(TmvUnitdataInd {
                pdu: type1,
                block_num: PhyBlockNum::Undefined,
                block_type: PhyBlockType::BBK,
                logical_channel: LogicalChannel::Aach,
                crc_pass: true,
                scrambling_code,
                time: bbk.time,
            }),
            ..Default::default()
        }
    }

    fn rx_blk_cp(&mut self, blk: TpUnitdataInd, lchan: LogicalChannel, scrambling_code: u32, status: &mut ReceiverStatus) -> LmacOutput {
        let params = errorcontrol_params::get_params(blk.block_type);

        // Descramble, type5 -> type4
        let mut type4 = BitBuffer::from_bitbuffer(&blk.block);
        scrambler::tetra_scramb_bits(scrambling_code, &mut type4);

        let (type1, crc_pass) = match errorcontrol::decode_cp_type4(params, type4.as_bits()) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("rx_blk_cp {}: {}", params.name, e);
                return LmacOutput::default();
            }
        };
        tracing::debug!("rx_blk_cp {} {} {} CRC: {} type1 {}", blk.time, params.name, lchan,
            if crc_pass { "OK" } else { "WRONG" }, type1.dump_bin());

        if crc_pass {
            status.last_crc_fail = false;
        } else if lchan != LogicalChannel::SchF {
            // A full slot failing its CRC is usually traffic
            status.last_crc_fail = true;
        }

        let mut out = LmacOutput::default();
        match lchan {
            LogicalChannel::Bsch => {
                out.sync = self.rx_sync(&type1, crc_pass, status);
            }
            LogicalChannel::SchF if self.cur_burst.is_traffic => {
                out.voice = self.rx_blk_traffic(type4.as_bits(), &blk);
            }
            _ => {}
        }

        out.tmv = Some(TmvUnitdataInd {
            pdu: type1,
            block_num: blk.block_num,
            block_type: blk.block_type,
            logical_channel: lchan,
            crc_pass,
            scrambling_code,
            time: blk.time,
        });
        out
    }

    /// Parse the SYNC PDU of an SB1 block. The displayed identity follows every SYNC,
    /// the cell state only those that passed the CRC.
    fn rx_sync(&mut self, type1: &BitBuffer, crc_pass: bool, status: &mut ReceiverStatus) -> Option<SyncInfo> {
        let mut buf = BitBuffer::from_bitbuffer(type1);
        let (sync, mle_sync) = match MacSync::from_bitbuf(&mut buf).and_then(|s| Ok((s, DMleSync::from_bitbuf(&mut buf)?))) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("rx_sync: {}", e);
                return None;
            }
        };

        status.mcc = mle_sync.mcc;
        status.mnc = mle_sync.mnc;
        status.cc = sync.colour_code;

        if !crc_pass {
            return None;
        }
        if !sync.time.is_valid() {
            tracing::warn!("rx_sync: invalid time {:?} in SYNC", sync.time);
            return None;
        }

        let scrambling_code = scrambler::tetra_scramb_get_init(mle_sync.mcc, mle_sync.mnc, sync.colour_code);
        let cell = CellData {
            colour_code: sync.colour_code,
            mcc: mle_sync.mcc,
            mnc: mle_sync.mnc,
            scrambling_code,
        };
        if self.cell.is_none_or(|c| c.mcc != cell.mcc || c.mnc != cell.mnc || c.colour_code != cell.colour_code) {
            tracing::info!("rx_sync: cell MCC {} MNC {} CC {} scrambling code {:08x}",
                cell.mcc, cell.mnc, cell.colour_code, scrambling_code);
        }
        self.cell = Some(cell);
        tracing::debug!("rx_sync: {}", sync);

        Some(SyncInfo {
            colour_code: sync.colour_code,
            time: sync.time,
            mcc: mle_sync.mcc,
            mnc: mle_sync.mnc,
        })
    }

    /// Decode the TCH/S frame of a full traffic slot from its descrambled type4 bits
    fn rx_blk_traffic(&self, type4: &[u8], blk: &TpUnitdataInd) -> Option<TmdCircuitDataInd> {
        let mut soft = [viterbi::SOFT_ERASED; MAX_TYPE345_BITS];
        for (s, &b) in soft.iter_mut().zip(type4) {
            *s = viterbi::hard_to_soft(b);
        }

        let (codec_bits, crc_ok) = match errorcontrol::decode_tp(&soft) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("rx_blk_traffic: {}", e);
                return None;
            }
        };
        let bfi = !crc_ok as i16;
        tracing::debug!("rx_blk_traffic {} TCH/S bfi {}", blk.time, bfi);

        let half = TCH_S_BITS / 2;
        let mut data = Vec::with_capacity(SPEECH_FRAME_LEN);
        data.push(bfi);
        data.extend(codec_bits[..half].iter().map(|&b| b as i16));
        data.push(bfi);
        data.extend(codec_bits[half..].iter().map(|&b| b as i16));

        Some(TmdCircuitDataInd { ts: blk.time.t, time: blk.time, data })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tetra_core::{BurstType, TrainingSequence};
    use crate::lmac::components::errorcontrol_params::{NDB_PARAMS, SB1_PARAMS, SB2_PARAMS};

    /// Type1 bits of a SYNC PDU
    pub(crate) fn sync_type1(mcc: u16, mnc: u16, cc: u8, time: TdmaTime) -> BitBuffer {
        let mut buf = BitBuffer::new(60);
        MacSync {
            system_code: 0,
            colour_code: cc,
            time,
            sharing_mode: 0,
            ts_reserved_frames: 0,
            u_plane_dtx: false,
            frame_18_ext: false,
        }.to_bitbuf(&mut buf);
        DMleSync { mcc, mnc, neighbor_cell_broadcast: 0, cell_load_ca: 0, late_entry_supported: false }.to_bitbuf(&mut buf);
        buf.seek(0);
        buf
    }

    fn tp(block_type: PhyBlockType, block_num: PhyBlockNum, block: BitBuffer, time: TdmaTime) -> TpUnitdataInd {
        TpUnitdataInd {
            train_type: TrainingSequence::SyncTrainSeq,
            burst_type: BurstType::SDB,
            block_type,
            block_num,
            block,
            time,
        }
    }

    const SYNC_TIME: TdmaTime = TdmaTime { h: 0, m: 7, f: 3, t: 2, s: 1 };

    fn synced_lmac(status: &mut ReceiverStatus) -> LmacMs {
        let mut lmac = LmacMs::new();
        let type5 = errorcontrol::encode_cp(&SB1_PARAMS, &sync_type1(123, 456, 5, SYNC_TIME), scrambler::SCRAMB_INIT).unwrap();
        let out = lmac.rx_tp_block(tp(PhyBlockType::SB1, PhyBlockNum::Block1, type5, TdmaTime::default()), status);
        assert!(out.sync.is_some());
        lmac
    }

    #[test]
    fn test_rx_sync() {
        tetra_core::debug::setup_logging_verbose();
        let mut status = ReceiverStatus::default();
        let mut lmac = LmacMs::new();
        assert!(lmac.scrambling_code().is_none());

        let type5 = errorcontrol::encode_cp(&SB1_PARAMS, &sync_type1(123, 456, 5, SYNC_TIME), scrambler::SCRAMB_INIT).unwrap();
        let out = lmac.rx_tp_block(tp(PhyBlockType::SB1, PhyBlockNum::Block1, type5, TdmaTime::default()), &mut status);

        let sync = out.sync.unwrap();
        assert_eq!(sync, SyncInfo { colour_code: 5, time: SYNC_TIME, mcc: 123, mnc: 456 });
        assert_eq!(lmac.scrambling_code(), Some(scrambler::tetra_scramb_get_init(123, 456, 5)));
        assert_eq!((status.mcc, status.mnc, status.cc), (123, 456, 5));
        assert!(!status.last_crc_fail);

        let tmv = out.tmv.unwrap();
        assert_eq!(tmv.logical_channel, LogicalChannel::Bsch);
        assert_eq!(tmv.scrambling_code, scrambler::SCRAMB_INIT);
        assert_eq!(tmv.pdu.get_len(), 60);
    }

    #[test]
    fn test_sync_crc_fail_updates_display_only() {
        let mut status = ReceiverStatus::default();
        let mut lmac = LmacMs::new();
        let mut type5 = errorcontrol::encode_cp(&SB1_PARAMS, &sync_type1(123, 456, 5, SYNC_TIME), scrambler::SCRAMB_INIT).unwrap();
        // Too many errors for the convolutional code to correct
        for b in type5.as_bits_mut()[..40].iter_mut() {
            *b ^= 1;
        }
        let out = lmac.rx_tp_block(tp(PhyBlockType::SB1, PhyBlockNum::Block1, type5, TdmaTime::default()), &mut status);
        assert!(out.sync.is_none());
        assert!(!out.tmv.unwrap().crc_pass);
        assert!(lmac.scrambling_code().is_none());
        assert!(status.last_crc_fail);
    }

    #[test]
    fn test_blocks_need_scrambling_code() {
        let mut status = ReceiverStatus::default();
        let mut lmac = LmacMs::new();
        let out = lmac.rx_tp_block(tp(PhyBlockType::BBK, PhyBlockNum::Undefined, BitBuffer::new(30), TdmaTime::default()), &mut status);
        assert!(out.tmv.is_none());
        let out = lmac.rx_tp_block(tp(PhyBlockType::NDB, PhyBlockNum::Block1, BitBuffer::new(216), TdmaTime::default()), &mut status);
        assert!(out.tmv.is_none());
    }

    #[test]
    fn test_bnch_and_aach() {
        let mut status = ReceiverStatus::default();
        let mut lmac = synced_lmac(&mut status);
        let scramb = lmac.scrambling_code().unwrap();

        let type1 = BitBuffer::from_bitstr("00000000001010");
        let bbk = errorcontrol::encode_aach(&type1, scramb).unwrap();
        let tmv = lmac.rx_tp_block(tp(PhyBlockType::BBK, PhyBlockNum::Undefined, bbk, SYNC_TIME), &mut status).tmv.unwrap();
        assert_eq!(tmv.logical_channel, LogicalChannel::Aach);
        assert_eq!(tmv.pdu.to_bitstr(), "00000000001010");

        let payload: Vec<u8> = (0..124).map(|_| rand::random_range(0..2)).collect();
        let sb2 = errorcontrol::encode_cp(&SB2_PARAMS, &BitBuffer::from_bitarr(&payload), scramb).unwrap();

        // 07/18/2 is the mandatory BNCH slot for multiframe 7
        let bnch_time = TdmaTime { h: 0, m: 7, f: 18, t: 2, s: 1 };
        let tmv = lmac.rx_tp_block(tp(PhyBlockType::SB2, PhyBlockNum::Block2, BitBuffer::from_bitbuffer(&sb2), bnch_time), &mut status).tmv.unwrap();
        assert_eq!(tmv.logical_channel, LogicalChannel::Bnch);
        assert!(tmv.crc_pass);
        assert_eq!(tmv.pdu.as_bits(), &payload[..]);

        let tmv = lmac.rx_tp_block(tp(PhyBlockType::SB2, PhyBlockNum::Block2, sb2, SYNC_TIME), &mut status).tmv.unwrap();
        assert_eq!(tmv.logical_channel, LogicalChannel::Unknown);
    }

    #[test]
    fn test_block1_stolen_on_traffic() {
        let mut status = ReceiverStatus::default();
        let mut lmac = synced_lmac(&mut status);
        let scramb = lmac.scrambling_code().unwrap();
        let ndb = errorcontrol::encode_cp(&NDB_PARAMS, &BitBuffer::new(124), scramb).unwrap();

        let tmv = lmac.rx_tp_block(tp(PhyBlockType::NDB, PhyBlockNum::Block1, BitBuffer::from_bitbuffer(&ndb), SYNC_TIME), &mut status).tmv.unwrap();
        assert!(!lmac.cur_burst.blk1_stolen);
        assert_eq!(tmv.logical_channel, LogicalChannel::Unknown);

        lmac.cur_burst.is_traffic = true;
        let tmv = lmac.rx_tp_block(tp(PhyBlockType::NDB, PhyBlockNum::Block2, BitBuffer::from_bitbuffer(&ndb), SYNC_TIME), &mut status).tmv.unwrap();
        assert!(!lmac.cur_burst.blk1_stolen);
        assert_eq!(tmv.logical_channel, LogicalChannel::Unknown);
        let tmv = lmac.rx_tp_block(tp(PhyBlockType::NDB, PhyBlockNum::Block1, BitBuffer::from_bitbuffer(&ndb), SYNC_TIME), &mut status).tmv.unwrap();
        assert!(lmac.cur_burst.blk1_stolen);
        assert_eq!(tmv.logical_channel, LogicalChannel::Stch);

        // Second half stays traffic unless block 1 announced it as stolen too
        let tmv = lmac.rx_tp_block(tp(PhyBlockType::NDB, PhyBlockNum::Block2, BitBuffer::from_bitbuffer(&ndb), SYNC_TIME), &mut status).tmv.unwrap();
        assert_eq!(tmv.logical_channel, LogicalChannel::Unknown);
        lmac.cur_burst.blk2_stolen = true;
        let tmv = lmac.rx_tp_block(tp(PhyBlockType::NDB, PhyBlockNum::Block2, ndb, SYNC_TIME), &mut status).tmv.unwrap();
        assert_eq!(tmv.logical_channel, LogicalChannel::Stch);
    }

    #[test]
    fn test_traffic_slot_voice() {
        let mut status = ReceiverStatus::default();
        let mut lmac = synced_lmac(&mut status);
        let scramb = lmac.scrambling_code().unwrap();

        let mut codec_bits = [0u8; TCH_S_BITS];
        for b in codec_bits.iter_mut() {
            *b = rand::random_range(0..2);
        }
        let type5 = errorcontrol::encode_tp(&codec_bits, scramb);

        // Without a traffic ACCESS-ASSIGN the slot is signalling and fails its CRC
        let out = lmac.rx_tp_block(tp(PhyBlockType::SchF, PhyBlockNum::Both, BitBuffer::from_bitbuffer(&type5), SYNC_TIME), &mut status);
        assert!(out.voice.is_none());
        assert!(!status.last_crc_fail);

        lmac.cur_burst.is_traffic = true;
        let out = lmac.rx_tp_block(tp(PhyBlockType::SchF, PhyBlockNum::Both, type5, SYNC_TIME), &mut status);
        let voice = out.voice.unwrap();
        assert_eq!(voice.ts, 2);
        assert_eq!(voice.data.len(), SPEECH_FRAME_LEN);
        assert_eq!((voice.data[0], voice.data[138]), (0, 0));
        assert!(voice.data[1..138].iter().zip(&codec_bits[..137]).all(|(&v, &b)| v == b as i16));
        assert!(voice.data[139..].iter().zip(&codec_bits[137..]).all(|(&v, &b)| v == b as i16));
    }
}
