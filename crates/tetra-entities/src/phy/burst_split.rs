use tetra_core::{BitBuffer, BurstType, PhyBlockNum, PhyBlockType, TdmaTime, TrainingSequence};
use tetra_saps::tp::TpUnitdataInd;

use crate::phy::components::burst_consts::*;

/// Content classification of a timeslot, as shown on a per-slot display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotContent {
    #[default]
    Unknown = 0,
    Signalling = 1,
    HalfSlots = 2,
    Sync = 3,
    Traffic = 4,
}

impl SlotContent {
    /// Classify a burst by its training sequence. A full slot carries traffic when the
    /// access assignment received in the same slot said so.
    pub fn classify(train_seq: TrainingSequence, is_traffic: bool) -> Self {
        match train_seq {
            TrainingSequence::SyncTrainSeq => SlotContent::Sync,
            TrainingSequence::NormalTrainSeq2 => SlotContent::HalfSlots,
            TrainingSequence::NormalTrainSeq1 if is_traffic => SlotContent::Traffic,
            TrainingSequence::NormalTrainSeq1 => SlotContent::Signalling,
            _ => SlotContent::Unknown,
        }
    }
}

fn block(
    train_type: TrainingSequence,
    burst_type: BurstType,
    block_type: PhyBlockType,
    block_num: PhyBlockNum,
    bits: &[u8],
    time: TdmaTime,
) -> TpUnitdataInd {
    TpUnitdataInd {
        train_type,
        burst_type,
        block_type,
        block_num,
        block: BitBuffer::from_bitarr(bits),
        time,
    }
}

/// Broadcast block of a normal burst, reassembled from both sides of the training sequence
fn ndb_bbk(burst: &[u8]) -> Vec<u8> {
    let mut bbk = Vec::with_capacity(SB_BBK_BITS);
    bbk.extend_from_slice(&burst[NDB_BBK1_OFFSET..NDB_BBK1_OFFSET + NDB_BBK1_BITS]);
    bbk.extend_from_slice(&burst[NDB_BBK2_OFFSET..NDB_BBK2_OFFSET + NDB_BBK2_BITS]);
    bbk
}

/// Split a synchronized 510-bit downlink timeslot into its blocks, in the order the
/// lower MAC must process them. The broadcast block always precedes the blocks whose
/// handling depends on the access assignment it carries.
/// Bursts with uplink training sequences yield no blocks.
pub fn split_burst(burst: &[u8], train_seq: TrainingSequence, time: TdmaTime) -> Vec<TpUnitdataInd> {
    if burst.len() < SB_BITS {
        tracing::warn!("split_burst: short burst of {} bits", burst.len());
        return Vec::new();
    }

    match train_seq {
        TrainingSequence::SyncTrainSeq => {
            let b = BurstType::SDB;
            vec![
                block(train_seq, b, PhyBlockType::SB1, PhyBlockNum::Block1,
                    &burst[SB_BLK1_OFFSET..SB_BLK1_OFFSET + SB_BLK1_BITS], time),
                block(train_seq, b, PhyBlockType::BBK, PhyBlockNum::Undefined,
                    &burst[SB_BBK_OFFSET..SB_BBK_OFFSET + SB_BBK_BITS], time),
                block(train_seq, b, PhyBlockType::SB2, PhyBlockNum::Block2,
                    &burst[SB_BLK2_OFFSET..SB_BLK2_OFFSET + SB_BLK2_BITS], time),
            ]
        }
        TrainingSequence::NormalTrainSeq2 => {
            let b = BurstType::NDB;
            vec![
                block(train_seq, b, PhyBlockType::BBK, PhyBlockNum::Undefined, &ndb_bbk(burst), time),
                block(train_seq, b, PhyBlockType::NDB, PhyBlockNum::Block1,
                    &burst[NDB_BLK1_OFFSET..NDB_BLK1_OFFSET + NDB_BLK_BITS], time),
                block(train_seq, b, PhyBlockType::NDB, PhyBlockNum::Block2,
                    &burst[NDB_BLK2_OFFSET..NDB_BLK2_OFFSET + NDB_BLK_BITS], time),
            ]
        }
        TrainingSequence::NormalTrainSeq1 => {
            let b = BurstType::NDB;
            let mut schf = Vec::with_capacity(2 * NDB_BLK_BITS);
            schf.extend_from_slice(&burst[NDB_BLK1_OFFSET..NDB_BLK1_OFFSET + NDB_BLK_BITS]);
            schf.extend_from_slice(&burst[NDB_BLK2_OFFSET..NDB_BLK2_OFFSET + NDB_BLK_BITS]);
            vec![
                block(train_seq, b, PhyBlockType::BBK, PhyBlockNum::Undefined, &ndb_bbk(burst), time),
                block(train_seq, b, PhyBlockType::SchF, PhyBlockNum::Both, &schf, time),
            ]
        }
        _ => {
            tracing::debug!("split_burst: ignoring burst with {:?}", train_seq);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::components::burst_builder::{build_norm_burst, build_sync_burst};

    fn random_bits<const N: usize>() -> [u8; N] {
        core::array::from_fn(|_| rand::random_range(0..2))
    }

    #[test]
    fn test_split_sync_burst() {
        let sb = random_bits::<SB_BLK1_BITS>();
        let bb = random_bits::<SB_BBK_BITS>();
        let bkn2 = random_bits::<SB_BLK2_BITS>();
        let burst = build_sync_burst(&sb, &bb, &bkn2);

        let blocks = split_burst(&burst, TrainingSequence::SyncTrainSeq, TdmaTime::default());
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].block_type, PhyBlockType::SB1);
        assert_eq!(blocks[0].block.as_bits(), &sb);
        assert_eq!(blocks[1].block_type, PhyBlockType::BBK);
        assert_eq!(blocks[1].block.as_bits(), &bb);
        assert_eq!(blocks[2].block_type, PhyBlockType::SB2);
        assert_eq!(blocks[2].block_num, PhyBlockNum::Block2);
        assert_eq!(blocks[2].block.as_bits(), &bkn2);
        assert!(blocks.iter().all(|b| b.burst_type == BurstType::SDB));
    }

    #[test]
    fn test_split_norm_bursts() {
        let bkn1 = random_bits::<NDB_BLK_BITS>();
        let bb = random_bits::<SB_BBK_BITS>();
        let bkn2 = random_bits::<NDB_BLK_BITS>();

        // Two half slots
        let burst = build_norm_burst(&bkn1, &bb, &bkn2, true);
        let blocks = split_burst(&burst, TrainingSequence::NormalTrainSeq2, TdmaTime::default());
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].block_type, PhyBlockType::BBK);
        assert_eq!(blocks[0].block.as_bits(), &bb);
        assert_eq!((blocks[1].block_type, blocks[1].block_num), (PhyBlockType::NDB, PhyBlockNum::Block1));
        assert_eq!(blocks[1].block.as_bits(), &bkn1);
        assert_eq!((blocks[2].block_type, blocks[2].block_num), (PhyBlockType::NDB, PhyBlockNum::Block2));
        assert_eq!(blocks[2].block.as_bits(), &bkn2);

        // Full slot
        let burst = build_norm_burst(&bkn1, &bb, &bkn2, false);
        let blocks = split_burst(&burst, TrainingSequence::NormalTrainSeq1, TdmaTime::default());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].block.as_bits(), &bb);
        assert_eq!(blocks[1].block_type, PhyBlockType::SchF);
        assert_eq!(&blocks[1].block.as_bits()[..NDB_BLK_BITS], &bkn1);
        assert_eq!(&blocks[1].block.as_bits()[NDB_BLK_BITS..], &bkn2);
    }

    #[test]
    fn test_uplink_sequences_ignored() {
        let burst = [0u8; SB_BITS];
        assert!(split_burst(&burst, TrainingSequence::NormalTrainSeq3, TdmaTime::default()).is_empty());
        assert!(split_burst(&burst, TrainingSequence::ExtendedTrainSeq, TdmaTime::default()).is_empty());
        assert!(split_burst(&burst[..100], TrainingSequence::SyncTrainSeq, TdmaTime::default()).is_empty());
    }

    #[test]
    fn test_slot_content() {
        assert_eq!(SlotContent::classify(TrainingSequence::SyncTrainSeq, true), SlotContent::Sync);
        assert_eq!(SlotContent::classify(TrainingSequence::NormalTrainSeq1, true), SlotContent::Traffic);
        assert_eq!(SlotContent::classify(TrainingSequence::NormalTrainSeq1, false), SlotContent::Signalling);
        assert_eq!(SlotContent::classify(TrainingSequence::NormalTrainSeq2, true) as u8, 2);
        assert_eq!(SlotContent::classify(TrainingSequence::ExtendedTrainSeq, false), SlotContent::Unknown);
    }
}
