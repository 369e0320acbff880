use core::ops::BitOr;

use tetra_core::TrainingSequence;

/// Bits per downlink timeslot, 255 symbols of 2 bits
pub const TIMESLOT_BITS: usize = 255 * 2;

/// Offset of the synchronization training sequence within a timeslot
pub const SEQ_SYNC_OFFSET: usize = 214;
/// Offset of the normal training sequence within a downlink timeslot
pub const SEQ_NORM_DL_OFFSET: usize = 244;

/* 9.4.4.3.2 Normal Training Sequence */
/// 22 n-bits
pub const SEQ_NORM1: [u8; 22] = [1,1,0,1,0,0,0,0,1,1,1,0,1,0,0,1,1,1,0,1,0,0];
/// 22 p-bits
pub const SEQ_NORM2: [u8; 22] = [0,1,1,1,1,0,1,0,0,1,0,0,0,0,1,1,0,1,1,1,1,0];
/// 22 q-bits
pub const SEQ_NORM3: [u8; 22] = [1,0,1,1,0,1,1,1,0,0,0,0,0,1,1,0,1,0,1,1,0,1];
/* 9.4.4.3.3 Extended training sequence */
/// 30 x-bits
pub const SEQ_EXT:   [u8; 30] = [1,0,0,1,1,1,0,1,0,0,0,0,1,1,1,0,1,0,0,1,1,1,0,1,0,0,0,0,1,1];
/* 9.4.4.3.4 Synchronization training sequence */
/// 38 y-bits
pub const SEQ_SYNC:  [u8; 38] = [1,1,0,0,0,0,0,1,1,0,0,1,1,1,0,0,1,1,1,0,1,0,0,1,1,1,0,0,0,0,0,1,1,0,0,1,1,1];

/* 9.4.4.3.1 Frequency correction field: f1..f8 and f73..f80 are 1, the rest 0 */
pub const FREQ_CORR_BITS: [u8; 80] = {
    let mut f = [0u8; 80];
    let mut i = 0;
    while i < 8 {
        f[i] = 1;
        f[72 + i] = 1;
        i += 1;
    }
    f
};

/// Set of training sequences a search is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainSeqMask(u8);

impl TrainSeqMask {
    pub const SYNC: Self = Self(1 << 0);
    pub const NORM1: Self = Self(1 << 1);
    pub const NORM2: Self = Self(1 << 2);
    pub const NORM3: Self = Self(1 << 3);
    pub const EXT: Self = Self(1 << 4);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TrainSeqMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Bits of a training sequence, empty for NotFound
pub fn train_seq_bits(seq: TrainingSequence) -> &'static [u8] {
    match seq {
        TrainingSequence::NormalTrainSeq1 => &SEQ_NORM1,
        TrainingSequence::NormalTrainSeq2 => &SEQ_NORM2,
        TrainingSequence::NormalTrainSeq3 => &SEQ_NORM3,
        TrainingSequence::ExtendedTrainSeq => &SEQ_EXT,
        TrainingSequence::SyncTrainSeq => &SEQ_SYNC,
        TrainingSequence::NotFound => &[],
    }
}

/// Order in which candidate positions are compared against the full sequences
const SEARCH_ORDER: [(TrainSeqMask, TrainingSequence); 5] = [
    (TrainSeqMask::SYNC, TrainingSequence::SyncTrainSeq),
    (TrainSeqMask::NORM1, TrainingSequence::NormalTrainSeq1),
    (TrainSeqMask::NORM2, TrainingSequence::NormalTrainSeq2),
    (TrainSeqMask::NORM3, TrainingSequence::NormalTrainSeq3),
    (TrainSeqMask::EXT, TrainingSequence::ExtendedTrainSeq),
];

/// Number of leading bits used to prefilter candidate positions
const PREFILTER_LEN: usize = 22;
const PREFILTER_MASK: u32 = (1 << PREFILTER_LEN) - 1;

const fn prefilter_word(seq: &[u8]) -> u32 {
    let mut w = 0;
    let mut i = 0;
    while i < PREFILTER_LEN {
        w = (w << 1) | seq[i] as u32;
        i += 1;
    }
    w
}

const PREFILTER_WORDS: [u32; 5] = [
    prefilter_word(&SEQ_SYNC),
    prefilter_word(&SEQ_NORM1),
    prefilter_word(&SEQ_NORM2),
    prefilter_word(&SEQ_NORM3),
    prefilter_word(&SEQ_EXT),
];

/// Find the first position in `bits` where one of the training sequences in `mask` starts.
/// Returns the offset and the sequence found. A sequence only matches if it lies
/// completely within `bits`.
pub fn find_train_seq(bits: &[u8], mask: TrainSeqMask) -> Option<(usize, TrainingSequence)> {
    if bits.len() < PREFILTER_LEN {
        return None;
    }

    let mut filter: u32 = bits[..PREFILTER_LEN - 1].iter().fold(0, |acc, &b| (acc << 1) | (b & 1) as u32);

    for offset in 0..=bits.len() - PREFILTER_LEN {
        filter = ((filter << 1) | (bits[offset + PREFILTER_LEN - 1] & 1) as u32) & PREFILTER_MASK;
        if !PREFILTER_WORDS.contains(&filter) {
            continue;
        }

        let remaining = &bits[offset..];
        for (seq_mask, seq) in SEARCH_ORDER {
            let seq_bits = train_seq_bits(seq);
            if mask.contains(seq_mask) && remaining.len() >= seq_bits.len() && &remaining[..seq_bits.len()] == seq_bits {
                return Some((offset, seq));
            }
        }
    }
    None
}
