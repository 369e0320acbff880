use tetra_core::TrainingSequence;

use crate::phy::components::train_consts::*;

/// Size of the sliding receive window in bits
pub const BURST_SYNC_BUF_BITS: usize = 4096;
/// Bits needed before searching for a synchronization burst while unlocked
const UNLOCKED_SEARCH_MIN_BITS: usize = 1020;
/// Distance from the start of a y-sequence to the start of the next timeslot
const SYNC_TO_NEXT_SLOT: u64 = (TIMESLOT_BITS - SEQ_SYNC_OFFSET) as u64;
/// Bits kept after a failed search, so a sequence split between two inputs is still found
const SEARCH_OVERLAP_BITS: usize = SEQ_SYNC.len() - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Searching for a synchronization burst
    Unlocked,
    /// Waiting for the timeslot boundary following the synchronization burst
    KnowFrameStart,
    /// Timeslot boundaries known, one burst is extracted every 510 bits
    Locked,
}

/// A timeslot received while locked
#[derive(Debug)]
pub enum SlotEvent {
    /// Full timeslot with its training sequence at the expected offset
    Burst { bits: Vec<u8>, train_seq: TrainingSequence },
    /// No usable training sequence in this timeslot, synchronization was dropped
    LockLost,
}

/// Finds downlink timeslot boundaries in an unpacked bit stream.
///
/// Every [`SlotEvent`] stands for exactly one received timeslot, so a consumer keeping
/// cell time advances it by one slot per event.
pub struct BurstSync {
    state: SyncState,
    buf: Vec<u8>,
    /// Absolute bit number of `buf[0]`
    start_bitnum: u64,
    /// Absolute bit number of the next timeslot boundary
    next_slot_bitnum: u64,
}

impl Default for BurstSync {
    fn default() -> Self {
        Self::new()
    }
}

impl BurstSync {
    pub fn new() -> Self {
        Self {
            state: SyncState::Unlocked,
            buf: Vec::with_capacity(BURST_SYNC_BUF_BITS),
            start_bitnum: 0,
            next_slot_bitnum: 0,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == SyncState::Locked
    }

    /// Absolute number of the next bit to be received
    pub fn bitnum(&self) -> u64 {
        self.start_bitnum + self.buf.len() as u64
    }

    /// Feed received bits, one bit per byte. Returns one event per timeslot completed
    /// while locked, in order of reception.
    pub fn rx_bits(&mut self, bits: &[u8]) -> Vec<SlotEvent> {
        let mut events = Vec::new();
        for chunk in bits.chunks(BURST_SYNC_BUF_BITS / 2) {
            self.append(chunk);
            self.process(&mut events);
        }
        events
    }

    /// Drop the oldest bits from the window
    fn consume(&mut self, num_bits: usize) {
        let num_bits = num_bits.min(self.buf.len());
        self.buf.drain(..num_bits);
        self.start_bitnum += num_bits as u64;
    }

    fn append(&mut self, bits: &[u8]) {
        let overflow = (self.buf.len() + bits.len()).saturating_sub(BURST_SYNC_BUF_BITS);
        if overflow > 0 {
            tracing::trace!("BurstSync: window full, dropping {} bits", overflow);
            self.consume(overflow);
        }
        self.buf.extend(bits.iter().map(|b| b & 1));
    }

    fn process(&mut self, events: &mut Vec<SlotEvent>) {
        loop {
            match self.state {
                SyncState::Unlocked => {
                    if self.buf.len() < UNLOCKED_SEARCH_MIN_BITS {
                        return;
                    }
                    match find_train_seq(&self.buf, TrainSeqMask::SYNC) {
                        Some((offset, _)) => {
                            self.next_slot_bitnum = self.start_bitnum + offset as u64 + SYNC_TO_NEXT_SLOT;
                            tracing::debug!("BurstSync: SYNC at bit {}, next slot at {}",
                                self.start_bitnum + offset as u64, self.next_slot_bitnum);
                            self.state = SyncState::KnowFrameStart;
                        }
                        None => {
                            let drop = self.buf.len() - SEARCH_OVERLAP_BITS;
                            self.consume(drop);
                            return;
                        }
                    }
                }
                SyncState::KnowFrameStart => {
                    if self.bitnum() < self.next_slot_bitnum {
                        return;
                    }
                    let offset = (self.next_slot_bitnum - self.start_bitnum) as usize;
                    self.consume(offset);
                    tracing::info!("BurstSync: locked at bit {}", self.start_bitnum);
                    self.state = SyncState::Locked;
                }
                SyncState::Locked => {
                    if self.buf.len() < TIMESLOT_BITS {
                        return;
                    }
                    let slot = &self.buf[..TIMESLOT_BITS];
                    let mask = TrainSeqMask::NORM1 | TrainSeqMask::NORM2 | TrainSeqMask::SYNC;
                    match find_train_seq(slot, mask) {
                        Some((SEQ_SYNC_OFFSET, seq @ TrainingSequence::SyncTrainSeq))
                        | Some((SEQ_NORM_DL_OFFSET, seq @ (TrainingSequence::NormalTrainSeq1 | TrainingSequence::NormalTrainSeq2))) => {
                            events.push(SlotEvent::Burst { bits: slot.to_vec(), train_seq: seq });
                        }
                        Some((offset, seq)) => {
                            tracing::warn!("BurstSync: {:?} at unexpected offset {}, lock lost", seq, offset);
                            self.state = SyncState::Unlocked;
                            events.push(SlotEvent::LockLost);
                        }
                        None => {
                            tracing::warn!("BurstSync: no training sequence in slot, lock lost");
                            self.state = SyncState::Unlocked;
                            events.push(SlotEvent::LockLost);
                        }
                    }
                    self.consume(TIMESLOT_BITS);
                    self.next_slot_bitnum += TIMESLOT_BITS as u64;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::components::burst_builder::{build_norm_burst, build_sync_burst};

    fn sync_burst() -> [u8; TIMESLOT_BITS] {
        build_sync_burst(&[0; 120], &[0; 30], &[0; 216])
    }

    fn norm_burst(two_log_chan: bool) -> [u8; TIMESLOT_BITS] {
        build_norm_burst(&[0; 216], &[0; 30], &[0; 216], two_log_chan)
    }

    /// 100 bits of noise floor, then a SYNC burst, NORM1, NORM2, SYNC and an empty slot
    fn test_stream() -> Vec<u8> {
        let mut stream = vec![0u8; 100];
        stream.extend_from_slice(&sync_burst());
        stream.extend_from_slice(&norm_burst(false));
        stream.extend_from_slice(&norm_burst(true));
        stream.extend_from_slice(&sync_burst());
        stream.extend_from_slice(&[0u8; TIMESLOT_BITS]);
        stream
    }

    fn seqs(events: &[SlotEvent]) -> Vec<Option<TrainingSequence>> {
        events.iter().map(|e| match e {
            SlotEvent::Burst { train_seq, .. } => Some(*train_seq),
            SlotEvent::LockLost => None,
        }).collect()
    }

    const EXPECTED: [Option<TrainingSequence>; 4] = [
        Some(TrainingSequence::NormalTrainSeq1),
        Some(TrainingSequence::NormalTrainSeq2),
        Some(TrainingSequence::SyncTrainSeq),
        None,
    ];

    #[test]
    fn test_acquire_and_track() {
        tetra_core::debug::setup_logging_verbose();
        let stream = test_stream();
        let mut sync = BurstSync::new();
        let events = sync.rx_bits(&stream);

        assert_eq!(seqs(&events), EXPECTED);
        assert_eq!(sync.state(), SyncState::Unlocked);
        assert_eq!(sync.bitnum(), stream.len() as u64);

        // First delivered slot is the one following the SYNC burst
        match &events[0] {
            SlotEvent::Burst { bits, .. } => assert_eq!(bits.as_slice(), &stream[610..1120]),
            SlotEvent::LockLost => panic!("expected burst"),
        }
    }

    #[test]
    fn test_chunked_input() {
        let stream = test_stream();
        let mut sync = BurstSync::new();
        let mut events = Vec::new();
        for chunk in stream.chunks(37) {
            events.extend(sync.rx_bits(chunk));
        }
        assert_eq!(seqs(&events), EXPECTED);
    }

    #[test]
    fn test_misaligned_burst_drops_lock() {
        let mut stream = vec![0u8; 100];
        stream.extend_from_slice(&sync_burst());
        // Two extra bits shift the normal training sequence to offset 246
        stream.extend_from_slice(&[0, 0]);
        stream.extend_from_slice(&norm_burst(false));
        stream.extend_from_slice(&[0u8; 600]);

        let mut sync = BurstSync::new();
        let events = sync.rx_bits(&stream);
        assert_eq!(seqs(&events), [None]);
        assert!(!sync.is_locked());
    }

    #[test]
    fn test_no_sync_keeps_overlap() {
        let mut sync = BurstSync::new();
        assert!(sync.rx_bits(&[0u8; 2000]).is_empty());
        assert_eq!(sync.state(), SyncState::Unlocked);
        assert_eq!(sync.bitnum(), 2000);

        // A SYNC burst arriving in pieces after the failed search is still found
        let burst = sync_burst();
        let mut events = sync.rx_bits(&burst[..SEQ_SYNC_OFFSET + 20]);
        events.extend(sync.rx_bits(&burst[SEQ_SYNC_OFFSET + 20..]));
        events.extend(sync.rx_bits(&[0u8; 1200]));
        assert_eq!(seqs(&events), [None]);
    }
}
