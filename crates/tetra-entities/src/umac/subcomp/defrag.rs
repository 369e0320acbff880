use tetra_core::{BitBuffer, TdmaTime, TetraAddress};

use crate::crypto::TetraKey;


const DEFRAG_BUF_INITIAL_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefragBufferState {
    Inactive,
    Active,
    Complete,
}

/// Reassembly state of one timeslot. The buffer holds the first MAC PDU, header
/// included, followed by the TM-SDU parts of all later fragments. The L2 marker
/// points at the start of the TM-SDU.
#[derive(Debug)]
pub struct DefragBuffer {
    pub state: DefragBufferState,
    pub addr: TetraAddress,
    pub t_first: TdmaTime,
    pub t_last: TdmaTime,
    pub num_frags: usize,
    /// TM-SDU bits collected so far
    pub sdu_len: usize,
    /// Encryption mode of the MAC-RESOURCE that opened the slot
    pub encryption_mode: u8,
    /// Key the first fragment was decrypted with, used for the ones that follow
    pub key: Option<TetraKey>,
    /// Multiframes since the last fragment was added
    pub age: u8,
    pub scrambling_code: u32,
    pub buffer: BitBuffer,
}

impl DefragBuffer {
    pub fn new() -> Self {
        Self {
            state: DefragBufferState::Inactive,
            addr: TetraAddress::default(),
            t_first: TdmaTime::default(),
            t_last: TdmaTime::default(),
            num_frags: 0,
            sdu_len: 0,
            encryption_mode: 0,
            key: None,
            age: 0,
            scrambling_code: 0,
            buffer: BitBuffer::new_autoexpand(DEFRAG_BUF_INITIAL_LEN)
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_active(&self) -> bool {
        self.state == DefragBufferState::Active
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption_mode > 0
    }
}

impl Default for DefragBuffer {
    fn default() -> Self {
        Self::new()
    }
}
