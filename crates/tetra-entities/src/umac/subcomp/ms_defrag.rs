use tetra_core::{BitBuffer, Layer, TdmaTime, TetraAddress};

use crate::crypto::TetraKey;
use crate::umac::subcomp::defrag::{DefragBuffer, DefragBufferState};

pub const DEFRAG_BUF_MAX_LEN: usize = 4096;
/// N.203, in multiframes. Must be at least 4.
pub const DEFRAG_MAX_AGE: u8 = 6;

/// Defragmenter for the downlink. Only the SwMI sends, so a single DefragBuffer
/// per timeslot is enough.
pub struct MsDefrag {
    pub buffers: [DefragBuffer; 4],
}

/// Parameters of the MAC-RESOURCE that starts a fragmented TM-SDU
pub struct FirstFragment<'a> {
    /// The complete MAC PDU, header included, fill bits stripped
    pub pdu: &'a BitBuffer,
    /// Offset of the TM-SDU within pdu
    pub sdu_offset: usize,
    pub addr: TetraAddress,
    pub encryption_mode: u8,
    pub key: Option<TetraKey>,
    pub scrambling_code: u32,
}

impl MsDefrag {
    pub fn new() -> Self {
        Self {
            buffers: [
                DefragBuffer::new(),
                DefragBuffer::new(),
                DefragBuffer::new(),
                DefragBuffer::new(),
            ],
        }
    }

    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.reset();
        }
    }

    fn slot(t: TdmaTime) -> usize {
        (t.t - 1) as usize
    }

    pub fn get(&self, t: TdmaTime) -> &DefragBuffer {
        &self.buffers[Self::slot(t)]
    }

    /// Called once per multiframe. Discards slots that did not receive a fragment
    /// during the last DEFRAG_MAX_AGE multiframes.
    pub fn age_buffers(&mut self) {
        for (ts, buffer) in self.buffers.iter_mut().enumerate() {
            if buffer.state == DefragBufferState::Inactive {
                continue;
            }
            buffer.age += 1;
            if buffer.age >= DEFRAG_MAX_AGE {
                tracing::warn!("Defrag buffer {} timed out: ssi: {}, t_first: {}, t_last: {}, num_frags: {}, sdu_len: {}",
                    ts, buffer.addr.ssi, buffer.t_first, buffer.t_last, buffer.num_frags, buffer.sdu_len);
                buffer.reset();
            }
        }
    }

    /// Opens the slot for timeslot t with the first fragment, discarding whatever it held
    pub fn insert_first(&mut self, first: FirstFragment, t: TdmaTime) {

        // Reset target buffer if needed
        let ts = Self::slot(t);
        if self.buffers[ts].state != DefragBufferState::Inactive {
            tracing::warn!("Defrag buffer {} not inactive (state: {:?}, num_frags: {})",
                ts, self.buffers[ts].state, self.buffers[ts].num_frags);
            self.buffers[ts].reset();
        }

        if first.pdu.get_len() > DEFRAG_BUF_MAX_LEN {
            tracing::warn!("Defrag buffer {} first fragment of {} bits too long", ts, first.pdu.get_len());
            return;
        }

        let buf = &mut self.buffers[ts];
        buf.state = DefragBufferState::Active;
        buf.addr = first.addr;
        buf.t_first = t;
        buf.t_last = t;
        buf.num_frags = 1;
        buf.sdu_len = first.pdu.get_len() - first.sdu_offset;
        buf.encryption_mode = first.encryption_mode;
        buf.key = first.key;
        buf.age = 0;
        buf.scrambling_code = first.scrambling_code;

        buf.buffer.write_bitarr(first.pdu.as_bits());
        buf.buffer.set_layer(Layer::L2, first.sdu_offset);

        tracing::debug!("Defrag buffer {} first: ssi: {}, t_first: {}, num_frags: {}: {}",
            ts, buf.addr.ssi, buf.t_first, buf.num_frags, buf.buffer.dump_bin());
    }

    fn append(&mut self, sdu: &[u8], t: TdmaTime) -> bool {
        let ts = Self::slot(t);
        let buf = &mut self.buffers[ts];
        if buf.state != DefragBufferState::Active {
            tracing::warn!("Defrag buffer {} is not active", ts);
            return false;
        }

        if buf.buffer.get_len() + sdu.len() > DEFRAG_BUF_MAX_LEN {
            tracing::warn!("Defrag buffer {} would exceed max len, dropping {} bits", ts, sdu.len());
            return false;
        }

        buf.buffer.write_bitarr(sdu);
        buf.t_last = t;
        buf.num_frags += 1;
        buf.sdu_len += sdu.len();
        buf.age = 0;
        true
    }

    /// Appends the TM-SDU part of a MAC-FRAG
    pub fn insert_next(&mut self, sdu: &[u8], t: TdmaTime) {
        if self.append(sdu, t) {
            let ts = Self::slot(t);
            let buf = &self.buffers[ts];
            tracing::debug!("Defrag buffer {} next:  ssi: {}, t_first: {}, t_last: {}, num_frags: {}, sdu_len: {}",
                ts, buf.addr.ssi, buf.t_first, buf.t_last, buf.num_frags, buf.sdu_len);
        }
    }

    /// Appends the TM-SDU part of a MAC-END and marks the slot complete
    pub fn insert_last(&mut self, sdu: &[u8], t: TdmaTime) {
        if self.append(sdu, t) {
            let ts = Self::slot(t);
            let buf = &mut self.buffers[ts];
            buf.state = DefragBufferState::Complete;
            tracing::debug!("Defrag buffer {} last:  ssi: {}, t_first: {}, t_last: {}, num_frags: {}, sdu_len: {}",
                ts, buf.addr.ssi, buf.t_first, buf.t_last, buf.num_frags, buf.sdu_len);
        }
    }

    /// Transfers finalized defragbuf to caller, setting bitbuffer pos to start.
    pub fn take_defragged_buf(&mut self, t: TdmaTime) -> Option<DefragBuffer> {

        let ts = Self::slot(t);
        if self.buffers[ts].state != DefragBufferState::Complete {
            tracing::warn!("Defrag buffer {} is not complete", ts);
            return None;
        }

        let mut defragbuffer = std::mem::replace(&mut self.buffers[ts], DefragBuffer::new());
        defragbuffer.buffer.seek(0);
        Some(defragbuffer)
    }

    /// Frees the slot of timeslot t
    pub fn discard(&mut self, t: TdmaTime) {
        self.buffers[Self::slot(t)].reset();
    }
}

impl Default for MsDefrag {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tetra_core::debug;

    fn first<'a>(pdu: &'a BitBuffer, sdu_offset: usize) -> FirstFragment<'a> {
        FirstFragment {
            pdu,
            sdu_offset,
            addr: TetraAddress::ssi(1234),
            encryption_mode: 0,
            key: None,
            scrambling_code: 3,
        }
    }

    #[test]
    fn test_3_chunks() {
        debug::setup_logging_verbose();

        let pdu = BitBuffer::from_bitstr("1010000");
        let t1 = TdmaTime::default().add_timeslots(2);
        let t2 = t1.add_timeslots(4);
        let t3 = t2.add_timeslots(4);
        assert_eq!(t1.t, t3.t);

        let mut defragger = MsDefrag::new();
        defragger.insert_first(first(&pdu, 4), t1);
        defragger.insert_next(&[1, 1, 1], t2);
        defragger.insert_last(&[0, 0, 1, 1], t3);

        let mut out = defragger.take_defragged_buf(t3).unwrap();
        assert_eq!(out.buffer.to_bitstr(), "10100001110011");
        assert_eq!(out.num_frags, 3);
        assert_eq!(out.sdu_len, 10);
        assert_eq!(out.t_first, t1);
        assert_eq!(out.t_last, t3);
        assert_eq!(out.buffer.layer_bits(Layer::L2), &[0, 0, 0, 1, 1, 1, 0, 0, 1, 1]);
        out.buffer.seek_layer(Layer::L2).unwrap();
        assert_eq!(out.buffer.get_pos(), 4);

        assert_eq!(defragger.get(t3).state, DefragBufferState::Inactive);
    }

    #[test]
    fn test_fragment_without_start() {
        let t = TdmaTime::default();
        let mut defragger = MsDefrag::new();
        defragger.insert_next(&[1, 0], t);
        defragger.insert_last(&[1, 0], t);
        assert!(defragger.take_defragged_buf(t).is_none());
    }

    #[test]
    fn test_restart_discards_old_slot() {
        let t = TdmaTime::default();
        let mut defragger = MsDefrag::new();
        defragger.insert_first(first(&BitBuffer::from_bitstr("1111"), 2), t);
        defragger.insert_next(&[1, 1], t);
        defragger.insert_first(first(&BitBuffer::from_bitstr("0000"), 2), t);
        assert_eq!(defragger.get(t).num_frags, 1);
        assert_eq!(defragger.get(t).buffer.to_bitstr(), "0000");
    }

    #[test]
    fn test_overflow_dropped() {
        let t = TdmaTime::default();
        let mut defragger = MsDefrag::new();
        defragger.insert_first(first(&BitBuffer::new(256), 40), t);

        let big = vec![1u8; DEFRAG_BUF_MAX_LEN - 256];
        defragger.insert_next(&big, t);
        assert_eq!(defragger.get(t).buffer.get_len(), DEFRAG_BUF_MAX_LEN);

        // One more bit does not fit, the slot stays as it was
        defragger.insert_next(&[1], t);
        let slot = defragger.get(t);
        assert!(slot.is_active());
        assert_eq!(slot.num_frags, 2);
        assert_eq!(slot.buffer.get_len(), DEFRAG_BUF_MAX_LEN);

        defragger.insert_last(&[1], t);
        assert!(defragger.take_defragged_buf(t).is_none());
    }

    #[test]
    fn test_aging() {
        let t = TdmaTime::default().add_timeslots(1);
        let mut defragger = MsDefrag::new();
        defragger.insert_first(first(&BitBuffer::from_bitstr("1111"), 2), t);

        for _ in 0..DEFRAG_MAX_AGE - 1 {
            defragger.age_buffers();
        }
        assert!(defragger.get(t).is_active());
        defragger.insert_next(&[1], t);
        assert_eq!(defragger.get(t).age, 0);

        for _ in 0..DEFRAG_MAX_AGE - 1 {
            defragger.age_buffers();
        }
        assert!(defragger.get(t).is_active());
        defragger.age_buffers();
        assert_eq!(defragger.get(t).state, DefragBufferState::Inactive);
    }
}
