//! Downlink burst layouts, Clause 9.4.4.2. Offsets are in bits from the start of the timeslot.

pub const DQPSK4_BITS_PER_SYM: usize = 2;

const fn sym(n: usize) -> usize {
    n * DQPSK4_BITS_PER_SYM
}

/* Synchronization downlink burst:
   q(6) hc(1) f(40) sb1(60) y(19) bb(15) bkn2(108) hd(1) q(5) */
pub const SB_BITS: usize =        sym(6 + 1 + 40 + 60 + 19 + 15 + 108 + 1 + 5);
pub const SB_HC_OFFSET: usize =   sym(6);
pub const SB_FREQ_OFFSET: usize = sym(6 + 1);
pub const SB_BLK1_OFFSET: usize = sym(6 + 1 + 40);
pub const SB_TRAIN_OFFSET: usize = sym(6 + 1 + 40 + 60);
pub const SB_BBK_OFFSET: usize =  sym(6 + 1 + 40 + 60 + 19);
pub const SB_BLK2_OFFSET: usize = sym(6 + 1 + 40 + 60 + 19 + 15);
pub const SB_HD_OFFSET: usize =   sym(6 + 1 + 40 + 60 + 19 + 15 + 108);

pub const SB_BLK1_BITS: usize =   sym(60);
pub const SB_BBK_BITS: usize =    sym(15);
pub const SB_BLK2_BITS: usize =   sym(108);

/* Normal continuous downlink burst:
   q(6) ha(1) bkn1(108) bb1(7) n/p(11) bb2(8) bkn2(108) hb(1) q(5) */
pub const NDB_BITS: usize =        sym(6 + 1 + 108 + 7 + 11 + 8 + 108 + 1 + 5);
pub const NDB_HA_OFFSET: usize =   sym(6);
pub const NDB_BLK1_OFFSET: usize = sym(6 + 1);
pub const NDB_BBK1_OFFSET: usize = sym(6 + 1 + 108);
pub const NDB_TRAIN_OFFSET: usize = sym(6 + 1 + 108 + 7);
pub const NDB_BBK2_OFFSET: usize = sym(6 + 1 + 108 + 7 + 11);
pub const NDB_BLK2_OFFSET: usize = sym(6 + 1 + 108 + 7 + 11 + 8);
pub const NDB_HB_OFFSET: usize =   sym(6 + 1 + 108 + 7 + 11 + 8 + 108);

pub const NDB_BLK_BITS: usize =    sym(108);
pub const NDB_BBK1_BITS: usize =   sym(7);
pub const NDB_BBK2_BITS: usize =   sym(8);

/// Tail of the normal training sequence q, split around the burst: q11..q22 lead, q1..q10 trail
pub const TAIL_LEAD_BITS: usize = 12;
pub const TAIL_TRAIL_BITS: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::components::train_consts::{SEQ_NORM_DL_OFFSET, SEQ_SYNC_OFFSET, TIMESLOT_BITS};

    #[test]
    fn test_layouts_fill_timeslot() {
        assert_eq!(SB_BITS, TIMESLOT_BITS);
        assert_eq!(NDB_BITS, TIMESLOT_BITS);
        assert_eq!(SB_TRAIN_OFFSET, SEQ_SYNC_OFFSET);
        assert_eq!(NDB_TRAIN_OFFSET, SEQ_NORM_DL_OFFSET);
        assert_eq!(SB_BBK_BITS, NDB_BBK1_BITS + NDB_BBK2_BITS);
        assert_eq!(SB_HD_OFFSET + 2 + TAIL_TRAIL_BITS, SB_BITS);
        assert_eq!(NDB_HB_OFFSET + 2 + TAIL_TRAIL_BITS, NDB_BITS);
        assert_eq!(SB_HC_OFFSET, TAIL_LEAD_BITS);
    }
}
