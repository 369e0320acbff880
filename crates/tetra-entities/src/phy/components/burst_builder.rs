//! Assembly of downlink bursts from scrambled blocks, Clause 9.4.4.2.
//! The receive chain never builds bursts; this is used to synthesize test signals.

use super::burst_consts::*;
use super::train_consts::{FREQ_CORR_BITS, SEQ_NORM1, SEQ_NORM2, SEQ_NORM3, SEQ_SYNC, TIMESLOT_BITS};

/// Phase adjustment bit positions, Table 9.13
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAdj {
    Ha,
    Hb,
    Hc,
    Hd,
}

impl PhaseAdj {
    /// First and last symbol (1-based) covered by the adjustment
    fn symbol_range(self) -> (usize, usize) {
        match self {
            PhaseAdj::Ha => (8, 122),
            PhaseAdj::Hb => (123, 249),
            PhaseAdj::Hc => (8, 108),
            PhaseAdj::Hd => (109, 249),
        }
    }
}

/// Phase shift of a dibit in units of pi/4
const BITS2PHASE: [i32; 4] = [1, -1, 3, -3];

/// Cumulative phase shift of `sym_count` symbols starting at `bits[0]`, in units of pi/4
pub fn sum_up_phase(bits: &[u8], sym_count: usize) -> i32 {
    bits.chunks_exact(2)
        .take(sym_count)
        .map(|d| BITS2PHASE[((d[0] & 1) | ((d[1] & 1) << 1)) as usize])
        .sum()
}

/// Phase adjustment that brings `phase` back to a multiple of 2pi, wrapped into -3..=3
fn calc_phase_adj(phase: i32) -> i32 {
    let adj = -(phase % 8);
    if adj > 3 {
        adj - 8
    } else if adj < -3 {
        adj + 8
    } else {
        adj
    }
}

/// Dibit producing the given phase adjustment. The covered ranges hold an odd number
/// of symbols, so the adjustment is always an odd multiple of pi/4.
fn phase2bits(adj: i32) -> [u8; 2] {
    match adj {
        -3 => [1, 1],
        -1 => [1, 0],
        1 => [0, 0],
        _ => [0, 1],
    }
}

/// Compute the phase adjustment bits `pa` over `burst` and write them at `offset`
fn put_phase_adj_bits(burst: &mut [u8], pa: PhaseAdj, offset: usize) {
    let (n1, n2) = pa.symbol_range();
    let sum = sum_up_phase(&burst[2 * (n1 - 1)..], 1 + n2 - n1);
    let bits = phase2bits(calc_phase_adj(sum));
    burst[offset..offset + 2].copy_from_slice(&bits);
}

/// Synchronization continuous downlink burst, Clause 9.4.4.2.6
pub fn build_sync_burst(sb: &[u8; SB_BLK1_BITS], bb: &[u8; SB_BBK_BITS], bkn2: &[u8; SB_BLK2_BITS]) -> [u8; TIMESLOT_BITS] {
    let mut burst = [0u8; TIMESLOT_BITS];

    burst[..TAIL_LEAD_BITS].copy_from_slice(&SEQ_NORM3[10..]);
    burst[SB_FREQ_OFFSET..SB_BLK1_OFFSET].copy_from_slice(&FREQ_CORR_BITS);
    burst[SB_BLK1_OFFSET..SB_TRAIN_OFFSET].copy_from_slice(sb);
    burst[SB_TRAIN_OFFSET..SB_BBK_OFFSET].copy_from_slice(&SEQ_SYNC);
    burst[SB_BBK_OFFSET..SB_BLK2_OFFSET].copy_from_slice(bb);
    burst[SB_BLK2_OFFSET..SB_HD_OFFSET].copy_from_slice(bkn2);
    burst[SB_HD_OFFSET + 2..].copy_from_slice(&SEQ_NORM3[..TAIL_TRAIL_BITS]);

    put_phase_adj_bits(&mut burst, PhaseAdj::Hc, SB_HC_OFFSET);
    put_phase_adj_bits(&mut burst, PhaseAdj::Hd, SB_HD_OFFSET);
    burst
}

/// Normal continuous downlink burst, Clause 9.4.4.2.5. With `two_log_chan` the
/// p-sequence marks the two halves as independent logical channels.
pub fn build_norm_burst(
    bkn1: &[u8; NDB_BLK_BITS],
    bb: &[u8; SB_BBK_BITS],
    bkn2: &[u8; NDB_BLK_BITS],
    two_log_chan: bool,
) -> [u8; TIMESLOT_BITS] {
    let mut burst = [0u8; TIMESLOT_BITS];
    let train = if two_log_chan { &SEQ_NORM2 } else { &SEQ_NORM1 };

    burst[..TAIL_LEAD_BITS].copy_from_slice(&SEQ_NORM3[10..]);
    burst[NDB_BLK1_OFFSET..NDB_BBK1_OFFSET].copy_from_slice(bkn1);
    burst[NDB_BBK1_OFFSET..NDB_TRAIN_OFFSET].copy_from_slice(&bb[..NDB_BBK1_BITS]);
    burst[NDB_TRAIN_OFFSET..NDB_BBK2_OFFSET].copy_from_slice(train);
    burst[NDB_BBK2_OFFSET..NDB_BLK2_OFFSET].copy_from_slice(&bb[NDB_BBK1_BITS..]);
    burst[NDB_BLK2_OFFSET..NDB_HB_OFFSET].copy_from_slice(bkn2);
    burst[NDB_HB_OFFSET + 2..].copy_from_slice(&SEQ_NORM3[..TAIL_TRAIL_BITS]);

    put_phase_adj_bits(&mut burst, PhaseAdj::Ha, NDB_HA_OFFSET);
    put_phase_adj_bits(&mut burst, PhaseAdj::Hb, NDB_HB_OFFSET);
    burst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::components::train_consts::{SEQ_NORM_DL_OFFSET, SEQ_SYNC_OFFSET};

    fn random_bits<const N: usize>() -> [u8; N] {
        core::array::from_fn(|_| rand::random_range(0..2))
    }

    #[test]
    fn test_phase_adj() {
        assert_eq!(calc_phase_adj(0), 0);
        assert_eq!(calc_phase_adj(5), 3);
        assert_eq!(calc_phase_adj(-5), -3);
        assert_eq!(calc_phase_adj(11), -3);
        assert_eq!(calc_phase_adj(-13), -3);
        assert_eq!(sum_up_phase(&[0, 0, 1, 0, 0, 1, 1, 1], 4), 1 - 1 + 3 - 3);
    }

    #[test]
    fn test_phase2bits_matches_bits2phase() {
        for adj in [-3, -1, 1, 3] {
            assert_eq!(sum_up_phase(&phase2bits(adj), 1), adj, "adjustment {}", adj);
        }
    }

    #[test]
    fn test_sync_burst_layout() {
        let sb = random_bits::<SB_BLK1_BITS>();
        let bb = random_bits::<SB_BBK_BITS>();
        let bkn2 = random_bits::<SB_BLK2_BITS>();
        let burst = build_sync_burst(&sb, &bb, &bkn2);

        assert_eq!(&burst[SEQ_SYNC_OFFSET..SEQ_SYNC_OFFSET + 38], &SEQ_SYNC);
        assert_eq!(&burst[SB_BLK1_OFFSET..SB_BLK1_OFFSET + SB_BLK1_BITS], &sb);
        assert_eq!(&burst[SB_BBK_OFFSET..SB_BBK_OFFSET + SB_BBK_BITS], &bb);
        assert_eq!(&burst[SB_BLK2_OFFSET..SB_BLK2_OFFSET + SB_BLK2_BITS], &bkn2);

        let hc = sum_up_phase(&burst[SB_HC_OFFSET..], 1);
        assert_eq!((sum_up_phase(&burst[2 * 7..], 101) + hc).rem_euclid(8), 0);
        let hd = sum_up_phase(&burst[SB_HD_OFFSET..], 1);
        assert_eq!((sum_up_phase(&burst[2 * 108..], 141) + hd).rem_euclid(8), 0);
    }

    #[test]
    fn test_norm_burst_phase_closes() {
        let bkn1 = random_bits::<NDB_BLK_BITS>();
        let bb = random_bits::<SB_BBK_BITS>();
        let bkn2 = random_bits::<NDB_BLK_BITS>();

        for two_log_chan in [false, true] {
            let burst = build_norm_burst(&bkn1, &bb, &bkn2, two_log_chan);
            let train: &[u8] = if two_log_chan { &SEQ_NORM2 } else { &SEQ_NORM1 };
            assert_eq!(&burst[SEQ_NORM_DL_OFFSET..SEQ_NORM_DL_OFFSET + 22], train);

            // Phase over each covered range plus its adjustment symbol is a multiple of 2pi
            let ha = sum_up_phase(&burst[NDB_HA_OFFSET..], 1);
            assert_eq!((sum_up_phase(&burst[2 * 7..], 115) + ha).rem_euclid(8), 0);
            let hb = sum_up_phase(&burst[NDB_HB_OFFSET..], 1);
            assert_eq!((sum_up_phase(&burst[2 * 122..], 127) + hb).rem_euclid(8), 0);
        }
    }
}
