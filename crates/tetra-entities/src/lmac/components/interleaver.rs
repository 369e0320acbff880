/// Block and matrix interleavers, Clause 8.2.4

/// Interleaved position (1-based) of input bit `i` for a block of `k` bits with step `a`
pub const fn block_interl_func(k: u32, a: u32, i: u32) -> u32 {
    1 + ((a.wrapping_mul(i)) % k)
}

/// (K, a) block interleaving. `input` and `output` must hold at least `k` bits.
pub fn block_interleave(k: usize, a: usize, input: &[u8], output: &mut [u8]) {
    debug_assert!(input.len() >= k && output.len() >= k);
    for i in 1..=k {
        let k = block_interl_func(k as u32, a as u32, i as u32) as usize;
        output[k - 1] = input[i - 1];
    }
}

pub fn block_deinterleave(k: usize, a: usize, input: &[u8], output: &mut [u8]) {
    debug_assert!(input.len() >= k && output.len() >= k);
    for i in 1..=k {
        let k = block_interl_func(k as u32, a as u32, i as u32) as usize;
        output[i - 1] = input[k - 1];
    }
}

/// Matrix interleaving: the input is written row by row into a `lines` x `columns`
/// matrix and read out column by column.
pub fn matrix_interleave<T: Copy>(lines: usize, columns: usize, input: &[T], output: &mut [T]) {
    debug_assert!(input.len() >= lines * columns && output.len() >= lines * columns);
    for i in 0..columns {
        for j in 0..lines {
            output[i * lines + j] = input[j * columns + i];
        }
    }
}

pub fn matrix_deinterleave<T: Copy>(lines: usize, columns: usize, input: &[T], output: &mut [T]) {
    debug_assert!(input.len() >= lines * columns && output.len() >= lines * columns);
    for i in 0..columns {
        for j in 0..lines {
            output[j * columns + i] = input[i * lines + j];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_interleave_roundtrip() {
        // (K, a) pairs of the downlink control channels
        for (k, a) in [(120, 11), (216, 101), (168, 13), (432, 103)] {
            let data: Vec<u8> = (0..k).map(|i| (i % 251) as u8).collect();
            let mut tmp = vec![0u8; k];
            let mut out = vec![0u8; k];

            block_interleave(k, a, &data, &mut tmp);
            assert_ne!(data, tmp);
            block_deinterleave(k, a, &tmp, &mut out);
            assert_eq!(data, out, "K={} a={}", k, a);
        }
    }

    #[test]
    fn test_block_interleave_positions() {
        // First bit of an SB1 lands on position 1 + 11 mod 120
        let mut input = [0u8; 120];
        input[0] = 1;
        let mut out = [0u8; 120];
        block_interleave(120, 11, &input, &mut out);
        assert_eq!(out[11], 1);
    }

    #[test]
    fn test_matrix_interleave_transpose() {
        let lines = 4;
        let columns = 3;
        let data: Vec<u8> = (0..(lines * columns) as u8).collect();
        let mut tmp = vec![0u8; lines * columns];
        let mut out = vec![0u8; lines * columns];

        matrix_interleave(lines, columns, &data, &mut tmp);
        assert_eq!(tmp, vec![0, 3, 6, 9, 1, 4, 7, 10, 2, 5, 8, 11]);
        matrix_deinterleave(lines, columns, &tmp, &mut out);
        assert_eq!(data, out);
    }

    #[test]
    fn test_matrix_interleave_soft() {
        let data: Vec<i16> = (0..432).map(|i| if i % 3 == 0 { 127 } else { -127 }).collect();
        let mut tmp = vec![0i16; 432];
        let mut out = vec![0i16; 432];
        matrix_interleave(24, 18, &data, &mut tmp);
        matrix_deinterleave(24, 18, &tmp, &mut out);
        assert_eq!(data, out);
    }
}
