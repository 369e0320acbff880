/// TETRA ACELP bit reordering: converts between codec order (STE format) and channel order (type-1 bits).
///
/// TCH/S carries two 137-bit subframes (274 bits total), interleaved by sensitivity class (EN 300 395-2, Table 4):
///   - Class 0: 51 bits/subframe (unprotected)
///   - Class 1: 56 bits/subframe (medium)
///   - Class 2: 30 bits/subframe (most sensitive)

const NUM_ACELP_BITS: usize = 137; // bits per subframe

/// Class 0 positions (1-indexed within 137-bit subframe) from EN 300 395-2, Table 4.
const CLASS0_POS: [u8; 51] = [
    35, 36, 37, 38, 39, 40, 41, 42, 43, 47, 48, 56, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, 74, 75, 83, 88, 89, 90, 91, 92, 93, 94, 95, 96,
    97, 101, 102, 110, 115, 116, 117, 118, 119, 120, 121, 122, 123, 124, 128, 129, 137,
];

/// EN 300 395-2, Table 4, class 1 positions (1-indexed)
const CLASS1_POS: [u8; 56] = [
    58, 85, 112, 54, 81, 108, 135, 50, 77, 104, 131, 45, 72, 99, 126, 55, 82, 109, 136, 5, 13, 34, 8, 16, 17, 22, 23, 24, 25, 26, 6, 14, 7,
    15, 60, 87, 114, 46, 73, 100, 127, 44, 71, 98, 125, 33, 49, 76, 103, 130, 59, 86, 113, 57, 84, 111,
];

/// EN 300 395-2, Table 4, class 2 positions (1-indexed)
const CLASS2_POS: [u8; 30] = [
    18, 19, 20, 21, 31, 32, 53, 80, 107, 134, 1, 2, 3, 4, 9, 10, 11, 12, 27, 28, 29, 30, 52, 79, 106, 133, 51, 78, 105, 132,
];

/// Position tables in channel order, class 0 first
fn class_tables() -> [&'static [u8]; 3] {
    [&CLASS0_POS, &CLASS1_POS, &CLASS2_POS]
}

/// Convert 274 ACELP bits from codec order (STE format) to channel order (type-1 bits). One-bit-per-byte.
pub fn codec_to_channel(codec_bits: &[u8; 274]) -> [u8; 274] {
    let mut channel = [0u8; 274];
    let mut out_idx = 0;

    for table in class_tables() {
        for &p in table {
            let pos = (p - 1) as usize;
            channel[out_idx] = codec_bits[pos];
            channel[out_idx + 1] = codec_bits[NUM_ACELP_BITS + pos];
            out_idx += 2;
        }
    }

    debug_assert_eq!(out_idx, 274);
    channel
}

/// Convert 274 ACELP bits from channel order to codec order. Reverse of `codec_to_channel`.
pub fn channel_to_codec(channel_bits: &[u8; 274]) -> [u8; 274] {
    let mut codec = [0u8; 274];
    let mut in_idx = 0;

    for table in class_tables() {
        for &p in table {
            let pos = (p - 1) as usize;
            codec[pos] = channel_bits[in_idx];
            codec[NUM_ACELP_BITS + pos] = channel_bits[in_idx + 1];
            in_idx += 2;
        }
    }

    debug_assert_eq!(in_idx, 274);
    codec
}
