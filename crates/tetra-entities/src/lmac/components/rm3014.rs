/// Shortened (30,14) Reed-Muller code, Clause 8.2.3.2
/// Used for the AACH in the broadcast block of every downlink burst.

/// Parity part of the generator matrix, one row per input bit, MSB first
const RM3014_GEN: [[u8; 16]; 14] = [
    [1, 0, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 0, 0, 0, 0],
    [0, 0, 1, 0, 1, 1, 0, 1, 1, 1, 1, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
    [1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0],
    [1, 0, 0, 1, 1, 0, 0, 0, 0, 0, 1, 1, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 1, 1, 0, 1, 1, 0],
    [0, 0, 1, 0, 1, 1, 0, 0, 0, 0, 1, 0, 1, 1, 1, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 1, 1, 0, 0, 1, 1, 1, 0, 0, 1],
    [0, 1, 0, 0, 0, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1],
    [0, 0, 1, 0, 0, 0, 0, 1, 1, 0, 1, 0, 1, 1, 0, 1],
    [0, 0, 0, 1, 0, 0, 1, 0, 0, 1, 1, 1, 0, 0, 1, 1],
    [0, 0, 0, 0, 1, 0, 0, 1, 0, 1, 1, 0, 1, 0, 1, 1],
    [0, 0, 0, 0, 0, 1, 0, 0, 1, 1, 1, 0, 0, 1, 1, 1],
];

/// Full 30-bit generator rows: identity in the upper 14 bits, parity in the lower 16
const RM3014_ROWS: [u32; 14] = {
    let mut rows = [0u32; 14];
    let mut i = 0;
    while i < 14 {
        let mut val = 1u32 << (16 + 13 - i);
        let mut j = 0;
        while j < 16 {
            val |= (RM3014_GEN[i][j] as u32) << (15 - j);
            j += 1;
        }
        rows[i] = val;
        i += 1;
    }
    rows
};

/// Encodes the lower 14 bits of `input` into a 30-bit codeword
pub fn rm3014_compute(input: u16) -> u32 {
    let mut val = 0;
    for (i, row) in RM3014_ROWS.iter().enumerate() {
        if (input >> (13 - i)) & 1 == 1 {
            val ^= row;
        }
    }
    val
}

/// Systematic decode: returns the upper 14 bits of the codeword.
/// No error detection or correction is performed.
pub fn rm3014_decode(input: u32) -> u16 {
    ((input >> 16) & 0x3fff) as u16
}
