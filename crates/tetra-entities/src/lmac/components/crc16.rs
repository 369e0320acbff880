/// CRC-16 (ITU-T / X.25) over one-bit-per-byte streams, Clause 8.2.3.3
pub const GEN_POLY: u16 = 0x1021;

/// Remainder left over a block with correctly appended check bits
pub const TETRA_CRC_OK: u16 = 0x1d0f;

/// CRC-16 ITU-T over a bit-per-byte slice: each `input[i] & 1` is one bit.
/// `crc` is the initial CRC value.
/// Processes the first `number_bits` entries of `input`.
pub fn crc16_itut_bits(mut crc: u16, input: &[u8], number_bits: usize) -> u16 {
    for &b in input.iter().take(number_bits) {
        let bit = (b & 1) as u16;
        crc ^= bit << 15;
        if (crc & 0x8000) != 0 {
            crc = (crc << 1) ^ GEN_POLY;
        } else {
            crc <<= 1;
        }
    }
    crc
}

/// Standard CRC-ITU-T (initial 0xffff) over a bit-per-byte slice, as it is used in TETRA.
pub fn crc16_ccitt_bits(input: &[u8], len: usize) -> u16 {
    crc16_itut_bits(0xffff, input, len)
}

/// True if `len` bits (payload followed by 16 check bits) carry a valid CRC
#[inline]
pub fn crc16_check(input: &[u8], len: usize) -> bool {
    crc16_ccitt_bits(input, len) == TETRA_CRC_OK
}

/// Writes the 16 check bits for `buf[..payload_len]` into `buf[payload_len..payload_len + 16]`.
/// Returns None if `buf` is too short.
pub fn crc16_append(buf: &mut [u8], payload_len: usize) -> Option<()> {
    if buf.len() < payload_len + 16 {
        return None;
    }
    let crc = !crc16_ccitt_bits(&buf[..payload_len], payload_len);
    for (i, b) in buf[payload_len..payload_len + 16].iter_mut().enumerate() {
        *b = ((crc >> (15 - i)) & 1) as u8;
    }
    Some(())
}
