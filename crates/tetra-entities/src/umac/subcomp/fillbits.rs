pub mod removal {
    use tetra_core::bitbuffer::BitBuffer;

    /// Returns the number of fill bits at the end of the PDU in bitbuf, given the total
    /// pdu_len_bits. Fill bits are a 1 followed by zeroes, so this is the distance from the
    /// end to the last 1 bit, inclusive. The first bit of the PDU is never taken as fill.
    pub fn get_num_fill_bits(bitbuf: &BitBuffer, pdu_len_bits: usize, suppress_warning: bool) -> usize {
        let pdu_len_bits = pdu_len_bits.min(bitbuf.get_len());
        let bits = &bitbuf.as_bits()[..pdu_len_bits];
        for i in 1..pdu_len_bits {
            if bits[pdu_len_bits - i] == 1 {
                return i;
            }
        }

        if !suppress_warning {
            tracing::warn!("No fill bits found within {} bits", pdu_len_bits);
        }

        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetra_core::BitBuffer;

    #[test]
    fn test_fill_bit_removal() {
        let buf = BitBuffer::from_bitstr("0110100110000000");
        assert_eq!(removal::get_num_fill_bits(&buf, 16, false), 8);
        assert_eq!(removal::get_num_fill_bits(&buf, 9, false), 1);
        // Only the window up to the PDU length is scanned
        assert_eq!(removal::get_num_fill_bits(&buf, 7, false), 3);
        // A leading 1 is never fill
        assert_eq!(removal::get_num_fill_bits(&BitBuffer::from_bitstr("1000"), 4, true), 0);
        assert_eq!(removal::get_num_fill_bits(&BitBuffer::new(32), 32, true), 0);
    }
}
