use tetra_core::BitBuffer;

use crate::lmac::components::convenc::{self, ConvCode, ConvEncState, RcpcPunctMode};
use crate::lmac::components::errorcontrol_params::ErrorControlParams;
use crate::lmac::components::viterbi::{self, SoftBit, ViterbiDecoder, ViterbiError};
use crate::lmac::components::{crc16, interleaver, rm3014, scrambler, tch_reorder};

const MAX_TYPE2_BITS: usize = 288;
pub const MAX_TYPE345_BITS: usize = 432;

/// Bits in one TCH/S frame, two ACELP subframes
pub const TCH_S_BITS: usize = 274;

// Unequal error protection classes of a TCH/S frame, both subframes together
const CLASS0_BITS: usize = 102;
const CLASS1_BITS: usize = 112;
const CLASS2_BITS: usize = 60;
const CLASS2_CRC_BITS: usize = 8;
const CLASS1_TYPE3: usize = 168;
const CLASS2_TYPE3: usize = 162;
/// Mother code bits of class 1
const CLASS1_MOTHER: usize = CLASS1_BITS * 3;
/// Data bits fed through the speech convolutional code
const SPEECH_CODED_BITS: usize = CLASS1_BITS + CLASS2_BITS + CLASS2_CRC_BITS;

/// Voice frames are matrix interleaved over 24 lines of 18 bits
const TCH_INTERLEAVE_LINES: usize = 24;
const TCH_INTERLEAVE_COLUMNS: usize = 18;

/// Encodes a control plane block from type1 to type5 bits.
/// Handles all CRC protected blocks, AACH is done by `encode_aach`.
/// Returns None if the length of `type1` does not match the block type.
pub fn encode_cp(params: &ErrorControlParams, type1: &BitBuffer, scrambling_code: u32) -> Option<BitBuffer> {
    if !params.have_crc16 || type1.get_len() != params.type1_bits {
        tracing::warn!("encode_cp {}: cannot encode {} type1 bits", params.name, type1.get_len());
        return None;
    }
    tracing::trace!("encode_cp {} type1 {}", params.name, type1.dump_bin());

    // CRC addition, type1 -> type2. Tail bits stay zero.
    let mut type2_arr = [0u8; MAX_TYPE2_BITS];
    type1.to_bitarr(&mut type2_arr[0..params.type1_bits]);
    crc16::crc16_append(&mut type2_arr, params.type1_bits)?;

    // Convolutional encoding, type2 -> type3dp
    let code = ConvCode::cch(params.type2_bits - 4);
    let mut type3dp_arr = [0u8; MAX_TYPE2_BITS * 4];
    let mut ces = ConvEncState::new(&code);
    ces.encode(&type2_arr[0..params.type2_bits], &mut type3dp_arr);

    // Puncturing, type3dp -> type3
    let mut type3_arr = [0u8; MAX_TYPE345_BITS];
    convenc::get_punctured_rate(RcpcPunctMode::Rate2_3, &type3dp_arr, &mut type3_arr[0..params.type345_bits]);

    // Interleaving, type3 -> type4
    let mut type4_arr = [0u8; MAX_TYPE345_BITS];
    interleaver::block_interleave(params.type345_bits, params.interleave_a, &type3_arr, &mut type4_arr);
    let mut type4 = BitBuffer::from_bitarr(&type4_arr[0..params.type345_bits]);

    // Scrambling, type4 -> type5
    scrambler::tetra_scramb_bits(scrambling_code, &mut type4);
    tracing::trace!("encode_cp {} type5 {}", params.name, type4.dump_bin());
    Some(type4)
}

/// Decodes a control plane block from type4 (descrambled) to type1 bits.
/// Returns the type1 bits, without CRC, and whether the CRC check passed.
/// Decoding is best effort, the type1 bits are returned regardless of the CRC outcome.
pub fn decode_cp_type4(params: &ErrorControlParams, type4: &[u8]) -> Result<(BitBuffer, bool), ViterbiError> {
    let len = params.type345_bits;

    // De-interleaving, type4 -> type3
    let mut type3_arr = [0u8; MAX_TYPE345_BITS];
    interleaver::block_deinterleave(len, params.interleave_a, type4, &mut type3_arr);
    tracing::trace!("decode_cp {} type3 {}", params.name, BitBuffer::from_bitarr(&type3_arr[0..len]).dump_bin());

    // De-puncturing, type3 -> type3dp. Untransmitted mother bits are erasures.
    let mut type3dp_arr = [viterbi::HARD_ERASED; MAX_TYPE2_BITS * 4];
    convenc::tetra_rcpc_depunct(RcpcPunctMode::Rate2_3, &type3_arr, len, &mut type3dp_arr);

    // Viterbi, type3dp -> type2
    let soft: Vec<SoftBit> = type3dp_arr[0..params.type2_bits * 4].iter().map(|&b| viterbi::hard_to_soft(b)).collect();
    let decoder = ViterbiDecoder::new_cch(params.type2_bits - 4)?;
    let type2 = decoder.decode(&soft);

    // CRC check, type2 -> type1
    let crc_ok = params.have_crc16 && crc16::crc16_check(&type2, params.type1_bits + 16);
    let type1 = BitBuffer::from_bitarr(&type2[0..params.type1_bits]);
    tracing::trace!("decode_cp {} crc {} type1 {}", params.name, if crc_ok { "OK" } else { "WRONG" }, type1.dump_bin());

    Ok((type1, crc_ok))
}

/// Decodes a control plane block from type5 to type1 bits, see `decode_cp_type4`
pub fn decode_cp(params: &ErrorControlParams, type5: &BitBuffer, scrambling_code: u32) -> Result<(BitBuffer, bool), ViterbiError> {
    let mut type4 = BitBuffer::from_bitbuffer(type5);
    scrambler::tetra_scramb_bits(scrambling_code, &mut type4);
    decode_cp_type4(params, type4.as_bits())
}

/// Encodes an AACH from 14 type1 bits to 30 type5 bits
pub fn encode_aach(type1: &BitBuffer, scrambling_code: u32) -> Option<BitBuffer> {
    if type1.get_len() != 14 {
        return None;
    }
    let type1_int = type1.peek_bits_startoffset(0, 14)? as u16;

    // RM code type1 -> type2, no interleaving or puncturing for the AACH
    let type2_int = rm3014::rm3014_compute(type1_int);
    let mut type2 = BitBuffer::new(30);
    type2.write_bits(type2_int as u64, 30);
    type2.seek(0);

    // Scrambling, type2 -> type5
    scrambler::tetra_scramb_bits(scrambling_code, &mut type2);
    tracing::trace!("encode_aach type5 {}", type2.dump_bin());
    Some(type2)
}

/// Decodes an AACH from 30 type5 bits to 14 type1 bits
pub fn decode_aach(type5: &BitBuffer, scrambling_code: u32) -> Option<BitBuffer> {
    if type5.get_len() != 30 {
        return None;
    }
    let mut type2 = BitBuffer::from_bitbuffer(type5);
    scrambler::tetra_scramb_bits(scrambling_code, &mut type2);
    let x = type2.read_bits(30)? as u32;

    // TODO: RM(30,14) error correction (Clause 8.3.1.1), bits are taken as received
    let y = rm3014::rm3014_decode(x);
    let mut type1 = BitBuffer::new(14);
    type1.write_bits(y as u64, 14);
    type1.seek(0);
    tracing::trace!("decode_aach type1 {}", type1.dump_bin());
    Some(type1)
}

/// Compute 8 CRC parity bits for 60 Class 2 bits using G(X) = 1 + X³ + X⁷ (EN 300 395-2, §5.5.1).
/// Returns [b1..b7, b8] where b8 is the overall parity of the 60 data bits and 7 CRC bits.
pub fn speech_crc(class2_bits: &[u8]) -> [u8; 8] {
    debug_assert_eq!(class2_bits.len(), CLASS2_BITS);

    // X⁷ · I(X) mod (X⁷ + X³ + 1), dividend in w[7..67]
    let mut w = [0u8; 67];
    for (k, &bit) in class2_bits.iter().take(CLASS2_BITS).enumerate() {
        w[k + 7] = bit & 1;
    }
    for d in (7..67).rev() {
        if w[d] == 1 {
            w[d] ^= 1;
            w[d - 4] ^= 1;
            w[d - 7] ^= 1;
        }
    }

    let mut result = [0u8; 8];
    result[0..7].copy_from_slice(&w[0..7]);
    let parity = class2_bits.iter().chain(&result[0..7]).fold(0, |acc, &b| acc ^ (b & 1));
    result[7] = parity;
    result
}

/// Encode a TCH/S frame of 274 ACELP bits in codec order into 432 type5 bits.
/// Class 0 is sent uncoded, class 1 and class 2 (with CRC) go through one
/// continuous speech code pass and are punctured separately.
pub fn encode_tp(codec_bits: &[u8; TCH_S_BITS], scrambling_code: u32) -> BitBuffer {
    let channel = tch_reorder::codec_to_channel(codec_bits);
    let mut type3_arr = [0u8; MAX_TYPE345_BITS];

    // Class 0, uncoded
    type3_arr[0..CLASS0_BITS].copy_from_slice(&channel[0..CLASS0_BITS]);

    // Class 1 and class 2 with CRC, followed by 4 flush bits
    let mut coded_input = [0u8; SPEECH_CODED_BITS];
    coded_input[0..CLASS1_BITS + CLASS2_BITS].copy_from_slice(&channel[CLASS0_BITS..TCH_S_BITS]);
    let crc = speech_crc(&channel[CLASS0_BITS + CLASS1_BITS..TCH_S_BITS]);
    coded_input[CLASS1_BITS + CLASS2_BITS..].copy_from_slice(&crc);

    let code = ConvCode::speech(SPEECH_CODED_BITS);
    let mut mother = [0u8; (SPEECH_CODED_BITS + 4) * 3];
    ConvEncState::new(&code).encode_flush(&coded_input, &mut mother);

    let class1_out = CLASS0_BITS..CLASS0_BITS + CLASS1_TYPE3;
    let class2_out = CLASS0_BITS + CLASS1_TYPE3..MAX_TYPE345_BITS;
    convenc::get_punctured_rate(RcpcPunctMode::Rate112_168, &mother[..CLASS1_MOTHER], &mut type3_arr[class1_out]);
    convenc::get_punctured_rate(RcpcPunctMode::Rate72_162, &mother[CLASS1_MOTHER..], &mut type3_arr[class2_out]);

    // type3 -> type4 -> type5
    let mut type4_arr = [0u8; MAX_TYPE345_BITS];
    interleaver::matrix_interleave(TCH_INTERLEAVE_LINES, TCH_INTERLEAVE_COLUMNS, &type3_arr, &mut type4_arr);
    let mut type5 = BitBuffer::from_bitarr(&type4_arr);
    scrambler::tetra_scramb_bits(scrambling_code, &mut type5);
    type5
}

/// Decode a TCH/S frame from 432 soft type4 (descrambled) bits.
/// Returns the 274 ACELP bits in codec order and whether the class 2 CRC passed.
pub fn decode_tp(type4: &[SoftBit; MAX_TYPE345_BITS]) -> Result<([u8; TCH_S_BITS], bool), ViterbiError> {
    let mut type3 = [viterbi::SOFT_ERASED; MAX_TYPE345_BITS];
    interleaver::matrix_deinterleave(TCH_INTERLEAVE_LINES, TCH_INTERLEAVE_COLUMNS, type4, &mut type3);

    let mut channel = [0u8; TCH_S_BITS];

    // Class 0: hard decisions on the uncoded bits
    for (dst, &src) in channel[0..CLASS0_BITS].iter_mut().zip(&type3[0..CLASS0_BITS]) {
        *dst = (src < 0) as u8;
    }

    // Class 1 and 2: depuncture separately, decode as one stream
    let mut mother = [viterbi::SOFT_ERASED; (SPEECH_CODED_BITS + 4) * 3];
    let class1_in = &type3[CLASS0_BITS..CLASS0_BITS + CLASS1_TYPE3];
    let class2_in = &type3[CLASS0_BITS + CLASS1_TYPE3..];
    let (mother1, mother2) = mother.split_at_mut(CLASS1_MOTHER);
    convenc::tetra_rcpc_depunct(RcpcPunctMode::Rate112_168, class1_in, CLASS1_TYPE3, mother1);
    convenc::tetra_rcpc_depunct(RcpcPunctMode::Rate72_162, class2_in, CLASS2_TYPE3, mother2);

    let decoder = ViterbiDecoder::new_speech(SPEECH_CODED_BITS)?;
    let decoded = decoder.decode(&mother);

    channel[CLASS0_BITS..TCH_S_BITS].copy_from_slice(&decoded[0..CLASS1_BITS + CLASS2_BITS]);
    let class2 = &decoded[CLASS1_BITS..CLASS1_BITS + CLASS2_BITS];
    let crc_ok = speech_crc(class2)[..] == decoded[CLASS1_BITS + CLASS2_BITS..SPEECH_CODED_BITS];

    Ok((tch_reorder::channel_to_codec(&channel), crc_ok))
}
