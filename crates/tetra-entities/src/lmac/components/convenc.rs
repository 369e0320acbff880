// Convolutional encoder and puncturing for TETRA, Clause 8.2.3.1

/// Puncturing rates
#[repr(usize)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RcpcPunctMode {
    Rate2_3     = 0,
    Rate1_3     = 1,
    Rate292_432 = 2,
    Rate148_432 = 3,
    Rate112_168 = 4,
    Rate72_162  = 5,
    Rate38_80   = 6,
}

/// How the encoder state is handled at the end of a block
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConvTermination {
    /// Encoder is flushed back to state 0 with K-1 tail bits
    Flush,
    /// Block simply ends, final state unknown
    Truncation,
    /// Encoder starts in the state it ends in
    TailBiting,
}

/// A non-recursive convolutional code of rate 1/N
#[derive(Clone, Debug)]
pub struct ConvCode {
    /// Outputs per input bit
    pub n: usize,
    /// Constraint length
    pub k: usize,
    /// Number of data bits, excluding flush bits
    pub len: usize,
    pub term: ConvTermination,
    /// Generator polynomials, bit i is the tap on D^i
    pub generators: &'static [u32],
    /// Sorted indices of mother code bits that are not transmitted
    pub puncture: Option<&'static [usize]>,
}

/// G1 = 1 + D + D4, G2 = 1 + D2 + D3 + D4, G3 = 1 + D + D2 + D4, G4 = 1 + D + D3 + D4
pub const CCH_GENERATORS: [u32; 4] = [0b10011, 0b11101, 0b10111, 0b11011];

/// G1 = 1 + D + D2 + D3 + D4, G2 = 1 + D + D3 + D4, G3 = 1 + D2 + D4
pub const SPEECH_GENERATORS: [u32; 3] = [0b11111, 0b11011, 0b10101];

impl ConvCode {
    /// Rate 1/4 mother code used by all signalling channels, for `len` data bits
    pub fn cch(len: usize) -> Self {
        Self {
            n: 4,
            k: 5,
            len,
            term: ConvTermination::Flush,
            generators: &CCH_GENERATORS,
            puncture: None,
        }
    }

    /// Rate 1/3 mother code protecting class 1 and class 2 speech bits
    pub fn speech(len: usize) -> Self {
        Self {
            n: 3,
            k: 5,
            len,
            term: ConvTermination::Flush,
            generators: &SPEECH_GENERATORS,
            puncture: None,
        }
    }

    /// Number of trellis steps covered by the encoded block
    pub fn num_steps(&self) -> usize {
        match self.term {
            ConvTermination::Flush => self.len + self.k - 1,
            _ => self.len,
        }
    }

    /// Output bits of all generators for a K-bit register, D^0 in bit 0
    #[inline]
    pub fn output(&self, reg: u32) -> u32 {
        let mut out = 0;
        for (i, g) in self.generators.iter().enumerate() {
            out |= ((reg & g).count_ones() & 1) << i;
        }
        out
    }
}

/// Shift register state of a convolutional encoder
#[derive(Clone, Debug)]
pub struct ConvEncState<'a> {
    code: &'a ConvCode,
    reg: u32,
}

impl<'a> ConvEncState<'a> {
    /// Create a new encoder state (all zeros).
    #[inline]
    pub fn new(code: &'a ConvCode) -> Self {
        Self { code, reg: 0 }
    }

    /// Reset to all-zero state.
    #[inline]
    pub fn reset(&mut self) {
        self.reg = 0;
    }

    /// Encode a single input bit into N output bits, written to `out[0..N]`.
    #[inline(always)]
    fn encode_bit(&mut self, bit: u8, out: &mut [u8]) {
        let mask = (1u32 << self.code.k) - 1;
        self.reg = ((self.reg << 1) | (bit & 1) as u32) & mask;
        let outbits = self.code.output(self.reg);
        for (i, o) in out.iter_mut().enumerate() {
            *o = ((outbits >> i) & 1) as u8;
        }
    }

    /// Encode a sequence of bits (`input.len()` bytes, one bit each) into
    /// `N * input.len()` output bits in `output`. The encoder state carries over
    /// between calls. Returns the number of bits written.
    pub fn encode(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        let n = self.code.n;
        let mut written = 0;
        for (&bit, out_chunk) in input.iter().zip(output.chunks_exact_mut(n)) {
            self.encode_bit(bit, out_chunk);
            written += n;
        }
        written
    }

    /// Encode `input` followed by K-1 zero flush bits
    pub fn encode_flush(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        let flush = [0u8; 8];
        let written = self.encode(input, output);
        let tail_len = self.code.k - 1;
        written + self.encode(&flush[..tail_len.min(8)], &mut output[written..])
    }
}

type IFunc = fn(u32) -> u32;

#[inline(always)]
const fn i_equals(j: u32) -> u32 {
    j
}

#[inline(always)]
const fn i_292(j: u32) -> u32 {
    j + ((j - 1) / 65)
}

#[inline(always)]
const fn i_148(j: u32) -> u32 {
    j + ((j - 1) / 35)
}

/// Puncturer parameters
#[derive(Copy, Clone)]
struct Puncturer {
    /// Puncturing pattern indices
    p: &'static [u32],
    /// puncturing period t
    t: u32,
    /// interleaving period
    period: u32,
    /// index mapping function
    i_func: IFunc,
}

// P-arrays
const P_RATE2_3: &[u32] = &[0, 1, 2, 5];
const P_RATE1_3: &[u32] = &[0, 1, 2, 3, 5, 6, 7];
const P_RATE8_12: &[u32] = &[0, 1, 2, 4];
const P_RATE8_18: &[u32] = &[0, 1, 2, 3, 4, 5, 7, 8, 10, 11];
const P_RATE8_17: &[u32] = &[0, 1, 2, 3, 4, 5, 7, 8, 10, 11, 13, 14, 16, 17, 19, 20, 22, 23];

// Get puncturer parameters by enum type
fn get_puncturer(pu: RcpcPunctMode) -> Puncturer {
    const PUNCTURERS: [Puncturer; 7] = [
        Puncturer { p: P_RATE2_3, t: 3,  period:  8, i_func: i_equals },
        Puncturer { p: P_RATE1_3, t: 6,  period:  8, i_func: i_equals },
        Puncturer { p: P_RATE2_3, t: 3,  period:  8, i_func: i_292   },
        Puncturer { p: P_RATE1_3, t: 6,  period:  8, i_func: i_148   },
        Puncturer { p: P_RATE8_12, t: 3, period:  6, i_func: i_equals },
        Puncturer { p: P_RATE8_18, t: 9, period: 12, i_func: i_equals },
        Puncturer { p: P_RATE8_17, t:17, period: 24, i_func: i_equals },
    ];

    PUNCTURERS[pu as usize]
}

/// Mother code position (1-based) of punctured output bit `j` (1-based)
#[inline]
fn punct_index(puncturer: &Puncturer, j: u32) -> usize {
    let i = (puncturer.i_func)(j);
    let blk = (i - 1) / puncturer.t;
    let idx = (i - puncturer.t * blk) as usize;
    (puncturer.period * blk + puncturer.p[idx]) as usize
}

/// Puncture the `input` mother-code bits into `output` of length `output.len()`.
pub fn get_punctured_rate<T: Copy>(pu: RcpcPunctMode, input: &[T], output: &mut [T]) {
    let puncturer = get_puncturer(pu);
    for (j, out) in output.iter_mut().enumerate() {
        let k = punct_index(&puncturer, j as u32 + 1);
        *out = input[k - 1];
    }
}

/// De-puncture `len` `input` bits back into the `output` mother-code buffer.
/// Positions that were not transmitted are left untouched, callers pre-fill
/// `output` with their erasure value.
pub fn tetra_rcpc_depunct<T: Copy>(pu: RcpcPunctMode, input: &[T], len: usize, output: &mut [T]) {
    let puncturer = get_puncturer(pu);
    for (j, &bit) in input.iter().take(len).enumerate() {
        let k = punct_index(&puncturer, j as u32 + 1);
        output[k - 1] = bit;
    }
}
