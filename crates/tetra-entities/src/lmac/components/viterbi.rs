use core::fmt;

use crate::lmac::components::convenc::{ConvCode, ConvTermination};

/// Type used to represent input bits.
/// A hard "0" is represented as +127, a hard "1" as -127, and an erased
/// (punctured) bit as 0. Intermediate values express soft decisions.
pub type SoftBit = i8;

/// Type used to accumulate path metrics.
/// The decoder renormalizes often enough for the sums to stay within range.
type Metric = i16;

pub const SOFT_ZERO: SoftBit = 127;
pub const SOFT_ONE: SoftBit = -127;
pub const SOFT_ERASED: SoftBit = 0;

/// Marker used in one-bit-per-byte buffers for mother code bits that were not transmitted
pub const HARD_ERASED: u8 = 0xff;

/// Highest constraint length supported by the decoder
pub const MAX_K: usize = 7;
/// Highest number of outputs per input bit supported by the decoder
pub const MAX_N: usize = 8;

/// Number of states for a given constraint length.
pub const fn num_states(k: usize) -> usize {
    1 << (k - 1)
}

/// Map a hard bit to a soft bit, `HARD_ERASED` becomes an erasure
#[inline]
pub fn hard_to_soft(bit: u8) -> SoftBit {
    match bit {
        0 => SOFT_ZERO,
        HARD_ERASED => SOFT_ERASED,
        _ => SOFT_ONE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViterbiError {
    /// No metric kernel exists for this code shape
    UnsupportedCode { n: usize, k: usize },
    /// The code has no data bits or its generator count does not match N
    InvalidCode,
}

impl fmt::Display for ViterbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViterbiError::UnsupportedCode { n, k } => write!(f, "unsupported convolutional code N={} K={}", n, k),
            ViterbiError::InvalidCode => write!(f, "invalid convolutional code definition"),
        }
    }
}

impl std::error::Error for ViterbiError {}

/// Left shift and mask for finding the predecessor of `state`,
/// `val` being the oldest register bit that got shifted out.
#[inline(always)]
fn prev_state(state: usize, k: usize, val: usize) -> usize {
    let mask = (num_states(k) - 1) & !1;
    ((state << 1) & mask) | val
}

/// Expected encoder output for the transition from `prev_state(state, k, b)` into `state`,
/// as NRZ values (+1 for a "0" bit, -1 for a "1" bit)
fn transition_nrz(code: &ConvCode, state: usize, b: usize) -> Vec<Metric> {
    // Decoder states hold the most recent input in bit K-2, the encoder
    // register holds it in bit 0. Reverse the K-1 state bits.
    let k = code.k;
    let mut reg = (b as u32) << (k - 1);
    for i in 0..k - 1 {
        if (state >> (k - 2 - i)) & 1 == 1 {
            reg |= 1 << i;
        }
    }
    let out = code.output(reg);
    (0..code.n).map(|i| if (out >> i) & 1 == 1 { -1 } else { 1 }).collect()
}

/// Branch and path metric unit for one trellis step.
pub trait MetricKernel {
    /// Consume the `N` soft symbols in `seq`, compute the new accumulated metrics
    /// for every state into `new_sums` and store, per state, which of its two
    /// predecessors survived (the shifted-out register bit) in `paths`.
    fn step(&self, seq: &[SoftBit], sums: &[Metric], new_sums: &mut [Metric], paths: &mut [u8]);
}

/// Add-compare-select butterfly kernel.
///
/// Valid for codes where every generator taps both D^0 and D^(K-1). The two
/// transitions into a state then have inverted outputs, as do the transitions
/// from a state pair into the two states differing in the newest bit. Only one
/// branch metric per state pair needs to be computed.
pub struct ButterflyKernel {
    num_states: usize,
    n: usize,
    /// NRZ outputs of the transition 2i -> i, for i < num_states / 2
    outputs: Vec<Metric>,
}

impl ButterflyKernel {
    pub fn new(code: &ConvCode) -> Self {
        let num_states = num_states(code.k);
        let mut outputs = Vec::with_capacity(num_states / 2 * code.n);
        for i in 0..num_states / 2 {
            outputs.extend(transition_nrz(code, i, 0));
        }
        Self { num_states, n: code.n, outputs }
    }

    /// True if all generators tap both ends of the register
    pub fn supports(code: &ConvCode) -> bool {
        let top = 1u32 << (code.k - 1);
        code.generators.iter().all(|g| g & 1 == 1 && g & top != 0)
    }
}

impl MetricKernel for ButterflyKernel {
    fn step(&self, seq: &[SoftBit], sums: &[Metric], new_sums: &mut [Metric], paths: &mut [u8]) {
        let half = self.num_states / 2;
        for i in 0..half {
            let expected = &self.outputs[i * self.n..(i + 1) * self.n];
            let metric: Metric = seq.iter().zip(expected).map(|(&s, &e)| s as Metric * e).sum();

            let state0 = sums[2 * i];
            let state1 = sums[2 * i + 1];

            let sum0 = state0.saturating_add(metric);
            let sum1 = state1.saturating_sub(metric);
            let sum2 = state0.saturating_sub(metric);
            let sum3 = state1.saturating_add(metric);

            if sum0 >= sum1 {
                new_sums[i] = sum0;
                paths[i] = 0;
            } else {
                new_sums[i] = sum1;
                paths[i] = 1;
            }

            if sum2 >= sum3 {
                new_sums[i + half] = sum2;
                paths[i + half] = 0;
            } else {
                new_sums[i + half] = sum3;
                paths[i + half] = 1;
            }
        }
    }
}

/// Full add-compare-select over both branches of every state, for any non-recursive code
pub struct GenericKernel {
    num_states: usize,
    n: usize,
    k: usize,
    /// NRZ outputs indexed by (state * 2 + shifted-out bit)
    outputs: Vec<Metric>,
}

impl GenericKernel {
    pub fn new(code: &ConvCode) -> Self {
        let num_states = num_states(code.k);
        let mut outputs = Vec::with_capacity(num_states * 2 * code.n);
        for s in 0..num_states {
            outputs.extend(transition_nrz(code, s, 0));
            outputs.extend(transition_nrz(code, s, 1));
        }
        Self { num_states, n: code.n, k: code.k, outputs }
    }
}

impl MetricKernel for GenericKernel {
    fn step(&self, seq: &[SoftBit], sums: &[Metric], new_sums: &mut [Metric], paths: &mut [u8]) {
        for s in 0..self.num_states {
            let mut best = Metric::MIN;
            let mut best_b = 0;
            for b in 0..2 {
                let idx = (s * 2 + b) * self.n;
                let expected = &self.outputs[idx..idx + self.n];
                let metric: Metric = seq.iter().zip(expected).map(|(&x, &e)| x as Metric * e).sum();
                let cand = sums[prev_state(s, self.k, b)].saturating_add(metric);
                if b == 0 || cand > best {
                    best = cand;
                    best_b = b;
                }
            }
            new_sums[s] = best;
            paths[s] = best_b as u8;
        }
    }
}

/// Soft-decision Viterbi decoder for a non-recursive convolutional code of rate 1/N.
pub struct ViterbiDecoder {
    code: ConvCode,
    num_states: usize,
    /// Horizontal length of the trellis
    steps: usize,
    /// Normalization interval
    intrvl: usize,
    kernel: Box<dyn MetricKernel>,
}

impl ViterbiDecoder {
    pub fn new(code: ConvCode) -> Result<Self, ViterbiError> {
        let (n, k) = (code.n, code.k);
        if code.len == 0 || code.generators.len() != n {
            return Err(ViterbiError::InvalidCode);
        }
        if !(2..=MAX_K).contains(&k) || !(1..=MAX_N).contains(&n) {
            return Err(ViterbiError::UnsupportedCode { n, k });
        }

        let kernel: Box<dyn MetricKernel> = match (k, n) {
            (5 | 7, 2..=4) if ButterflyKernel::supports(&code) => Box::new(ButterflyKernel::new(&code)),
            _ => Box::new(GenericKernel::new(&code)),
        };

        // Subtract K to leave room for the initial metric of state zero
        let intrvl = (i16::MAX as usize / (n * i8::MAX as usize)).saturating_sub(k).max(1);

        Ok(Self {
            num_states: num_states(k),
            steps: code.num_steps(),
            intrvl,
            kernel,
            code,
        })
    }

    /// Decoder for the rate 1/4 signalling mother code, `len` data bits followed by 4 tail bits
    pub fn new_cch(len: usize) -> Result<Self, ViterbiError> {
        Self::new(ConvCode::cch(len))
    }

    /// Decoder for the rate 1/3 speech mother code
    pub fn new_speech(len: usize) -> Result<Self, ViterbiError> {
        Self::new(ConvCode::speech(len))
    }

    pub fn code(&self) -> &ConvCode {
        &self.code
    }

    /// Insert erasures at the punctured positions of the code
    fn depuncture(&self, input: &[SoftBit], punc: &[usize]) -> Vec<SoftBit> {
        let total = self.steps * self.code.n;
        let mut out = Vec::with_capacity(total);
        let mut punc_iter = punc.iter().peekable();
        let mut input_iter = input.iter();
        for i in 0..total {
            if punc_iter.peek() == Some(&&i) {
                punc_iter.next();
                out.push(SOFT_ERASED);
            } else {
                out.push(input_iter.next().copied().unwrap_or(SOFT_ERASED));
            }
        }
        out
    }

    /// Decode `input` soft bits into `code.len` hard bits.
    /// A short input is extended with erasures, extra input is ignored.
    pub fn decode(&self, input: &[SoftBit]) -> Vec<u8> {
        let n = self.code.n;
        let total = self.steps * n;

        let seq: Vec<SoftBit> = match self.code.puncture {
            Some(punc) => self.depuncture(input, punc),
            None => {
                let mut seq = input[..input.len().min(total)].to_vec();
                seq.resize(total, SOFT_ERASED);
                seq
            }
        };

        let mut sums: Vec<Metric> = vec![0; self.num_states];
        if self.code.term != ConvTermination::TailBiting {
            // Encoder starts in state zero
            sums[0] = (i8::MAX as usize * n * self.code.k) as Metric;
        }
        let mut new_sums: Vec<Metric> = vec![0; self.num_states];
        let mut paths = vec![0u8; self.steps * self.num_states];

        let passes = if self.code.term == ConvTermination::TailBiting { 2 } else { 1 };
        for _ in 0..passes {
            for (i, symbols) in seq.chunks_exact(n).enumerate() {
                let path_row = &mut paths[i * self.num_states..(i + 1) * self.num_states];
                self.kernel.step(symbols, &sums, &mut new_sums, path_row);

                if i % self.intrvl == 0 {
                    if let Some(&min) = new_sums.iter().min() {
                        for s in new_sums.iter_mut() {
                            *s -= min;
                        }
                    }
                }
                core::mem::swap(&mut sums, &mut new_sums);
            }
        }

        let end_state = self.select_end_state(&sums, &paths);
        self.traceback(&paths, end_state)
    }

    /// Predecessor of `state` at trellis step `i`
    #[inline]
    fn survivor(&self, paths: &[u8], i: usize, state: usize) -> usize {
        let path = paths[i * self.num_states + state] as usize;
        prev_state(state, self.code.k, path)
    }

    fn best_state(&self, sums: &[Metric], candidates: impl Iterator<Item = usize>) -> Option<usize> {
        let mut best: Option<(usize, Metric)> = None;
        for s in candidates {
            if best.is_none_or(|(_, m)| sums[s] > m) {
                best = Some((s, sums[s]));
            }
        }
        best.map(|(s, _)| s)
    }

    fn select_end_state(&self, sums: &[Metric], paths: &[u8]) -> usize {
        match self.code.term {
            ConvTermination::Flush => 0,
            ConvTermination::Truncation => self.best_state(sums, 0..self.num_states).unwrap_or(0),
            ConvTermination::TailBiting => {
                // Prefer end states whose survivor path starts in the same state
                let consistent = (0..self.num_states).filter(|&s| {
                    let mut state = s;
                    for i in (0..self.steps).rev() {
                        state = self.survivor(paths, i, state);
                    }
                    state == s
                });
                self.best_state(sums, consistent)
                    .or_else(|| self.best_state(sums, 0..self.num_states))
                    .unwrap_or(0)
            }
        }
    }

    fn traceback(&self, paths: &[u8], end_state: usize) -> Vec<u8> {
        let len = self.code.len;
        let k = self.code.k;
        let mut state = end_state;

        // Skip the flush steps
        for i in (len..self.steps).rev() {
            state = self.survivor(paths, i, state);
        }

        let mut out = vec![0u8; len];
        for i in (0..len).rev() {
            out[i] = ((state >> (k - 2)) & 1) as u8;
            state = self.survivor(paths, i, state);
        }
        out
    }
}
