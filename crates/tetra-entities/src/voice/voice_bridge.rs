use tetra_saps::tmd::TmdCircuitDataInd;

use crate::lmac::lmac_ms::SPEECH_FRAME_LEN;

/// One codec input frame: bad frame indicator followed by 137 class-ordered bits
pub const CODEC_FRAME_LEN: usize = SPEECH_FRAME_LEN / 2;
/// PCM samples produced per codec frame, 30 ms at 8 kHz
pub const PCM_FRAME_SAMPLES: usize = 240;

/// TETRA ACELP speech decoder, supplied by the embedding application
pub trait AcelpDecoder: Send {
    /// Decodes one codec frame into post-processed PCM samples
    fn decode(&mut self, serial: &[i16; CODEC_FRAME_LEN], pcm: &mut [i16; PCM_FRAME_SAMPLES]);
}

/// Receives the decoded audio of the active traffic timeslot
pub trait PcmSink: Send {
    fn put_voice_data(&mut self, samples: &[i16]);
}

impl<F: FnMut(&[i16]) + Send> PcmSink for F {
    fn put_voice_data(&mut self, samples: &[i16]) {
        self(samples)
    }
}

/// Runs the speech frames of a traffic timeslot through the codec. With several calls
/// on the carrier, only the first timeslot seen in each TDMA frame reaches the sink.
pub struct VoiceBridge {
    codec: Box<dyn AcelpDecoder>,
    sink: Box<dyn PcmSink>,
    /// Frame number of the last speech frame
    last_frame: Option<u32>,
    active_ts: u8,
    frames_decoded: u64,
}

impl VoiceBridge {
    pub fn new(codec: Box<dyn AcelpDecoder>, sink: Box<dyn PcmSink>) -> Self {
        Self {
            codec,
            sink,
            last_frame: None,
            active_ts: 0,
            frames_decoded: 0,
        }
    }

    pub fn active_ts(&self) -> u8 {
        self.active_ts
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Decodes both halves of the speech frame. Returns true if the audio went to the sink.
    pub fn rx_tmd_circuit_data_ind(&mut self, prim: &TmdCircuitDataInd) -> bool {
        if prim.data.len() != SPEECH_FRAME_LEN {
            tracing::warn!("rx_tmd_circuit_data_ind: speech frame of {} values, expected {}", prim.data.len(), SPEECH_FRAME_LEN);
            return false;
        }

        let mut pcm = [0i16; 2 * PCM_FRAME_SAMPLES];
        for (half, out) in prim.data.chunks_exact(CODEC_FRAME_LEN).zip(pcm.chunks_exact_mut(PCM_FRAME_SAMPLES)) {
            let mut serial = [0i16; CODEC_FRAME_LEN];
            serial.copy_from_slice(half);
            let mut samples = [0i16; PCM_FRAME_SAMPLES];
            self.codec.decode(&serial, &mut samples);
            out.copy_from_slice(&samples);
        }
        self.frames_decoded += 1;

        let fnr = prim.time.to_frame_number();
        if self.last_frame != Some(fnr) {
            if self.active_ts != prim.ts {
                tracing::debug!("rx_tmd_circuit_data_ind: active timeslot {} -> {}", self.active_ts, prim.ts);
            }
            self.active_ts = prim.ts;
            self.last_frame = Some(fnr);
        }
        if self.active_ts != prim.ts {
            tracing::trace!("rx_tmd_circuit_data_ind: TN{} not active, audio dropped", prim.ts);
            return false;
        }

        tracing::trace!("rx_tmd_circuit_data_ind: TN{} bfi {}", prim.ts, prim.data[0]);
        self.sink.put_voice_data(&pcm);
        true
    }
}
