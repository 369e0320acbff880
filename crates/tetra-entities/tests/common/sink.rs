use std::sync::{Arc, Mutex};

use tetra_entities::crypto::{CipherError, CipherSuite, KsgType};
use tetra_entities::voice::voice_bridge::{CODEC_FRAME_LEN, PCM_FRAME_SAMPLES};
use tetra_entities::voice::{AcelpDecoder, PcmSink, VoiceBridge};

/// Codec stand-in that repeats the first speech bit of each half frame
pub struct FirstBitCodec;

impl AcelpDecoder for FirstBitCodec {
    fn decode(&mut self, serial: &[i16; CODEC_FRAME_LEN], pcm: &mut [i16; PCM_FRAME_SAMPLES]) {
        pcm.fill(serial[1]);
    }
}

/// Collects all PCM samples for later inspection
#[derive(Clone, Default)]
pub struct PcmCapture {
    samples: Arc<Mutex<Vec<i16>>>,
}

impl PcmCapture {
    pub fn bridge(&self) -> VoiceBridge {
        VoiceBridge::new(Box::new(FirstBitCodec), Box::new(self.clone()))
    }

    pub fn take(&self) -> Vec<i16> {
        std::mem::take(&mut *self.samples.lock().unwrap())
    }
}

impl PcmSink for PcmCapture {
    fn put_voice_data(&mut self, samples: &[i16]) {
        self.samples.lock().unwrap().extend_from_slice(samples);
    }
}

/// Cipher stand-in. The ECK is the key itself, keystream bytes are the low IV byte
/// XORed with the byte index and the first ECK byte.
pub struct StubCiphers;

impl CipherSuite for StubCiphers {
    fn tb5(&self, _cn: [u8; 2], _la: [u8; 2], _cc: u8, ck: &[u8; 10]) -> Result<[u8; 10], CipherError> {
        Ok(*ck)
    }

    fn keystream(&self, _ksg: KsgType, iv: u32, eck: &[u8; 10], out: &mut [u8]) -> Result<(), CipherError> {
        for (i, b) in out.iter_mut().enumerate() {
            *b = (iv as u8) ^ (i as u8) ^ eck[0];
        }
        Ok(())
    }
}
