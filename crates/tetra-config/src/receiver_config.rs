use serde::Deserialize;

/// How demodulated bits are stored in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BitFormat {
    /// One bit per byte, values 0 and 1, as written by common TETRA demodulators
    Unpacked,
    /// Eight bits per byte, most significant bit first
    Packed,
    /// Characters '0' and '1', anything else is skipped
    Ascii,
}

/// Where the demodulated bit stream comes from
#[derive(Debug, Clone)]
pub struct CfgInput {
    /// Input file, None reads from stdin
    pub path: Option<String>,
    pub format: BitFormat,
    /// Bytes read per chunk
    pub chunk_size: usize,
}

impl Default for CfgInput {
    fn default() -> Self {
        Self {
            path: None,
            format: BitFormat::Unpacked,
            chunk_size: default_chunk_size(),
        }
    }
}

#[inline]
fn default_chunk_size() -> usize {
    4096
}

#[derive(Debug, Clone, Default)]
pub struct CfgCrypto {
    /// Key file with network and key definitions
    pub keyfile: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CfgVoice {
    /// Speech frames are appended here as 276 little endian i16 values each,
    /// the input format of the ETSI ACELP decoder
    pub codec_out: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    pub debug_log: Option<String>,
    /// Also log per-PDU decoding details
    pub verbose: bool,
    /// Log a status line every this many received timeslots, 0 disables it
    pub status_interval: u32,

    pub input: CfgInput,
    pub crypto: CfgCrypto,
    pub voice: CfgVoice,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            debug_log: None,
            verbose: false,
            status_interval: default_status_interval(),
            input: CfgInput::default(),
            crypto: CfgCrypto::default(),
            voice: CfgVoice::default(),
        }
    }
}

/// Once per multiframe
#[inline]
fn default_status_interval() -> u32 {
    4 * 18
}

impl ReceiverConfig {
    /// Validate that all configuration fields hold usable values.
    pub fn validate(&self) -> Result<(), &str> {
        if self.input.chunk_size == 0 {
            return Err("input chunk_size must be nonzero");
        }
        if self.input.path.as_deref().is_some_and(str::is_empty) {
            return Err("input path must not be empty, leave it out to read from stdin");
        }
        if self.crypto.keyfile.as_deref().is_some_and(str::is_empty) {
            return Err("crypto keyfile must not be empty");
        }
        if self.voice.codec_out.is_some() && self.voice.codec_out == self.input.path {
            return Err("voice codec_out must differ from the input path");
        }
        Ok(())
    }
}
