//! Bridge from decoded traffic channel frames to an external ACELP speech codec

pub mod voice_bridge;

pub use voice_bridge::{AcelpDecoder, PcmSink, VoiceBridge};
