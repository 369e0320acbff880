pub mod convenc;
pub mod crc16;
pub mod interleaver;
pub mod rm3014;
pub mod scrambler;
pub mod viterbi;

pub mod errorcontrol;
pub mod errorcontrol_params;
pub mod tch_reorder;
