//! Burst layer: timeslot synchronization on the demodulated bit stream and
//! demultiplexing of downlink bursts into blocks

pub mod burst_split;
pub mod burst_sync;
pub mod components;
