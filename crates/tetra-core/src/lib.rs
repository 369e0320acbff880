//! Core utilities for the TETRA downlink receiver
//!
//! This crate provides fundamental types and utilities used across the receive chain:
//! - BitBuffer for bit-level PDU manipulation
//! - TdmaTime for TDMA frame timing
//! - Address types (SSI, event label, usage marker)
//! - PHY types (PhyBlockNum, PhyBlockType, TrainingSequence)
//! - Carrier frequency helpers
//! - Common macros and debug utilities

pub mod address;
pub mod bitbuffer;
pub mod debug;
pub mod direction;
pub mod freqs;
pub mod pdu_parse_error;
pub mod phy_types;
pub mod tdma_time;

// Re-export commonly used items
pub use address::*;
pub use bitbuffer::{BitBuffer, Layer};
pub use direction::Direction;
pub use freqs::FreqInfo;
pub use pdu_parse_error::PduParseErr;
pub use phy_types::*;
pub use tdma_time::TdmaTime;

/// Receiver version string, crate version followed by the git revision it was built from
pub const STACK_VERSION: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"),
    "-",
    git_version::git_version!(fallback = "unknown")
);
