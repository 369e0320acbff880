//! Typed decoders for the TETRA downlink PDUs handled by the receiver
//!
//! - `umac`: ACCESS-ASSIGN, SYNC, SYSINFO, MAC-RESOURCE, MAC-FRAG, MAC-END, MAC-D-BLCK
//! - `llc`: basic and advanced link PDU headers
//! - `mle`: D-MLE-SYNC, D-MLE-SYSINFO, protocol discriminators and PDU type tables
//! - `mm`, `cmce`, `sndcp`: PDU type tables for logging the contents of TL-SDUs

pub mod cmce;
pub mod llc;
pub mod mle;
pub mod mm;
pub mod sndcp;
pub mod umac;
