//! Service primitives exchanged between the layers of the receive chain
//!
//! - TP-SAP: burst layer to lower MAC
//! - TMV-SAP: lower MAC to upper MAC
//! - TMA-SAP: upper MAC to LLC
//! - TMD-SAP: lower MAC to the voice bridge
//! - TLA-SAP: LLC to MLE

pub mod tla;
pub mod tma;
pub mod tmd;
pub mod tmv;
pub mod tp;
