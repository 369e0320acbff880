//! Configuration management for the TETRA downlink receiver
//!
//! - TOML configuration file parsing
//! - Receiver configuration structures

pub mod receiver_config;
pub mod toml_config;

pub use receiver_config::*;
pub use toml_config::*;
