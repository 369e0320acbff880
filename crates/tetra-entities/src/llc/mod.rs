pub mod llc_ms;
