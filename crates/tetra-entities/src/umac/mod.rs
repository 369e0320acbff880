pub mod subcomp;
pub mod umac_ms;
