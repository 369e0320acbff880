pub mod mle_ms;
