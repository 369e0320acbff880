#![allow(dead_code)]

mod cell_sim;
mod sink;

pub use cell_sim::*;
pub use sink::*;
