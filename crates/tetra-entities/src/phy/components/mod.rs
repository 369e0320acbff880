pub mod burst_builder;
pub mod burst_consts;
pub mod train_consts;
