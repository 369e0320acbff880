//! Receive chain of the TETRA downlink decoder, from demodulated bits up to identified
//! TL-SDUs and speech frames. `Receiver` ties the layers together.

pub mod crypto;
pub mod llc;
pub mod lmac;
pub mod mle;
pub mod phy;
pub mod receiver;
pub mod status;
pub mod umac;
pub mod voice;

pub use receiver::{Receiver, RxEvent};
pub use status::ReceiverStatus;
