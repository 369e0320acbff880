pub mod defrag;
pub mod fillbits;
pub mod ms_defrag;
