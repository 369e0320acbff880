pub mod basic_slotgrant;
pub mod channel_allocation;
pub mod sysinfo_opt_field;
