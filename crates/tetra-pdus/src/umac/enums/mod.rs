pub mod access_assign_dl_usage;
pub mod access_assign_ul_usage;
pub mod broadcast_type;
pub mod chan_alloc_type;
pub mod mac_pdu_type;
pub mod mac_resource_length;
pub mod sysinfo_opt_field_flag;
pub mod ul_dl_assignment;
