pub mod access_assign;
pub mod mac_d_blck;
pub mod mac_end_dl;
pub mod mac_frag_dl;
pub mod mac_resource;
pub mod mac_sync;
pub mod mac_sysinfo;
