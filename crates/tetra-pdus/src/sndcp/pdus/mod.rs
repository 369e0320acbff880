pub mod sn_data_header;
