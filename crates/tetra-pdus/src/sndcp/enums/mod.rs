pub mod sndcp_pdu_type;
