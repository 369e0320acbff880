pub mod llc_pdu_type;
