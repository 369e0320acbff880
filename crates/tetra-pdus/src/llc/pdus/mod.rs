pub mod llc_pdu;
