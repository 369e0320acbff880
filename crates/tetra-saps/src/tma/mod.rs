use tetra_core::{BitBuffer, TdmaTime, TetraAddress};


/// Clause 20.4.1.1.4
/// TMA-UNITDATA indication: this primitive shall be used by the MAC to deliver 
/// a received TM-SDU. 
/// The pdu window covers the MAC PDU (or the reassembled fragments) and the
/// L2 layer marker points at the first bit of the TM-SDU.
#[derive(Debug)]
pub struct TmaUnitdataInd {
    pub pdu: BitBuffer,
    pub main_address: TetraAddress,
    pub scrambling_code: u32,
    /// Timeslot the SDU was received on, 1-4
    pub endpoint_id: u8,
    /// Encryption mode from the MAC header, 0 if clear
    pub air_interface_encryption: u8,
    /// Number of MAC PDUs this SDU was reassembled from, 1 if unfragmented
    pub num_frags: u32,
    pub time: TdmaTime,
}
