use tetra_core::{BitBuffer, TdmaTime, TetraAddress};


/// Clause 20.3.5.1.4 
/// TL-DATA / TL-UNITDATA indication, basic link: delivers a received TL-SDU to the MLE.
/// The L3 layer marker of tl_sdu points at the first bit of the TL-SDU.
#[derive(Debug)]
pub struct TlaTlDataIndBl {
    pub main_address: TetraAddress,
    pub endpoint_id: u8,
    pub tl_sdu: BitBuffer,
    /// None if the LLC PDU carries no FCS
    pub fcs_pass: Option<bool>,
    /// True for acknowledged (BL-DATA / BL-ADATA) service
    pub acknowledged: bool,
    pub time: TdmaTime,
}
