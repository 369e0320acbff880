pub mod enums;

use tetra_core::{BitBuffer, PhyBlockNum, PhyBlockType, TdmaTime};

use crate::tmv::enums::logical_chans::LogicalChannel;


/// The TMV-UNITDATA indication primitive shall be used by the lower MAC to deliver a received MAC block;
#[derive(Debug)]
pub struct TmvUnitdataInd {
    /// Type-1 bits, the CRC already checked and removed
    pub pdu: BitBuffer,
    
    /// Block number within the burst.
    /// Keystream offsets for encrypted half slots depend on it.
    pub block_num: PhyBlockNum,
    pub block_type: PhyBlockType,
    
    pub logical_channel: LogicalChannel,

    /// If no CRC is present on this message type (for example, for AACH), crc_pass is set to True
    pub crc_pass: bool,
    pub scrambling_code: u32,

    /// Cell time at which the block was received
    pub time: TdmaTime,
}
