use tetra_core::{BitBuffer, BurstType, PhyBlockNum, PhyBlockType, TdmaTime, TrainingSequence};


/// A sub-block extracted from a synchronized downlink burst, still scrambled (type-5 bits)
#[derive(Debug)]
pub struct TpUnitdataInd {
    pub train_type: TrainingSequence,
    pub burst_type: BurstType,
    pub block_type: PhyBlockType,
    /// Undefined for BBK. For all others: [ Block1 | Block2 | Both ]
    pub block_num: PhyBlockNum, 
    pub block: BitBuffer,
    /// Cell time of the timeslot this block was received in
    pub time: TdmaTime,
}
