use tetra_core::TdmaTime;

/// Received speech frame for the voice codec.
/// 276 values: [bfi, 137 class-ordered bits, bfi, 137 class-ordered bits]
#[derive(Debug)]
pub struct TmdCircuitDataInd {
    pub ts: u8,
    pub time: TdmaTime,
    pub data: Vec<i16>,
}
