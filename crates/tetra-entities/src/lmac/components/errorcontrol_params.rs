use tetra_core::PhyBlockType;

/// Each physical block type is associated with a set of error control parameters.
#[derive(Debug)]
pub struct ErrorControlParams {
    pub name:           &'static str,
    pub type345_bits:   usize,
    pub type2_bits:     usize,
    pub type1_bits:     usize,
    /// Block interleaving step, 0 for blocks that are not interleaved
    pub interleave_a:   usize,
    pub have_crc16:     bool,
}

/// Synchronization block 1, carries the BSCH
pub const SB1_PARAMS: ErrorControlParams = ErrorControlParams {
    name:         "SB1",
    type345_bits: 120,
    type2_bits:   80,
    type1_bits:   60,
    interleave_a: 11,
    have_crc16:   true,
};

/// Synchronization block 2, carries BNCH or other half slot signalling
pub const SB2_PARAMS: ErrorControlParams = ErrorControlParams {
    name:         "SB2",
    type345_bits: 216,
    type2_bits:   144,
    type1_bits:   124,
    interleave_a: 101,
    have_crc16:   true,
};

/// Normal downlink block, one half slot
pub const NDB_PARAMS: ErrorControlParams = ErrorControlParams {
    name:         "NDB",
    type345_bits: 216,
    type2_bits:   144,
    type1_bits:   124,
    interleave_a: 101,
    have_crc16:   true,
};

/// Half slot uplink signalling, only seen when decoding a control uplink burst
pub const SCH_HU_PARAMS: ErrorControlParams = ErrorControlParams {
    name:         "SCH/HU",
    type345_bits: 168,
    type2_bits:   112,
    type1_bits:   92,
    interleave_a: 13,
    have_crc16:   true,
};

/// Full slot signalling
pub const SCH_F_PARAMS: ErrorControlParams = ErrorControlParams {
    name:         "SCH/F",
    type345_bits: 432,
    type2_bits:   288,
    type1_bits:   268,
    interleave_a: 103,
    have_crc16:   true,
};

/// Broadcast block, carries the AACH. RM(30,14) coded, not interleaved.
pub const BBK_PARAMS: ErrorControlParams = ErrorControlParams {
    name:         "BBK",
    type345_bits: 30,
    type2_bits:   30,
    type1_bits:   14,
    interleave_a: 0,
    have_crc16:   false,
};

/// Gets error control parameters for a given downlink block type.
pub fn get_params(block_type: PhyBlockType) -> &'static ErrorControlParams {
    match block_type {
        PhyBlockType::SB1 => &SB1_PARAMS,
        PhyBlockType::SB2 => &SB2_PARAMS,
        PhyBlockType::NDB => &NDB_PARAMS,
        PhyBlockType::SchF => &SCH_F_PARAMS,
        PhyBlockType::BBK => &BBK_PARAMS,
    }
}
