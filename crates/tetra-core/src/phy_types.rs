//! PHY-layer types that are used across multiple layers
//!
//! These types originate from the burst layer but are referenced by LMAC, UMAC,
//! and SAP primitives, so they live in tetra-core to avoid circular dependencies.

use core::fmt;

/// Identifies which block(s) within a timeslot
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PhyBlockNum {
    /// Both half-slots combined (full slot)
    Both,
    /// First half-slot only
    Block1,
    /// Second half-slot only
    Block2,
    /// Block number not determined
    Undefined,
}

/// Physical block types delivered from the burst layer to the lower MAC
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PhyBlockType {
    /// Broadcast block, 30 bits, carries AACH
    BBK,
    /// Synchronization block 1, 120 bits, carries BSCH
    SB1,
    /// Synchronization block 2, 216 bits
    SB2,
    /// Normal downlink block (half slot), 216 bits
    NDB,
    /// Full slot signalling channel, both NDB halves, 432 bits
    SchF,
}

impl fmt::Display for PhyBlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhyBlockType::BBK => "BBK",
            PhyBlockType::SB1 => "SB1",
            PhyBlockType::SB2 => "SB2",
            PhyBlockType::NDB => "NDB",
            PhyBlockType::SchF => "SCH/F",
        };
        write!(f, "{}", s)
    }
}

/// Downlink burst types (Clause 9.4.4.1)
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BurstType {
    /// Normal Downlink Burst (continuous and discontinuous)
    NDB,
    /// Synchronization Downlink Burst (continuous and discontinuous)
    SDB,
}

/// Training sequences
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TrainingSequence {
    /// 22 n bits
    NormalTrainSeq1 = 1,
    /// 22 p bits
    NormalTrainSeq2 = 2,
    /// 22 q bits
    NormalTrainSeq3 = 3,
    /// 30 x bits
    ExtendedTrainSeq = 4,
    /// 38 y bits
    SyncTrainSeq = 5,
    /// Not found
    #[default]
    NotFound = 0,
}
