/// Clause 21.4.7.2 ACCESS-ASSIGN, uplink usage marker
/// Bits: 6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAssignUlUsage {
    Unallocated,
    /// Traffic channel, carries the usage marker
    Traffic(u8),
}

impl AccessAssignUlUsage {
    pub fn from_usage_marker(field: u8) -> Self {
        match field {
            0 => AccessAssignUlUsage::Unallocated,
            _ => AccessAssignUlUsage::Traffic(field),
        }
    }

    pub fn to_usage_marker(&self) -> u8 {
        match self {
            AccessAssignUlUsage::Unallocated => 0,
            AccessAssignUlUsage::Traffic(um) => *um,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AccessAssignUlUsage::Unallocated => "Unallocated",
            AccessAssignUlUsage::Traffic(_) => "Traffic",
        }
    }
}

impl core::fmt::Display for AccessAssignUlUsage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccessAssignUlUsage::Unallocated => write!(f, "Unallocated"),
            AccessAssignUlUsage::Traffic(um) => write!(f, "Traffic({})", um),
        }
    }
}
