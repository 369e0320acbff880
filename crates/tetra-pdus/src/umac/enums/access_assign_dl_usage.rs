/// Clause 21.4.7.2 ACCESS-ASSIGN, downlink usage marker
/// Bits: 6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAssignDlUsage {
    Unallocated,
    AssignedControl,
    CommonControl,
    Reserved,
    /// Traffic channel, carries the usage marker (4..63)
    Traffic(u8),
}

impl AccessAssignDlUsage {
    pub fn from_usage_marker(field: u8) -> Self {
        match field {
            0 => AccessAssignDlUsage::Unallocated,
            1 => AccessAssignDlUsage::AssignedControl,
            2 => AccessAssignDlUsage::CommonControl,
            3 => AccessAssignDlUsage::Reserved,
            _ => AccessAssignDlUsage::Traffic(field),
        }
    }

    pub fn to_usage_marker(&self) -> u8 {
        match self {
            AccessAssignDlUsage::Unallocated     => 0,
            AccessAssignDlUsage::AssignedControl => 1,
            AccessAssignDlUsage::CommonControl   => 2,
            AccessAssignDlUsage::Reserved        => 3,
            AccessAssignDlUsage::Traffic(um)     => *um,
        }
    }

    pub fn is_traffic(&self) -> bool {
        matches!(self, AccessAssignDlUsage::Traffic(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            AccessAssignDlUsage::Unallocated => "Unallocated",
            AccessAssignDlUsage::AssignedControl => "Assigned control",
            AccessAssignDlUsage::CommonControl => "Common control",
            AccessAssignDlUsage::Reserved => "Reserved",
            AccessAssignDlUsage::Traffic(_) => "Traffic",
        }
    }
}

impl core::fmt::Display for AccessAssignDlUsage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccessAssignDlUsage::Traffic(um) => write!(f, "Traffic({})", um),
            other => write!(f, "{}", other.name()),
        }
    }
}
