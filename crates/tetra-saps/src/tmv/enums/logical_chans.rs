use core::fmt;

/// Logical channels that may be encountered on the downlink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalChannel {
    /// Half slot signalling whose exact channel is not determined
    Unknown,

    /// Access Assignment CHannel
    Aach,
    
    /// Signalling Channel (half slot, downlink)
    SchHd, 
    /// Signalling Channel (full slot)
    SchF,  
    /// STealing Channel (half slot)
    Stch,   

    /// Traffic Channel (Voice)
    TchS,    
    
    /// Broadcast Synchronization Channel 
    Bsch,   
    /// Broadcast Network Channel
    Bnch,   
}


impl LogicalChannel {
    pub fn is_traffic(self) -> bool {
        self == LogicalChannel::TchS
    }

    /// Channels carrying regular MAC PDUs that are parsed by the upper MAC
    pub fn carries_mac_pdus(self) -> bool {
        matches!(self,
            LogicalChannel::Unknown |
            LogicalChannel::SchHd |
            LogicalChannel::SchF |
            LogicalChannel::Stch |
            LogicalChannel::Bnch
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            LogicalChannel::Unknown => "UNKNOWN",
            LogicalChannel::Aach => "AACH",
            LogicalChannel::SchHd => "SCH/HD",
            LogicalChannel::SchF => "SCH/F",
            LogicalChannel::Stch => "STCH",
            LogicalChannel::TchS => "TCH/S",
            LogicalChannel::Bsch => "BSCH",
            LogicalChannel::Bnch => "BNCH",
        }
    }
}

impl fmt::Display for LogicalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
