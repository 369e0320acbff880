use core::fmt;

use tetra_pdus::mle::fields::bs_service_details::BsServiceDetails;

use crate::phy::burst_split::SlotContent;

/// Cell and reception state for presentation. Written by the receive chain, never read back by it.
#[derive(Debug, Clone, Default)]
pub struct ReceiverStatus {
    /// From the most recent SYNC PDU, CRC checked or not
    pub mcc: u16,
    pub mnc: u16,
    pub cc: u8,

    pub curr_hyperframe: u16,
    pub curr_multiframe: u8,
    pub curr_frame: u8,
    /// Content of the last burst seen on each timeslot, indexed by tn - 1
    pub timeslot_content: [SlotContent; 4],
    /// Set when a CRC protected block failed its check, cleared by the next good one
    pub last_crc_fail: bool,

    pub dl_freq: u32,
    pub ul_freq: u32,
    pub la: u16,
    pub service_details: Option<BsServiceDetails>,

    /// Access codes of the last ACCESS-ASSIGN, as letters
    pub access1_code: Option<char>,
    pub access2_code: Option<char>,
    pub dl_usage: u8,
    pub ul_usage: u8,
}

impl ReceiverStatus {
    pub fn air_encryption(&self) -> bool {
        self.service_details.as_ref().is_some_and(|s| s.aie_service)
    }
}

impl fmt::Display for ReceiverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MCC {} MNC {} CC {} HN {} {:02}/{:02} DL {} Hz UL {} Hz LA {}",
            self.mcc, self.mnc, self.cc, self.curr_hyperframe, self.curr_multiframe, self.curr_frame,
            self.dl_freq, self.ul_freq, self.la)?;
        if let Some(s) = &self.service_details {
            write!(f, " services {}", s)?;
        }
        write!(f, " slots [")?;
        for (i, c) in self.timeslot_content.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", *c as u8)?;
        }
        write!(f, "]{}", if self.last_crc_fail { " CRC FAIL" } else { "" })
    }
}
