use core::fmt;

use tetra_core::{BitBuffer, pdu_parse_error::PduParseErr};

use crate::umac::enums::{access_assign_dl_usage::AccessAssignDlUsage, access_assign_ul_usage::AccessAssignUlUsage};


/// Access field, 6 bits: access code 2, base frame length 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessField {
    pub access_code: u8,
    pub base_frame_len: u8,
}

impl AccessField {
    pub fn from_raw(field: u8) -> Self {
        AccessField {
            access_code: (field >> 4) & 0x3,
            base_frame_len: field & 0xF,
        }
    }

    pub fn to_raw(&self) -> u8 {
        (self.access_code & 0x3) << 4 | (self.base_frame_len & 0xF)
    }

    /// Access code as displayed, 'A' through 'D'
    pub fn code_letter(&self) -> char {
        (b'A' + self.access_code) as char
    }
}

impl fmt::Display for AccessField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.code_letter(), self.base_frame_len)
    }
}

/// Clause 21.4.7.2 ACCESS-ASSIGN, carried in the AACH of every downlink slot.
/// Which of the two 6-bit fields carry access fields or usage markers depends on the
/// header and on whether the slot is in frame 18.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessAssign {
    /// 2 bits
    pub header: u8,
    pub frame18: bool,
    /// Access rights on UL subslot 1
    pub access1: Option<AccessField>,
    /// Access rights on UL subslot 2, or on both subslots when access1 is absent
    pub access2: Option<AccessField>,
    pub dl_usage: Option<AccessAssignDlUsage>,
    pub ul_usage: Option<AccessAssignUlUsage>,
}

impl AccessAssign {
    pub const LEN: usize = 14;

    pub fn from_bitbuf(buf: &mut BitBuffer, frame18: bool) -> Result<Self, PduParseErr> {
        let header = buf.read_field(2, "header")? as u8;
        let field1 = buf.read_field(6, "field1")? as u8;
        let field2 = buf.read_field(6, "field2")? as u8;

        let mut s = AccessAssign { header, frame18, ..Default::default() };

        if frame18 {
            match header {
                0..=2 => {
                    s.access1 = Some(AccessField::from_raw(field1));
                    s.access2 = Some(AccessField::from_raw(field2));
                }
                _ => {
                    s.access2 = Some(AccessField::from_raw(field2));
                }
            }
        } else {
            match header {
                0 => {
                    s.access1 = Some(AccessField::from_raw(field1));
                    s.access2 = Some(AccessField::from_raw(field2));
                }
                1 | 2 => {
                    s.dl_usage = Some(AccessAssignDlUsage::from_usage_marker(field1));
                    s.access2 = Some(AccessField::from_raw(field2));
                }
                _ => {
                    s.dl_usage = Some(AccessAssignDlUsage::from_usage_marker(field1));
                    s.ul_usage = Some(AccessAssignUlUsage::from_usage_marker(field2));
                }
            }
        }

        Ok(s)
    }

    /// True when the downlink of this slot carries traffic. Absent DL usage counts as control.
    pub fn is_traffic(&self) -> bool {
        self.dl_usage.is_some_and(|u| u.is_traffic())
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        let field1 = match (self.access1, self.dl_usage) {
            (Some(af), _) => af.to_raw(),
            (None, Some(um)) => um.to_usage_marker(),
            (None, None) => 0,
        };
        let field2 = match (self.access2, self.ul_usage) {
            (Some(af), _) => af.to_raw(),
            (None, Some(um)) => um.to_usage_marker(),
            (None, None) => 0,
        };
        buf.write_bits(self.header as u64, 2);
        buf.write_bits(field1 as u64, 6);
        buf.write_bits(field2 as u64, 6);
    }
}

impl fmt::Display for AccessAssign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ACCESS-ASSIGN")?;
        if let Some(af) = &self.access1 {
            write!(f, " ACCESS1: {}", af)?;
        }
        if let Some(af) = &self.access2 {
            write!(f, " ACCESS2: {}", af)?;
        }
        if let Some(um) = &self.dl_usage {
            write!(f, " DL_USAGE: {}", um)?;
        }
        if let Some(um) = &self.ul_usage {
            write!(f, " UL_USAGE: {}", um)?;
        }
        Ok(())
    }
}
