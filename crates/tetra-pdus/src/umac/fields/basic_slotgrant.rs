use core::fmt;

use tetra_core::{BitBuffer, pdu_parse_error::PduParseErr};

/// Table 21.90: granted capacity per 4-bit capacity allocation value.
/// 0 grants the first subslot, 0xFF marks the second subslot.
const NR_SLOTS_TABLE: [u8; 16] = [0, 1, 2, 3, 4, 5, 6, 8, 10, 13, 17, 24, 34, 51, 68, 0xFF];

/// 21.5.6 Basic slot granting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicSlotgrant {
    // 4
    pub capacity_allocation: u8,
    // 4
    pub granting_delay: u8,
}

impl BasicSlotgrant {
    pub const LEN: usize = 8;

    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let capacity_allocation = buf.read_field(4, "capacity_allocation")? as u8;
        let granting_delay = buf.read_field(4, "granting_delay")? as u8;
        Ok(BasicSlotgrant { capacity_allocation, granting_delay })
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(self.capacity_allocation as u64, 4);
        buf.write_bits(self.granting_delay as u64, 4);
    }

    /// Number of granted slots
    pub fn nr_slots(&self) -> u8 {
        NR_SLOTS_TABLE[(self.capacity_allocation & 0xF) as usize]
    }
}

impl fmt::Display for BasicSlotgrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.nr_slots(), self.granting_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nr_slots() {
        let mut buf = BitBuffer::from_bitstr("10100011");
        let sg = BasicSlotgrant::from_bitbuf(&mut buf).unwrap();
        assert_eq!(sg.capacity_allocation, 10);
        assert_eq!(sg.nr_slots(), 17);
        assert_eq!(sg.granting_delay, 3);
        assert_eq!(sg.to_string(), "17/3");

        let sg = BasicSlotgrant { capacity_allocation: 15, granting_delay: 0 };
        assert_eq!(sg.nr_slots(), 0xFF);
    }
}
