/// Clause 21.4.3.1 Table 21.56: MAC-RESOURCE length indication, decoded for π/4-DQPSK
/// Bits: 6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacResourceLength {
    /// PDU length in octets, 1..=58
    Octets(u8),
    /// PDU fills the slot and the second half slot is stolen as well
    SecondHalfSlotStolen,
    /// PDU fills the slot and starts a fragmented TM-SDU
    StartOfFragmentation,
}

impl MacResourceLength {
    /// Decodes the raw length indication. 0, 0x3B, 0x3C and 0x3D are reserved.
    pub fn from_length_ind(length_ind: u8) -> Option<Self> {
        match length_ind {
            0x01..=0x3A => Some(MacResourceLength::Octets(length_ind)),
            0x3E => Some(MacResourceLength::SecondHalfSlotStolen),
            0x3F => Some(MacResourceLength::StartOfFragmentation),
            _ => None,
        }
    }

    pub fn to_length_ind(self) -> u8 {
        match self {
            MacResourceLength::Octets(n) => n,
            MacResourceLength::SecondHalfSlotStolen => 0x3E,
            MacResourceLength::StartOfFragmentation => 0x3F,
        }
    }

    /// Number of PDU bits including fill bits, None when the PDU fills the slot
    pub fn pdu_bits(self) -> Option<usize> {
        match self {
            MacResourceLength::Octets(n) => Some(n as usize * 8),
            _ => None,
        }
    }
}

impl core::fmt::Display for MacResourceLength {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MacResourceLength::Octets(n) => write!(f, "{}", n),
            MacResourceLength::SecondHalfSlotStolen => write!(f, "2nd half slot stolen"),
            MacResourceLength::StartOfFragmentation => write!(f, "start of fragmentation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_codes() {
        assert_eq!(MacResourceLength::from_length_ind(0), None);
        assert_eq!(MacResourceLength::from_length_ind(0x3B), None);
        assert_eq!(MacResourceLength::from_length_ind(0x3C), None);
        assert_eq!(MacResourceLength::from_length_ind(0x3D), None);
        assert_eq!(MacResourceLength::from_length_ind(0x12).and_then(|l| l.pdu_bits()), Some(144));
        assert_eq!(MacResourceLength::from_length_ind(0x3A).and_then(|l| l.pdu_bits()), Some(464));
        assert_eq!(MacResourceLength::from_length_ind(0x3E), Some(MacResourceLength::SecondHalfSlotStolen));
        assert_eq!(MacResourceLength::from_length_ind(0x3F).and_then(|l| l.pdu_bits()), None);
    }
}
