use core::fmt;

use tetra_core::{BitBuffer, pdu_parse_error::PduParseErr};


/// Clause 18.5.2.1 D-MLE-SYSINFO Table 18.26: BS service details information element.
/// Bit 11 (first on air) is registration, bit 0 (last) is advanced link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BsServiceDetails {
    pub registration: bool,
    pub deregistration: bool,
    pub priority_cell: bool,
    pub no_minimum_mode: bool,
    pub migration: bool,
    /// Normal mode, as opposed to system wide services temporarily unavailable
    pub system_wide_services: bool,
    pub voice_service: bool,
    pub circuit_mode_data_service: bool,
    // bit 3 reserved
    pub sndcp_service: bool,
    pub aie_service: bool,
    pub advanced_link: bool,
}

impl BsServiceDetails {
    pub const LEN: usize = 12;

    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let raw = buf.read_field(Self::LEN, "bs_service_details")? as u16;
        Ok(Self::from_raw(raw))
    }

    pub fn from_raw(raw: u16) -> Self {
        let bit = |i: u16| raw & (1 << i) != 0;
        BsServiceDetails {
            registration: bit(11),
            deregistration: bit(10),
            priority_cell: bit(9),
            no_minimum_mode: bit(8),
            migration: bit(7),
            system_wide_services: bit(6),
            voice_service: bit(5),
            circuit_mode_data_service: bit(4),
            sndcp_service: bit(2),
            aie_service: bit(1),
            advanced_link: bit(0),
        }
    }

    pub fn to_raw(&self) -> u16 {
        self.flags()
            .iter()
            .filter(|(_, _, set)| *set)
            .fold(0u16, |acc, (i, _, _)| acc | (1 << i))
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(self.to_raw() as u64, Self::LEN);
    }

    /// (bit index, display name, value) for every defined service bit
    pub fn flags(&self) -> [(u16, &'static str, bool); 11] {
        [
            (11, "Registration mandatory", self.registration),
            (10, "De-registration mandatory", self.deregistration),
            (9, "Priority cell", self.priority_cell),
            (8, "Cell never uses minimum mode", self.no_minimum_mode),
            (7, "Migration supported", self.migration),
            (6, "Normal mode", self.system_wide_services),
            (5, "Voice service", self.voice_service),
            (4, "Circuit data", self.circuit_mode_data_service),
            (2, "SNDCP data", self.sndcp_service),
            (1, "Air encryption", self.aie_service),
            (0, "Advanced link", self.advanced_link),
        ]
    }
}

impl fmt::Display for BsServiceDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:03x} [", self.to_raw())?;
        let mut first = true;
        for (_, name, set) in self.flags() {
            if set {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_bits() {
        // registration, voice, air encryption
        let mut buf = BitBuffer::from_bitstr("100000100010");
        let sd = BsServiceDetails::from_bitbuf(&mut buf).unwrap();
        assert!(sd.registration);
        assert!(sd.voice_service);
        assert!(sd.aie_service);
        assert!(!sd.advanced_link);
        assert!(!sd.sndcp_service);
        assert_eq!(sd.to_raw(), 0x822);
        assert_eq!(sd.to_string(), "0x822 [Registration mandatory, Voice service, Air encryption]");
    }

    #[test]
    fn test_reserved_bit_ignored() {
        let sd = BsServiceDetails::from_raw(0x008);
        assert_eq!(sd, BsServiceDetails::default());
        assert_eq!(sd.to_raw(), 0);
    }
}
