use core::fmt;

/// Clause 21.4.3.1 Table 21.55 MAC-RESOURCE address types
/// Bits: 3
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum AddressType {
    #[default]
    NullPdu = 0,
    Ssi = 1,
    EventLabel = 2,
    /// Migrating MS, un-exchanged
    Ussi = 3,
    /// Management
    Smi = 4,
    SsiAndEventLabel = 5,
    SsiAndUsageMarker = 6,
    SmiAndEventLabel = 7,
}

impl TryFrom<u64> for AddressType {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(AddressType::NullPdu),
            1 => Ok(AddressType::Ssi),
            2 => Ok(AddressType::EventLabel),
            3 => Ok(AddressType::Ussi),
            4 => Ok(AddressType::Smi),
            5 => Ok(AddressType::SsiAndEventLabel),
            6 => Ok(AddressType::SsiAndUsageMarker),
            7 => Ok(AddressType::SmiAndEventLabel),
            _ => Err(()),
        }
    }
}

impl AddressType {
    pub fn into_raw(self) -> u64 {
        self as u64
    }

    /// Number of address bits following the 3-bit type field
    pub fn num_bits(self) -> usize {
        match self {
            AddressType::NullPdu => 0,
            AddressType::Ssi | AddressType::Ussi | AddressType::Smi => 24,
            AddressType::EventLabel => 10,
            AddressType::SsiAndEventLabel | AddressType::SmiAndEventLabel => 34,
            AddressType::SsiAndUsageMarker => 30,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AddressType::NullPdu => "Null PDU",
            AddressType::Ssi => "SSI",
            AddressType::EventLabel => "Event Label",
            AddressType::Ussi => "USSI (migrading MS un-exchanged)",
            AddressType::Smi => "SMI (management)",
            AddressType::SsiAndEventLabel => "SSI + Event Label",
            AddressType::SsiAndUsageMarker => "SSI + Usage Marker",
            AddressType::SmiAndEventLabel => "SMI + Event Label",
        }
    }
}

impl From<AddressType> for u64 {
    fn from(e: AddressType) -> Self { e.into_raw() }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Address carried in a MAC-RESOURCE header
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub struct TetraAddress {
    pub addr_type: AddressType,
    /// SSI, USSI or SMI, 24 bits. Zero when the type carries no SSI.
    pub ssi: u32,
    /// 10 bits
    pub event_label: Option<u16>,
    /// 6 bits
    pub usage_marker: Option<u8>,
    /// Set while the address is still an ESI (Encrypted Short Identity)
    pub encrypted: bool,
}

impl TetraAddress {
    pub fn new(addr_type: AddressType, ssi: u32) -> Self {
        Self {
            addr_type,
            ssi,
            event_label: None,
            usage_marker: None,
            encrypted: false,
        }
    }

    /// Convenience constructor for a plain SSI address
    pub fn ssi(ssi: u32) -> Self {
        Self::new(AddressType::Ssi, ssi)
    }

    pub fn is_null(&self) -> bool {
        self.addr_type == AddressType::NullPdu
    }

    /// True if the address type carries an SSI, USSI or SMI
    pub fn has_ssi(&self) -> bool {
        !matches!(self.addr_type, AddressType::NullPdu | AddressType::EventLabel)
    }
}

impl fmt::Display for TetraAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.addr_type)?;
        match self.addr_type {
            AddressType::NullPdu => {}
            AddressType::Ssi | AddressType::Ussi | AddressType::Smi => {
                write!(f, "{}", self.ssi)?;
            }
            AddressType::EventLabel | AddressType::SsiAndEventLabel | AddressType::SmiAndEventLabel => {
                write!(f, "{}/E{}", self.ssi, self.event_label.unwrap_or(0))?;
            }
            AddressType::SsiAndUsageMarker => {
                write!(f, "{}/U{}", self.ssi, self.usage_marker.unwrap_or(0))?;
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_lengths() {
        assert_eq!(AddressType::NullPdu.num_bits(), 0);
        assert_eq!(AddressType::EventLabel.num_bits(), 10);
        assert_eq!(AddressType::Smi.num_bits(), 24);
        assert_eq!(AddressType::SsiAndUsageMarker.num_bits(), 30);
        assert_eq!(AddressType::SmiAndEventLabel.num_bits(), 34);
    }

    #[test]
    fn test_address_dump() {
        let mut a = TetraAddress::ssi(1234567);
        assert_eq!(a.to_string(), "SSI(1234567)");

        a.addr_type = AddressType::SsiAndUsageMarker;
        a.usage_marker = Some(17);
        assert_eq!(a.to_string(), "SSI + Usage Marker(1234567/U17)");

        let e = TetraAddress { addr_type: AddressType::EventLabel, event_label: Some(5), ..Default::default() };
        assert_eq!(e.to_string(), "Event Label(0/E5)");
        assert_eq!(TetraAddress::default().to_string(), "Null PDU()");
    }
}
