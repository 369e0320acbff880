use core::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum PduParseErr {
    InvalidPduType { expected: u64, found: u64 },
    BufferEnded { field: Option<&'static str> },
    InvalidTrailingMbitValue,
    InvalidElemId { found: u64 },
    FieldNotPresent { field: Option<&'static str> },
    InvalidValue{ field: &'static str, value: u64 },
    InconsistentLength { expected: usize, found: usize },
    Inconsistency { field: &'static str, reason: &'static str },
    NotImplemented { field: Option<&'static str> },
}

impl fmt::Display for PduParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PduParseErr::InvalidPduType { expected, found } => write!(f, "invalid pdu type {}, expected {}", found, expected),
            PduParseErr::BufferEnded { field } => write!(f, "buffer ended while reading {}", field.unwrap_or("?")),
            PduParseErr::InvalidTrailingMbitValue => write!(f, "invalid trailing m-bit"),
            PduParseErr::InvalidElemId { found } => write!(f, "invalid element id {}", found),
            PduParseErr::FieldNotPresent { field } => write!(f, "field {} not present", field.unwrap_or("?")),
            PduParseErr::InvalidValue { field, value } => write!(f, "invalid value {} for {}", value, field),
            PduParseErr::InconsistentLength { expected, found } => write!(f, "inconsistent length {}, expected {}", found, expected),
            PduParseErr::Inconsistency { field, reason } => write!(f, "{}: {}", field, reason),
            PduParseErr::NotImplemented { field } => write!(f, "{} not implemented", field.unwrap_or("?")),
        }
    }
}

impl std::error::Error for PduParseErr {}

/// Checks whether a PDU type value matches the expected value. If not, returns PduParseErr::InvalidPduType
#[macro_export]
macro_rules! expect_pdu_type {
    ($value:expr, $expected:expr) => {{
        let raw_expected = $expected.into_raw();
        if $value == raw_expected {
            Ok(())
        } else {
            Err(PduParseErr::InvalidPduType {
                expected: raw_expected as u64,
                found: $value,
            })
        }
    }};
}

/// Checks whether a value matches an expected value. If not, returns PduParseErr::InvalidValue
#[macro_export]
macro_rules! expect_value {
    ($value:ident, $expected:expr) => {
        $crate::expect_value!(@inner $value, $expected, stringify!($value))
    };
    ($value:expr, $expected:expr, $field:expr) => {
        $crate::expect_value!(@inner $value, $expected, $field)
    };

    (@inner $value:expr, $expected:expr, $field:expr) => {{
        let val = $value;
        if val == $expected {
            Ok(())
        } else {
            Err(PduParseErr::InvalidValue {
                field: $field,
                value: val.into(),
            })
        }
    }};
}

#[macro_export]
macro_rules! let_field {
    ($buf:expr, $ident:ident, $bits:expr) => {
        let $ident = $buf.read_field($bits, stringify!($ident))?;
    };
}
