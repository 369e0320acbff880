/// ETSI TS 100 392-15 V1.5.1 (2011-02), clause 6: Duplex spacing in kHz, indexed [duplex setting][band]
const TETRA_DUPLEX_SPACING: [[Option<u32>; 16]; 8] = [
    [ None,    Some(1600), Some(10000), Some(10000), Some(10000), Some(10000), Some(10000), None,        None,        None,        None,    None,    None,    None,    None,    None ],
    [ None,    Some(4500), None,        Some(36000), Some(7000),  None,        None,        None,        Some(45000), Some(45000), None,    None,    None,    None,    None,    None ],
    [ Some(0), Some(0),    Some(0),     Some(0),     Some(0),     Some(0),     Some(0),     Some(0),     Some(0),     Some(0),     Some(0), Some(0), Some(0), Some(0), Some(0), Some(0)],
    [ None,    None,       None,        Some(8000),  Some(8000),  None,        None,        None,        Some(18000), Some(18000), None,    None,    None,    None,    None,    None ],
    [ None,    None,       None,        Some(18000), Some(5000),  None,        Some(30000), Some(30000), None,        Some(39000), None,    None,    None,    None,    None,    None ],
    [ None,    None,       None,        None,        Some(9500),  None,        None,        None,        None,        None,        None,    None,    None,    None,    None,    None ],
    [ None,    None,       None,        None,        None,        None,        None,        None,        None,        None,        None,    None,    None,    None,    None,    None ],
    [ None,    None,       None,        None,        None,        None,        None,        None,        None,        None,        None,    None,    None,    None,    None,    None ],
];

/// Carrier frequency parameters as broadcast in SYSINFO or in an extended carrier element
#[derive(Debug, Clone, PartialEq)]
pub struct FreqInfo {
    /// Frequency band in 100MHz increments
    pub band: u8,
    /// Carrier number, 0-4095
    pub carrier: u16,
    /// Frequency offset from 25 kHz aligned carrier. In Hz, -6250, 0, 6250, 12500
    pub freq_offset_hz: i32,
    /// Duplex spacing setting (index in duplex spacing table)
    pub duplex_spacing_id: u8,
    /// Duplex spacing in Hz, 0 if the table has no entry for this band
    pub duplex_spacing_val: u32,
    /// Reverse operation flag, if true, UL is above DL frequency
    pub reverse_operation: bool,
}

impl FreqInfo {

    pub fn freq_offset_id_to_hz(offset_index: u8) -> Option<i32> {
        match offset_index {
            0 => Some(0),
            1 => Some(6250),
            2 => Some(-6250),
            3 => Some(12500),
            _ => None,
        }
    }

    /// Construct FreqInfo from the raw SYSINFO fields. Unknown offsets map to 0 Hz and
    /// reserved duplex table entries to a duplex spacing of 0 Hz.
    pub fn from_components(band: u8, carrier: u16, offset_index: u8, duplex_index: u8, reverse_operation: bool) -> Self {
        Self {
            band,
            carrier,
            freq_offset_hz: Self::freq_offset_id_to_hz(offset_index).unwrap_or(0),
            duplex_spacing_id: duplex_index,
            duplex_spacing_val: Self::get_default_duplex_spacing(band, duplex_index).unwrap_or(0),
            reverse_operation,
        }
    }

    /// Get the standardized duplex spacing in hz for a frequency band and a given
    /// duplex spacing table index, as given in the Sysinfo message
    pub fn get_default_duplex_spacing(band: u8, duplex_setting: u8) -> Option<u32> {
        let row = TETRA_DUPLEX_SPACING.get(duplex_setting as usize)?;
        let duplex_spacing = (*row.get(band as usize)?)?;
        Some(duplex_spacing * 1000)
    }

    /// Downlink carrier frequency in Hz
    pub fn dl_freq(&self) -> u32 {
        let dl_freq = 100_000_000i64 * self.band as i64
            + self.carrier as i64 * 25_000
            + self.freq_offset_hz as i64;
        dl_freq as u32
    }

    /// Get the downlink and uplink frequencies for this instance
    pub fn get_freqs(&self) -> (u32, u32) {
        let dl_freq = self.dl_freq();
        let ul_freq = if !self.reverse_operation {
            dl_freq.wrapping_sub(self.duplex_spacing_val)
        } else {
            dl_freq.wrapping_add(self.duplex_spacing_val)
        };
        (dl_freq, ul_freq)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freqinfo_from_components() {
        let freq = 400_000_000 + 1001 * 25_000;
        let duplex_spacing = 10_000_000;

        let f1 = FreqInfo::from_components(4, 1001, 0, 0, false);
        let (dlfreq, ulfreq) = f1.get_freqs();

        assert_eq!(f1.duplex_spacing_val, duplex_spacing);
        assert_eq!(freq, dlfreq);
        assert_eq!(dlfreq - duplex_spacing, ulfreq);
    }

    #[test]
    fn test_offsets_and_reverse() {
        let f = FreqInfo::from_components(3, 2000, 2, 4, true);
        assert_eq!(f.freq_offset_hz, -6250);
        assert_eq!(f.dl_freq(), 300_000_000 + 2000 * 25_000 - 6250);
        let (dl, ul) = f.get_freqs();
        assert_eq!(ul, dl + 18_000_000);
    }

    #[test]
    fn test_reserved_duplex_entry() {
        // Band 0 has no duplex spacing defined for setting 0
        let f = FreqInfo::from_components(0, 100, 0, 0, false);
        assert_eq!(f.duplex_spacing_val, 0);
        let (dl, ul) = f.get_freqs();
        assert_eq!(dl, ul);
        assert_eq!(FreqInfo::get_default_duplex_spacing(1, 9), None);
    }
}
