// Clause 21.5.2

use core::fmt;

use tetra_core::{BitBuffer, FreqInfo, pdu_parse_error::PduParseErr};

use crate::umac::enums::{chan_alloc_type::ChanAllocType, ul_dl_assignment::UlDlAssignment};

/// Extended carrier numbering, present when the allocated carrier is on another band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtCarrier {
    // 4
    pub freq_band: u8,
    // 2
    pub freq_offset: u8,
    // 3
    pub duplex_spacing: u8,
    // 1
    pub reverse_operation: bool,
}

/// Augmented channel allocation, present when the UL/DL field is 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AugmentedChanAlloc {
    // 2
    pub ul_dl_assigned: u8,
    // 3
    pub bandwidth: u8,
    // 3
    pub modulation_mode: u8,
    // 3
    pub max_ul_qam_modulation: u8,
    // 3 reserved
    // 3
    pub conforming_chan_status: u8,
    // 4
    pub bs_link_imbalance: u8,
    // 5
    pub bs_tx_power_relative: u8,
    // 2
    pub napping_status: u8,
    /// 11 opt, when napping_status == 1
    pub napping_info: Option<u16>,
    // 4 reserved
    /// 16 opt
    pub cond_a_elem: Option<u16>,
    /// 16 opt
    pub cond_b_elem: Option<u16>,
    // 1
    pub further_augmentation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChanAllocElement {
    // 2
    pub alloc_type: ChanAllocType,
    /// 4-bit bitmap, MSB is TS1
    pub timeslots: u8,
    // 2
    pub ul_dl_assigned: UlDlAssignment,
    // 1
    pub clch_permission: bool,
    // 1
    pub cell_change_flag: bool,
    // 12
    pub carrier_num: u16,
    // 1 + 10 opt
    pub ext_carrier: Option<ExtCarrier>,
    // 2
    pub mon_pattern: u8,
    /// 2 opt, when mon_pattern == 0
    pub frame18_mon_pattern: Option<u8>,
    pub augmented: Option<AugmentedChanAlloc>,
}

impl ChanAllocElement {
    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let val = buf.read_field(2, "alloc_type")?;
        let alloc_type = ChanAllocType::try_from(val)
            .map_err(|_| PduParseErr::InvalidValue { field: "alloc_type", value: val })?;
        let timeslots = buf.read_field(4, "timeslots")? as u8;
        let val = buf.read_field(2, "ul_dl_assigned")?;
        let ul_dl_assigned = UlDlAssignment::try_from(val)
            .map_err(|_| PduParseErr::InvalidValue { field: "ul_dl_assigned", value: val })?;
        let clch_permission = buf.read_field(1, "clch_permission")? != 0;
        let cell_change_flag = buf.read_field(1, "cell_change_flag")? != 0;
        let carrier_num = buf.read_field(12, "carrier_num")? as u16;

        let ext_carrier = if buf.read_field(1, "ext_carrier_flag")? == 1 {
            Some(ExtCarrier {
                freq_band: buf.read_field(4, "ext_freq_band")? as u8,
                freq_offset: buf.read_field(2, "ext_freq_offset")? as u8,
                duplex_spacing: buf.read_field(3, "ext_duplex_spacing")? as u8,
                reverse_operation: buf.read_field(1, "ext_reverse_operation")? != 0,
            })
        } else {
            None
        };

        let mon_pattern = buf.read_field(2, "mon_pattern")? as u8;
        let frame18_mon_pattern = match mon_pattern {
            0 => Some(buf.read_field(2, "frame18_mon_pattern")? as u8),
            _ => None,
        };

        let augmented = if ul_dl_assigned == UlDlAssignment::Augmented {
            Some(Self::parse_augmented(buf)?)
        } else {
            None
        };

        Ok(ChanAllocElement {
            alloc_type,
            timeslots,
            ul_dl_assigned,
            clch_permission,
            cell_change_flag,
            carrier_num,
            ext_carrier,
            mon_pattern,
            frame18_mon_pattern,
            augmented,
        })
    }

    fn parse_augmented(buf: &mut BitBuffer) -> Result<AugmentedChanAlloc, PduParseErr> {
        let ul_dl_assigned = buf.read_field(2, "aug_ul_dl_assigned")? as u8;
        let bandwidth = buf.read_field(3, "aug_bandwidth")? as u8;
        let modulation_mode = buf.read_field(3, "aug_modulation_mode")? as u8;
        let max_ul_qam_modulation = buf.read_field(3, "aug_max_ul_qam")? as u8;
        buf.read_field(3, "aug_reserved1")?;
        let conforming_chan_status = buf.read_field(3, "aug_conforming_chan_status")? as u8;
        let bs_link_imbalance = buf.read_field(4, "aug_bs_link_imbalance")? as u8;
        let bs_tx_power_relative = buf.read_field(5, "aug_bs_tx_power_relative")? as u8;
        let napping_status = buf.read_field(2, "aug_napping_status")? as u8;
        let napping_info = match napping_status {
            1 => Some(buf.read_field(11, "aug_napping_info")? as u16),
            _ => None,
        };
        buf.read_field(4, "aug_reserved2")?;
        let cond_a_elem = match buf.read_field(1, "aug_cond_a_flag")? {
            1 => Some(buf.read_field(16, "aug_cond_a_elem")? as u16),
            _ => None,
        };
        let cond_b_elem = match buf.read_field(1, "aug_cond_b_flag")? {
            1 => Some(buf.read_field(16, "aug_cond_b_elem")? as u16),
            _ => None,
        };
        let further_augmentation = buf.read_field(1, "aug_further_flag")? != 0;

        Ok(AugmentedChanAlloc {
            ul_dl_assigned,
            bandwidth,
            modulation_mode,
            max_ul_qam_modulation,
            conforming_chan_status,
            bs_link_imbalance,
            bs_tx_power_relative,
            napping_status,
            napping_info,
            cond_a_elem,
            cond_b_elem,
            further_augmentation,
        })
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(self.alloc_type.into_raw(), 2);
        buf.write_bits(self.timeslots as u64, 4);
        buf.write_bits(self.ul_dl_assigned.into_raw(), 2);
        buf.write_bits(self.clch_permission as u64, 1);
        buf.write_bits(self.cell_change_flag as u64, 1);
        buf.write_bits(self.carrier_num as u64, 12);

        match &self.ext_carrier {
            Some(ext) => {
                buf.write_bits(1, 1);
                buf.write_bits(ext.freq_band as u64, 4);
                buf.write_bits(ext.freq_offset as u64, 2);
                buf.write_bits(ext.duplex_spacing as u64, 3);
                buf.write_bits(ext.reverse_operation as u64, 1);
            }
            None => buf.write_bits(0, 1),
        }

        buf.write_bits(self.mon_pattern as u64, 2);
        if self.mon_pattern == 0 {
            buf.write_bits(self.frame18_mon_pattern.unwrap_or(0) as u64, 2);
        }

        if let Some(aug) = &self.augmented {
            buf.write_bits(aug.ul_dl_assigned as u64, 2);
            buf.write_bits(aug.bandwidth as u64, 3);
            buf.write_bits(aug.modulation_mode as u64, 3);
            buf.write_bits(aug.max_ul_qam_modulation as u64, 3);
            buf.write_bits(0, 3);
            buf.write_bits(aug.conforming_chan_status as u64, 3);
            buf.write_bits(aug.bs_link_imbalance as u64, 4);
            buf.write_bits(aug.bs_tx_power_relative as u64, 5);
            buf.write_bits(aug.napping_status as u64, 2);
            if aug.napping_status == 1 {
                buf.write_bits(aug.napping_info.unwrap_or(0) as u64, 11);
            }
            buf.write_bits(0, 4);
            for elem in [aug.cond_a_elem, aug.cond_b_elem] {
                match elem {
                    Some(v) => {
                        buf.write_bits(1, 1);
                        buf.write_bits(v as u64, 16);
                    }
                    None => buf.write_bits(0, 1),
                }
            }
            buf.write_bits(aug.further_augmentation as u64, 1);
        }
    }

    /// Length of the element in bits
    pub fn compute_len(&self) -> usize {
        // Up to and including the extended carrier flag
        let mut len = 2 + 4 + 2 + 1 + 1 + 12 + 1;
        if self.ext_carrier.is_some() {
            len += 10;
        }
        len += 2;
        if self.mon_pattern == 0 {
            len += 2;
        }
        if let Some(aug) = &self.augmented {
            len += 2 + 3 + 3 + 3 + 3 + 3 + 4 + 5 + 2;
            if aug.napping_status == 1 {
                len += 11;
            }
            len += 4 + 1 + 1 + 1;
            len += 16 * (aug.cond_a_elem.is_some() as usize + aug.cond_b_elem.is_some() as usize);
        }
        len
    }

    /// Downlink frequency of the allocated carrier. Without an extended carrier element,
    /// band and offset index are those of the serving cell.
    pub fn dl_freq(&self, cell_band: u8, cell_offset_index: u8) -> u32 {
        let (band, offset) = match &self.ext_carrier {
            Some(ext) => (ext.freq_band, ext.freq_offset),
            None => (cell_band, cell_offset_index),
        };
        FreqInfo::from_components(band, self.carrier_num, offset, 0, false).dl_freq()
    }

    /// One-line summary, e.g. `Replace (TN4/Uplink + Downlink/425025000Hz)`
    pub fn dump(&self, cell_band: u8, cell_offset_index: u8) -> String {
        format!("{} (TN{}/{}/{}Hz)",
            self.alloc_type,
            self.timeslots,
            self.ul_dl_assigned,
            self.dl_freq(cell_band, cell_offset_index))
    }
}

impl fmt::Display for ChanAllocElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ChanAllocElement {{ alloc_type: {} timeslots: {:04b} ul_dl: {} clch_permission: {} cell_change: {} carrier_num: {}",
            self.alloc_type,
            self.timeslots,
            self.ul_dl_assigned,
            self.clch_permission,
            self.cell_change_flag,
            self.carrier_num,
        )?;
        if let Some(ext) = &self.ext_carrier {
            write!(f, " ext: {:?}", ext)?;
        }
        write!(f, " mon_pattern: {}", self.mon_pattern)?;
        if let Some(v) = self.frame18_mon_pattern {
            write!(f, " frame18_mon_pattern: {}", v)?;
        }
        if let Some(aug) = &self.augmented {
            write!(f, " augmented: {:?}", aug)?;
        }
        write!(f, " }}")
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tetra_core::debug;

    #[test]
    fn test_parse_chanalloc_replace() {
        debug::setup_logging_verbose();
        let bitstr = "0001001110001111101001011";
        let mut buffer = BitBuffer::from_bitstr(bitstr);
        let result = ChanAllocElement::from_bitbuf(&mut buffer).unwrap();

        tracing::info!("Parsed: {}", result);
        assert_eq!(buffer.get_len_remaining(), 0);
        assert_eq!(result.alloc_type, ChanAllocType::Replace);
        assert_eq!(result.timeslots, 0b0100);
        assert_eq!(result.ul_dl_assigned, UlDlAssignment::Both);
        assert!(result.clch_permission);
        assert_eq!(result.carrier_num, 1001);
        assert!(result.ext_carrier.is_none());
        assert_eq!(result.compute_len(), bitstr.len());
        assert_eq!(result.dump(4, 0), "Replace (TN4/Uplink + Downlink/425025000Hz)");
    }

    #[test]
    fn test_parse_chanalloc_additional() {
        debug::setup_logging_verbose();
        let bitstr = "0100101100010111111000011";
        let mut buffer = BitBuffer::from_bitstr(bitstr);
        let result = ChanAllocElement::from_bitbuf(&mut buffer).unwrap();

        assert_eq!(buffer.get_len_remaining(), 0);
        assert_eq!(result.alloc_type, ChanAllocType::Additional);
        assert_eq!(result.carrier_num, 1528);

        let mut buffer_out = BitBuffer::new_autoexpand(30);
        result.to_bitbuf(&mut buffer_out);
        assert_eq!(bitstr, buffer_out.to_bitstr());
    }

    #[test]
    fn test_parse_chanalloc_ext_carrier_augmented() {
        debug::setup_logging_verbose();
        let bitstr = [
            "00", "1000", "00", "0", "0", "000001100100", // type, ts, ul/dl, clch, cell change, carrier 100
            "1", "0100", "01", "000", "0",                // ext carrier: band 4, offset +6.25 kHz
            "00", "10",                                   // mon pattern 0 with frame 18 pattern
            "11", "000", "000", "000", "000", "000", "0000", "00000", // augmented fields
            "01", "00000000111",                          // napping status 1 + napping info
            "0000",                                       // reserved
            "1", "0000000000000001",                      // conditional element A
            "0",                                          // no conditional element B
            "0",                                          // no further augmentation
        ].concat();
        let mut buffer = BitBuffer::from_bitstr(&bitstr);
        let result = ChanAllocElement::from_bitbuf(&mut buffer).unwrap();

        assert_eq!(buffer.get_len_remaining(), 0);
        assert_eq!(result.compute_len(), bitstr.len());
        let ext = result.ext_carrier.unwrap();
        assert_eq!(ext.freq_band, 4);
        assert_eq!(ext.freq_offset, 1);
        assert_eq!(result.frame18_mon_pattern, Some(2));
        let aug = result.augmented.unwrap();
        assert_eq!(aug.ul_dl_assigned, 3);
        assert_eq!(aug.napping_info, Some(7));
        assert_eq!(aug.cond_a_elem, Some(1));
        assert_eq!(aug.cond_b_elem, None);
        // Extended carrier overrides the serving cell band
        assert_eq!(result.dl_freq(3, 0), 400_000_000 + 100 * 25_000 + 6250);
        assert_eq!(result.dump(3, 0), "Replace (TN8/Augmented/402506250Hz)");
    }

    #[test]
    fn test_truncated_element() {
        let mut buffer = BitBuffer::from_bitstr("00010011100011111010");
        assert!(matches!(
            ChanAllocElement::from_bitbuf(&mut buffer),
            Err(PduParseErr::BufferEnded { .. })
        ));
    }
}
