use core::fmt;

use tetra_core::{BitBuffer, FreqInfo, expect_pdu_type};
use tetra_core::pdu_parse_error::PduParseErr;

use crate::mle::pdus::d_mle_sysinfo::DMleSysinfo;
use crate::umac::enums::broadcast_type::BroadcastType;
use crate::umac::enums::mac_pdu_type::MacPduType;
use crate::umac::enums::sysinfo_opt_field_flag::SysinfoOptFieldFlag;
use crate::umac::fields::sysinfo_opt_field::SysinfoOptField;

/// The 16-bit field following the CCK flag holds either the CCK identifier or the hyperframe number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CckOrHyperframe {
    CckId(u16),
    Hyperframe(u16),
}

/// Clause 21.4.4.1 SYSINFO, followed by its D-MLE-SYSINFO TM-SDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacSysinfo {
    // 12
    pub main_carrier: u16,
    // 4
    pub freq_band: u8,
    // 2
    pub freq_offset_index: u8,
    // 3
    pub duplex_spacing: u8,
    // 1
    pub reverse_operation: bool,
    /// 2, number of common secondary control channels on the main carrier
    pub num_of_csch: u8,
    // 3
    pub ms_txpwr_max_cell: u8,
    // 4
    pub rxlev_access_min: u8,
    // 4
    pub access_parameter: u8,
    // 4
    pub radio_dl_timeout: u8,
    // 1 + 16
    pub cck_or_hyperframe: CckOrHyperframe,
    // 2 + 20
    pub option_field: SysinfoOptField,
    // 42
    pub mle_sysinfo: DMleSysinfo,
}

impl MacSysinfo {
    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let pdu_type = buf.read_field(2, "mac_pdu_type")?;
        expect_pdu_type!(pdu_type, MacPduType::Broadcast)?;
        let subtype = buf.read_field(2, "broadcast_type")?;
        expect_pdu_type!(subtype, BroadcastType::Sysinfo)?;

        let main_carrier = buf.read_field(12, "main_carrier")? as u16;
        let freq_band = buf.read_field(4, "freq_band")? as u8;
        let freq_offset_index = buf.read_field(2, "freq_offset")? as u8;
        let duplex_spacing = buf.read_field(3, "duplex_spacing")? as u8;
        let reverse_operation = buf.read_field(1, "reverse_operation")? != 0;
        let num_of_csch = buf.read_field(2, "num_of_csch")? as u8;
        let ms_txpwr_max_cell = buf.read_field(3, "ms_txpwr_max_cell")? as u8;
        let rxlev_access_min = buf.read_field(4, "rxlev_access_min")? as u8;
        let access_parameter = buf.read_field(4, "access_parameter")? as u8;
        let radio_dl_timeout = buf.read_field(4, "radio_dl_timeout")? as u8;

        let cck_flag = buf.read_field(1, "cck_flag")? == 1;
        let v = buf.read_field(16, "cck_id_or_hyperframe")? as u16;
        let cck_or_hyperframe = if cck_flag {
            CckOrHyperframe::CckId(v)
        } else {
            CckOrHyperframe::Hyperframe(v)
        };

        let flag = buf.read_field(2, "option_field_flag")?;
        let flag = SysinfoOptFieldFlag::try_from(flag)
            .map_err(|_| PduParseErr::InvalidValue { field: "option_field_flag", value: flag })?;
        let option_field = SysinfoOptField::from_bitbuf(flag, buf)?;

        let mle_sysinfo = DMleSysinfo::from_bitbuf(buf)?;

        Ok(MacSysinfo {
            main_carrier,
            freq_band,
            freq_offset_index,
            duplex_spacing,
            reverse_operation,
            num_of_csch,
            ms_txpwr_max_cell,
            rxlev_access_min,
            access_parameter,
            radio_dl_timeout,
            cck_or_hyperframe,
            option_field,
            mle_sysinfo,
        })
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(MacPduType::Broadcast.into_raw(), 2);
        buf.write_bits(BroadcastType::Sysinfo.into_raw(), 2);
        buf.write_bits(self.main_carrier as u64, 12);
        buf.write_bits(self.freq_band as u64, 4);
        buf.write_bits(self.freq_offset_index as u64, 2);
        buf.write_bits(self.duplex_spacing as u64, 3);
        buf.write_bits(self.reverse_operation as u64, 1);
        buf.write_bits(self.num_of_csch as u64, 2);
        buf.write_bits(self.ms_txpwr_max_cell as u64, 3);
        buf.write_bits(self.rxlev_access_min as u64, 4);
        buf.write_bits(self.access_parameter as u64, 4);
        buf.write_bits(self.radio_dl_timeout as u64, 4);
        match self.cck_or_hyperframe {
            CckOrHyperframe::CckId(id) => {
                buf.write_bits(1, 1);
                buf.write_bits(id as u64, 16);
            }
            CckOrHyperframe::Hyperframe(hn) => {
                buf.write_bits(0, 1);
                buf.write_bits(hn as u64, 16);
            }
        }
        self.option_field.to_bitbuf(buf);
        self.mle_sysinfo.to_bitbuf(buf);
    }

    pub fn freq_info(&self) -> FreqInfo {
        FreqInfo::from_components(
            self.freq_band,
            self.main_carrier,
            self.freq_offset_index,
            self.duplex_spacing,
            self.reverse_operation)
    }

    pub fn cck_id(&self) -> Option<u16> {
        match self.cck_or_hyperframe {
            CckOrHyperframe::CckId(id) => Some(id),
            CckOrHyperframe::Hyperframe(_) => None,
        }
    }

    pub fn hyperframe(&self) -> Option<u16> {
        match self.cck_or_hyperframe {
            CckOrHyperframe::Hyperframe(hn) => Some(hn),
            CckOrHyperframe::CckId(_) => None,
        }
    }
}

impl fmt::Display for MacSysinfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (dl, ul) = self.freq_info().get_freqs();
        write!(f, "SYSINFO {{ DL {} Hz UL {} Hz", dl, ul)?;
        match self.cck_or_hyperframe {
            CckOrHyperframe::CckId(id) => write!(f, " CCK ID {}", id)?,
            CckOrHyperframe::Hyperframe(hn) => write!(f, " Hyperframe {}", hn)?,
        }
        write!(f, " {}: 0x{:05x} {} }}", self.option_field.flag(), self.option_field.raw(), self.mle_sysinfo)
    }
}
