use tetra_core::{BitBuffer, TdmaTime};
use tetra_pdus::mle::fields::bs_service_details::BsServiceDetails;
use tetra_pdus::mle::pdus::d_mle_sync::DMleSync;
use tetra_pdus::mle::pdus::d_mle_sysinfo::DMleSysinfo;
use tetra_pdus::umac::fields::sysinfo_opt_field::SysinfoOptField;
use tetra_pdus::umac::pdus::mac_sync::MacSync;
use tetra_pdus::umac::pdus::mac_sysinfo::{CckOrHyperframe, MacSysinfo};

use tetra_entities::lmac::components::errorcontrol::{self, TCH_S_BITS};
use tetra_entities::lmac::components::errorcontrol_params::{NDB_PARAMS, SB1_PARAMS, SB2_PARAMS, SCH_F_PARAMS};
use tetra_entities::lmac::components::scrambler;
use tetra_entities::phy::components::burst_builder::{build_norm_burst, build_sync_burst};

pub const MCC: u16 = 123;
pub const MNC: u16 = 456;
pub const CC: u8 = 5;
pub const MAIN_CARRIER: u16 = 1521;

/// Noise in front of the first burst
const LEAD_IN_BITS: usize = 100;

/// AACH with two access fields, no traffic
const AACH_SIGNALLING: &str = "00 000000 000000";
/// AACH with DL usage marker 9 and UL usage marker 10
const AACH_TRAFFIC: &str = "11 001001 001010";

/// Downlink of a simulated cell. Encodes blocks into bursts and appends them to a bit stream,
/// advancing the cell time by one timeslot per burst.
pub struct TestCell {
    /// Time of the next burst
    pub time: TdmaTime,
    stream: Vec<u8>,
}

fn bits<const N: usize>(buf: &BitBuffer) -> [u8; N] {
    let mut arr = [0u8; N];
    arr.copy_from_slice(buf.as_bits());
    arr
}

impl TestCell {
    pub fn new(time: TdmaTime) -> Self {
        Self { time, stream: Vec::new() }
    }

    pub fn scrambling_code(&self) -> u32 {
        scrambler::tetra_scramb_get_init(MCC, MNC, CC)
    }

    /// Lead-in noise and a SYNC burst for the receiver to find the slot boundary.
    /// The receiver only decodes the bursts after it.
    pub fn lead_in(&mut self) {
        self.stream.extend_from_slice(&[0u8; LEAD_IN_BITS]);
        self.sync(&BitBuffer::new(124));
    }

    /// Lead-in, then a SYNC burst the receiver decodes
    pub fn start(&mut self) {
        self.lead_in();
        self.sync(&BitBuffer::new(124));
    }

    /// A timeslot without any signal
    pub fn silence(&mut self) {
        self.push(&[0u8; 510]);
    }

    /// SYNC burst with the given SB2 type1 bits
    pub fn sync(&mut self, sb2: &BitBuffer) {
        let mut type1 = BitBuffer::new(60);
        MacSync {
            system_code: 0,
            colour_code: CC,
            time: self.time,
            sharing_mode: 0,
            ts_reserved_frames: 0,
            u_plane_dtx: false,
            frame_18_ext: false,
        }.to_bitbuf(&mut type1);
        DMleSync { mcc: MCC, mnc: MNC, neighbor_cell_broadcast: 0, cell_load_ca: 0, late_entry_supported: false }.to_bitbuf(&mut type1);
        type1.seek(0);

        let sb1 = errorcontrol::encode_cp(&SB1_PARAMS, &type1, scrambler::SCRAMB_INIT).unwrap();
        let sb2 = errorcontrol::encode_cp(&SB2_PARAMS, sb2, self.scrambling_code()).unwrap();
        let burst = build_sync_burst(&bits(&sb1), &bits(&self.aach(AACH_SIGNALLING)), &bits(&sb2));
        self.push(&burst);
    }

    /// NORM2 burst with two half slot blocks of 124 type1 bits
    pub fn half_slots(&mut self, blk1: &BitBuffer, blk2: &BitBuffer) {
        let ndb1 = errorcontrol::encode_cp(&NDB_PARAMS, blk1, self.scrambling_code()).unwrap();
        let ndb2 = errorcontrol::encode_cp(&NDB_PARAMS, blk2, self.scrambling_code()).unwrap();
        let burst = build_norm_burst(&bits(&ndb1), &bits(&self.aach(AACH_SIGNALLING)), &bits(&ndb2), true);
        self.push(&burst);
    }

    /// NORM2 burst with only Null PDUs
    pub fn idle(&mut self) {
        self.half_slots(&BitBuffer::new(124), &BitBuffer::new(124));
    }

    /// NORM1 burst with a full slot signalling block of 268 type1 bits
    pub fn full_slot(&mut self, type1: &BitBuffer) {
        let sch_f = errorcontrol::encode_cp(&SCH_F_PARAMS, type1, self.scrambling_code()).unwrap();
        self.push_norm1(&sch_f, AACH_SIGNALLING);
    }

    /// NORM1 burst on a traffic channel, carrying one TCH/S frame
    pub fn traffic(&mut self, codec_bits: &[u8; TCH_S_BITS]) {
        let tch = errorcontrol::encode_tp(codec_bits, self.scrambling_code());
        self.push_norm1(&tch, AACH_TRAFFIC);
    }

    /// Everything sent so far
    pub fn take_stream(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.stream)
    }

    fn aach(&self, type1: &str) -> BitBuffer {
        errorcontrol::encode_aach(&BitBuffer::from_bitstr(type1), self.scrambling_code()).unwrap()
    }

    fn push_norm1(&mut self, type5: &BitBuffer, aach: &str) {
        let (blk1, blk2) = type5.as_bits().split_at(216);
        let mut bkn1 = [0u8; 216];
        let mut bkn2 = [0u8; 216];
        bkn1.copy_from_slice(blk1);
        bkn2.copy_from_slice(blk2);
        let burst = build_norm_burst(&bkn1, &bits(&self.aach(aach)), &bkn2, false);
        self.push(&burst);
    }

    fn push(&mut self, burst: &[u8]) {
        self.stream.extend_from_slice(burst);
        self.time = self.time.add_timeslots(1);
    }
}

/// SYSINFO broadcast for the test cell, 124 type1 bits
pub fn sysinfo(cck_or_hyperframe: CckOrHyperframe, la: u16, aie: bool) -> BitBuffer {
    let mut buf = BitBuffer::new(124);
    MacSysinfo {
        main_carrier: MAIN_CARRIER,
        freq_band: 4,
        freq_offset_index: 0,
        duplex_spacing: 0,
        reverse_operation: false,
        num_of_csch: 0,
        ms_txpwr_max_cell: 0,
        rxlev_access_min: 0,
        access_parameter: 0,
        radio_dl_timeout: 0,
        cck_or_hyperframe,
        option_field: SysinfoOptField::DefaultAccessCodeA(0),
        mle_sysinfo: DMleSysinfo {
            location_area: la,
            subscriber_class: 0xFFFF,
            bs_service_details: BsServiceDetails { aie_service: aie, voice_service: true, ..Default::default() },
        },
    }.to_bitbuf(&mut buf);
    buf.seek(0);
    buf
}

/// Block of `block_bits` type1 bits starting with a MAC-RESOURCE to `ssi` of `len_octets`,
/// carrying a BL-DATA with `tl_sdu`
pub fn resource_bl_data(block_bits: usize, ssi: u32, encryption_mode: u8, len_octets: u8, tl_sdu: &str) -> BitBuffer {
    let mut buf = BitBuffer::new(block_bits);
    buf.write_bits(0, 2); // MAC-RESOURCE
    buf.write_bits(0, 1); // fill bits
    buf.write_bits(0, 1); // position of grant
    buf.write_bits(encryption_mode as u64, 2);
    buf.write_bits(0, 1); // random access
    buf.write_bits(len_octets as u64, 6);
    buf.write_bits(1, 3); // SSI
    buf.write_bits(ssi as u64, 24);
    buf.write_bits(0, 3); // no power control, slot grant or channel allocation
    buf.write_bits(0b0001, 4); // BL-DATA
    buf.write_bits(1, 1); // N(S)
    let sdu = BitBuffer::from_bitstr(tl_sdu);
    buf.write_bitarr(sdu.as_bits());
    buf.seek(0);
    buf
}

/// TL-SDU of a CMCE D-SDS-DATA
pub const SDS_TL_SDU: &str = "010 01111 0110";

/// MAC-RESOURCE to SSI 7015011 starting a fragmented SDU
pub const FRAG_START: &str = "0000000111111001011010110000101001100011000000110100111101011010111110000100110000110000100100011000000000001100010101000000";
/// MAC-END with slot grant, followed by a Null PDU
pub const FRAG_END: &str = "0111000100110000000000010011001000110000001101000010110000110001010000000000110000010000100000000000000000000000000000000000";
