mod common;

use std::sync::Arc;

use tetra_core::{BitBuffer, TdmaTime, debug};
use tetra_entities::crypto::{KeyStore, TetraCrypto};
use tetra_entities::lmac::components::errorcontrol::TCH_S_BITS;
use tetra_entities::mle::mle_ms::MleContent;
use tetra_entities::{Receiver, RxEvent};
use tetra_pdus::cmce::enums::cmce_pdu_type_dl::CmcePduTypeDl;
use tetra_pdus::umac::pdus::mac_sysinfo::CckOrHyperframe;

use common::{CC, MAIN_CARRIER, MCC, MNC, PcmCapture, SDS_TL_SDU, StubCiphers, TestCell, resource_bl_data, sysinfo};

const KEYFILE: &str = "\
# test network, TEA2
network mcc 123 mnc 456 ksg_type 2 security_class 2
key mcc 123 mnc 456 addr 0 key_type 1 key_num 3 key 5a00000000000000c0de
key mcc 123 mnc 456 addr 0 key_type 1 key_num 4 key a500000000000000c0de
";

const LA: u16 = 77;

fn keystore() -> Arc<KeyStore> {
    Arc::new(KeyStore::parse(KEYFILE).unwrap())
}

/// Crypto state the receiver should arrive at, for producing ciphertext
fn reference_crypto(cck_id: u16) -> TetraCrypto {
    let mut c = TetraCrypto::new(keystore(), Box::new(StubCiphers));
    c.update_current_network(MCC, MNC);
    c.set_cck_id(cck_id);
    c.set_cn(MAIN_CARRIER);
    c.set_la(LA);
    c.set_cc(CC);
    c.set_hn(0);
    c
}

fn keystream(cck_id: u16, time: TdmaTime, num_bits: usize) -> Vec<u8> {
    let c = reference_crypto(cck_id);
    let key = c.get_ksg_key(0).unwrap();
    c.generate_keystream(&key, time, num_bits).unwrap()
}

/// Cell advertising air interface encryption with CCK 3, after the receiver locked to it
fn encrypted_cell() -> TestCell {
    let mut cell = TestCell::new(TdmaTime { h: 0, m: 7, f: 18, t: 1, s: 1 });
    cell.lead_in();
    cell.sync(&sysinfo(CckOrHyperframe::CckId(3), LA, true));
    cell
}

/// SDS in a MAC-RESOURCE with encryption mode 1, encrypted for the given slot time
fn encrypted_sds(ssi: u32, cck_id: u16, time: TdmaTime) -> BitBuffer {
    let mut blk = resource_bl_data(124, ssi, 1, 8, SDS_TL_SDU);
    let ks = keystream(cck_id, time, 64 - 43);
    blk.xor_bits_at(43, &ks).unwrap();
    blk
}

fn sdus(events: &[RxEvent]) -> Vec<&tetra_entities::mle::mle_ms::MleUnitdata> {
    events.iter().filter_map(|e| match e {
        RxEvent::Sdu(u) => Some(u),
        _ => None,
    }).collect()
}

#[test]
fn test_key_selected_from_broadcast() {
    debug::setup_logging_verbose();
    let mut cell = encrypted_cell();
    cell.idle();

    let mut rx = Receiver::with_keys(keystore(), Box::new(StubCiphers));
    rx.rx_bits(&cell.take_stream());

    let st = rx.crypto().state();
    assert!(st.network.is_some());
    assert_eq!(st.cck_id, Some(3));
    assert_eq!(st.cck.map(|k| k.key_num), Some(3));
    assert_eq!(st.la, Some(LA));
    assert!(rx.status().air_encryption());
}

#[test]
fn test_encrypted_sds_decrypted() {
    debug::setup_logging_verbose();
    let mut cell = encrypted_cell();
    let t = cell.time;
    cell.half_slots(&encrypted_sds(2001, 3, t), &BitBuffer::new(124));

    let mut rx = Receiver::with_keys(keystore(), Box::new(StubCiphers));
    let events = rx.rx_bits(&cell.take_stream());
    let sdus = sdus(&events);
    assert_eq!(sdus.len(), 1);
    assert_eq!(sdus[0].main_address.ssi, 2001);
    assert_eq!(sdus[0].time, t);
    assert_eq!(sdus[0].content, MleContent::Cmce(CmcePduTypeDl::DSdsData));
}

#[test]
fn test_encrypted_sds_not_delivered() {
    debug::setup_logging_verbose();

    // No keys at all
    let mut cell = encrypted_cell();
    let t = cell.time;
    cell.half_slots(&encrypted_sds(2001, 3, t), &BitBuffer::new(124));
    let mut rx = Receiver::with_keys(Arc::new(KeyStore::default()), Box::new(StubCiphers));
    assert!(sdus(&rx.rx_bits(&cell.take_stream())).is_empty());

    // Encrypted with a key the cell did not announce. Decryption with CCK 3 leaves
    // garbage that does not make it through the LLC as an SDS.
    let mut cell = encrypted_cell();
    let t = cell.time;
    cell.half_slots(&encrypted_sds(2001, 4, t), &BitBuffer::new(124));
    let mut rx = Receiver::with_keys(keystore(), Box::new(StubCiphers));
    let events = rx.rx_bits(&cell.take_stream());
    assert!(sdus(&events).iter().all(|u| u.content != MleContent::Cmce(CmcePduTypeDl::DSdsData)));
}

#[test]
fn test_encrypted_voice_decrypted() {
    debug::setup_logging_verbose();
    let mut cell = encrypted_cell();
    // Leave frame 18, where the AACH does not announce traffic
    cell.idle();
    cell.idle();
    let t = cell.time;
    assert_eq!(t.f, 1);

    let mut plain = [0u8; TCH_S_BITS];
    for b in plain.iter_mut() {
        *b = rand::random_range(0..2);
    }
    let ks = keystream(3, t, TCH_S_BITS);
    let mut cipher = plain;
    for (c, k) in cipher.iter_mut().zip(&ks) {
        *c ^= k;
    }
    cell.traffic(&cipher);

    let capture = PcmCapture::default();
    let mut rx = Receiver::with_keys(keystore(), Box::new(StubCiphers));
    rx.set_voice_bridge(capture.bridge());
    let events = rx.rx_bits(&cell.take_stream());

    let voice = events.iter().find_map(|e| match e {
        RxEvent::Voice(v) => Some(v),
        _ => None,
    }).unwrap();
    assert_eq!(voice.time, t);
    assert!(voice.data[1..138].iter().zip(&plain[..137]).all(|(&v, &b)| v == b as i16));
    assert!(voice.data[139..].iter().zip(&plain[137..]).all(|(&v, &b)| v == b as i16));

    let pcm = capture.take();
    assert_eq!(pcm.len(), 480);
    assert_eq!(pcm[0], plain[0] as i16);
    assert_eq!(pcm[240], plain[137] as i16);
}
