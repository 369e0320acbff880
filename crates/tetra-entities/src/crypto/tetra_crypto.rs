use core::fmt;
use std::sync::Arc;

use tetra_core::{Direction, PhyBlockNum, TdmaTime, TetraAddress};
use tetra_saps::tmv::TmvUnitdataInd;
use tetra_saps::tmv::enums::logical_chans::LogicalChannel;

use crate::crypto::cipher::{CipherError, CipherSuite, NoCiphers};
use crate::crypto::key_db::{KeyStore, KsgType, NetworkInfo, TetraKey};

/// Keystream bits covering the first half slot, skipped when decrypting the second one
const HALF_SLOT_KS_BITS: usize = 216;
/// Keystream bits for one voice timeslot, two subframes of 137 bits
const VOICE_KS_BITS: usize = 2 * 137;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptError {
    NoKey,
    /// Carrier, location area or colour code not yet known
    IncompleteNetworkInfo,
    NothingToDecrypt,
    Cipher(CipherError),
    /// Encrypted short identities are not decrypted
    IdentityUnsupported,
}

impl fmt::Display for DecryptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecryptError::NoKey => write!(f, "no key"),
            DecryptError::IncompleteNetworkInfo => write!(f, "incomplete network info for TB5"),
            DecryptError::NothingToDecrypt => write!(f, "nothing to decrypt"),
            DecryptError::Cipher(e) => write!(f, "{}", e),
            DecryptError::IdentityUnsupported => write!(f, "identity decryption not supported"),
        }
    }
}

impl std::error::Error for DecryptError {}

impl From<CipherError> for DecryptError {
    fn from(e: CipherError) -> Self {
        DecryptError::Cipher(e)
    }
}

/// Cell parameters relevant for key selection and keystream generation. None while unknown.
#[derive(Debug, Default, Clone)]
pub struct CryptoState {
    pub mcc: Option<u16>,
    pub mnc: Option<u16>,
    /// CCK identifier broadcast in SYSINFO
    pub cck_id: Option<u16>,
    pub hn: Option<u16>,
    pub la: Option<u16>,
    /// Main carrier number
    pub cn: Option<u16>,
    pub cc: Option<u8>,
    pub network: Option<NetworkInfo>,
    pub cck: Option<TetraKey>,
}

/// Keystream IV, EN 300 392-7 Clause 6.4.2.2
pub fn build_iv(time: TdmaTime, hn: u16, dir: Direction) -> u32 {
    debug_assert!(time.is_valid());
    (time.t as u32 - 1)
        | (time.f as u32) << 2
        | (time.m as u32) << 7
        | ((hn & 0x7FFF) as u32) << 13
        | dir.to_bit() << 28
}

/// Key selection and decryption for the cell currently received
pub struct TetraCrypto {
    keystore: Arc<KeyStore>,
    ciphers: Box<dyn CipherSuite>,
    state: CryptoState,
}

impl Default for TetraCrypto {
    fn default() -> Self {
        Self::new(Arc::new(KeyStore::default()), Box::new(NoCiphers))
    }
}

impl TetraCrypto {
    pub fn new(keystore: Arc<KeyStore>, ciphers: Box<dyn CipherSuite>) -> Self {
        Self { keystore, ciphers, state: CryptoState::default() }
    }

    pub fn state(&self) -> &CryptoState {
        &self.state
    }

    pub fn has_keys(&self) -> bool {
        !self.keystore.is_empty()
    }

    pub fn set_cc(&mut self, cc: u8) {
        self.state.cc = Some(cc);
    }

    pub fn set_hn(&mut self, hn: u16) {
        self.state.hn = Some(hn);
    }

    pub fn set_la(&mut self, la: u16) {
        self.state.la = Some(la);
    }

    pub fn set_cn(&mut self, cn: u16) {
        self.state.cn = Some(cn);
    }

    /// Select the network entry for a newly received MCC/MNC, then re-select its CCK
    pub fn update_current_network(&mut self, mcc: u16, mnc: u16) {
        self.state.mcc = Some(mcc);
        self.state.mnc = Some(mnc);
        self.state.network = self.keystore.find_network(mcc, mnc).copied();
        match &self.state.network {
            Some(net) => tracing::info!("TetraCrypto: network [{}]", net),
            None => tracing::debug!("TetraCrypto: no network info for MCC {} MNC {}", mcc, mnc),
        }
        self.update_current_cck();
    }

    /// Record a new CCK identifier and select the matching key
    pub fn set_cck_id(&mut self, cck_id: u16) {
        self.state.cck_id = Some(cck_id);
        self.update_current_cck();
    }

    pub fn update_current_cck(&mut self) {
        let st = &mut self.state;
        st.cck = match (st.mcc, st.mnc, st.cck_id) {
            (Some(mcc), Some(mnc), Some(cck_id)) => self.keystore.find_cck(mcc, mnc, cck_id).copied(),
            _ => None,
        };
        if let Some(cck) = &st.cck {
            tracing::info!("TetraCrypto: selected key [{}]", cck);
        }
    }

    /// Key of the current network bound to `addr`, with a type in the `key_types` mask
    pub fn get_key_by_addr(&self, addr: u32, key_types: u32) -> Option<TetraKey> {
        let (Some(mcc), Some(mnc)) = (self.state.mcc, self.state.mnc) else {
            return None;
        };
        self.keystore.find_key_by_addr(mcc, mnc, addr, key_types).copied()
    }

    /// Key to use for keystream generation for an addressed PDU. Without a network
    /// entry there is no key; otherwise the current CCK/SCK is used regardless of `ssi`.
    pub fn get_ksg_key(&self, _ssi: u32) -> Option<TetraKey> {
        self.state.network?;
        self.state.cck
    }

    /// Placeholder for ESI decryption; encrypted short identities are passed on as received
    pub fn decrypt_identity(&self, _addr: &mut TetraAddress) -> Result<(), DecryptError> {
        Err(DecryptError::IdentityUnsupported)
    }

    /// Generate `num_bits` keystream bits, one bit per byte, for the given key and slot time
    pub fn generate_keystream(&self, key: &TetraKey, time: TdmaTime, num_bits: usize) -> Result<Vec<u8>, DecryptError> {
        let st = &self.state;
        let (Some(cn), Some(la), Some(cc)) = (st.cn, st.la, st.cc) else {
            return Err(DecryptError::IncompleteNetworkInfo);
        };
        let hn = st.hn.unwrap_or(time.h);
        let iv = build_iv(time, hn, Direction::Dl);

        let eck = self.ciphers.tb5(cn.to_be_bytes(), la.to_be_bytes(), cc, &key.key)?;

        let mut ks_bytes = vec![0u8; num_bits.div_ceil(8)];
        match key.ksg_type {
            KsgType::Tea1 | KsgType::Tea2 | KsgType::Tea3 => {
                self.ciphers.keystream(key.ksg_type, iv, &eck, &mut ks_bytes)?;
            }
            other => return Err(CipherError::UnsupportedKsg(other).into()),
        }

        Ok((0..num_bits).map(|i| (ks_bytes[i / 8] >> (7 - i % 8)) & 1).collect())
    }

    /// Decrypt the TM-SDU part of a MAC PDU in place. `l1_len` is the PDU length in the
    /// TMV block window, `offset` the start of the encrypted part within it.
    pub fn decrypt_mac_element(&self, tmv: &mut TmvUnitdataInd, key: &TetraKey, l1_len: usize, offset: usize) -> Result<(), DecryptError> {
        if l1_len <= offset {
            return Err(DecryptError::NothingToDecrypt);
        }

        // Second half slot continues the keystream of the first one
        let ks_skip = if tmv.block_num == PhyBlockNum::Block2
            && matches!(tmv.logical_channel, LogicalChannel::SchHd | LogicalChannel::Stch | LogicalChannel::Unknown)
        {
            HALF_SLOT_KS_BITS
        } else {
            0
        };

        let ct_len = l1_len - offset;
        let ks = self.generate_keystream(key, tmv.time, ks_skip + ct_len)?;
        tmv.pdu.xor_bits_at(offset, &ks[ks_skip..]).ok_or(DecryptError::NothingToDecrypt)?;

        tracing::debug!("decrypt_mac_element: key {} time {} offset {} decrypted {} bits",
            key.index, tmv.time, offset, ct_len);
        Ok(())
    }

    /// Decrypt a 276-value speech frame `[bfi, 137 bits, bfi, 137 bits]` in place with the current CCK/SCK
    pub fn decrypt_voice_timeslot(&self, time: TdmaTime, frame: &mut [i16; 276]) -> Result<(), DecryptError> {
        let key = self.state.cck.ok_or(DecryptError::NoKey)?;
        let ks = self.generate_keystream(&key, time, VOICE_KS_BITS)?;
        for i in 0..137 {
            frame[i + 1] ^= ks[i] as i16;
            frame[i + 139] ^= ks[i + 137] as i16;
        }
        Ok(())
    }
}
