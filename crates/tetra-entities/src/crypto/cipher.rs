use core::fmt;

use crate::crypto::key_db::{KEY_BYTES, KsgType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// The primitive is not provided by this cipher suite
    Unavailable(&'static str),
    /// The network uses a keystream generator that is not supported
    UnsupportedKsg(KsgType),
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherError::Unavailable(name) => write!(f, "{} not available", name),
            CipherError::UnsupportedKsg(ksg) => write!(f, "KSG {} not supported", ksg),
        }
    }
}

impl std::error::Error for CipherError {}

/// Air interface encryption primitives, supplied by the embedding application.
pub trait CipherSuite: Send {
    /// TB5: derive the encryption cipher key from carrier number, location area,
    /// colour code and cipher key
    fn tb5(&self, cn: [u8; 2], la: [u8; 2], cc: u8, ck: &[u8; KEY_BYTES]) -> Result<[u8; KEY_BYTES], CipherError>;

    /// Fill `out` with keystream bytes of the given generator for initial value `iv`
    fn keystream(&self, ksg: KsgType, iv: u32, eck: &[u8; KEY_BYTES], out: &mut [u8]) -> Result<(), CipherError>;
}

/// Cipher suite without any primitives. Decryption always fails, ciphertext is passed on untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCiphers;

impl CipherSuite for NoCiphers {
    fn tb5(&self, _cn: [u8; 2], _la: [u8; 2], _cc: u8, _ck: &[u8; KEY_BYTES]) -> Result<[u8; KEY_BYTES], CipherError> {
        Err(CipherError::Unavailable("TB5"))
    }

    fn keystream(&self, ksg: KsgType, _iv: u32, _eck: &[u8; KEY_BYTES], _out: &mut [u8]) -> Result<(), CipherError> {
        Err(CipherError::Unavailable(ksg.name()))
    }
}
