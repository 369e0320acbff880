//! Air interface encryption: key file database, key selection from the received
//! cell parameters, and keystream application to MAC PDUs and speech frames.

pub mod cipher;
pub mod key_db;
pub mod tetra_crypto;

pub use cipher::{CipherError, CipherSuite, NoCiphers};
pub use key_db::{KeyStore, KeyStoreError, KeyType, KsgType, NetworkInfo, SecurityClass, TetraKey};
pub use tetra_crypto::{DecryptError, TetraCrypto};
