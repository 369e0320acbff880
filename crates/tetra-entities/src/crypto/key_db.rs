use core::fmt;
use std::path::Path;

/// Key types, values as used in key files. CCK/SCK is the only type currently used for keystream generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Undefined = 0,
    /// SCK in class 2, CCK in class 3 networks
    CckSck = 1,
    Dck = 2,
    Mgck = 4,
    Gck = 8,
}

impl TryFrom<u32> for KeyType {
    type Error = ();
    fn try_from(x: u32) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(KeyType::Undefined),
            1 => Ok(KeyType::CckSck),
            2 => Ok(KeyType::Dck),
            4 => Ok(KeyType::Mgck),
            8 => Ok(KeyType::Gck),
            _ => Err(()),
        }
    }
}

impl KeyType {
    pub fn name(self) -> &'static str {
        match self {
            KeyType::Undefined => "UNDEFINED",
            KeyType::CckSck => "CCK/SCK",
            KeyType::Dck => "DCK",
            KeyType::Mgck => "MGCK",
            KeyType::Gck => "GCK",
        }
    }
}

/// Keystream generator employed by a network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KsgType {
    Unknown,
    Tea1,
    Tea2,
    Tea3,
    Tea4,
    Tea5,
    Tea6,
    Tea7,
    /// KSG numbers 9..15, raw value kept
    Proprietary(u32),
}

impl KsgType {
    pub fn from_raw(x: u32) -> Self {
        match x {
            0 => KsgType::Unknown,
            1 => KsgType::Tea1,
            2 => KsgType::Tea2,
            3 => KsgType::Tea3,
            4 => KsgType::Tea4,
            5 => KsgType::Tea5,
            6 => KsgType::Tea6,
            7 => KsgType::Tea7,
            other => KsgType::Proprietary(other),
        }
    }

    pub fn into_raw(self) -> u32 {
        match self {
            KsgType::Unknown => 0,
            KsgType::Tea1 => 1,
            KsgType::Tea2 => 2,
            KsgType::Tea3 => 3,
            KsgType::Tea4 => 4,
            KsgType::Tea5 => 5,
            KsgType::Tea6 => 6,
            KsgType::Tea7 => 7,
            KsgType::Proprietary(x) => x,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KsgType::Unknown => "UNKNOWN",
            KsgType::Tea1 => "TEA1",
            KsgType::Tea2 => "TEA2",
            KsgType::Tea3 => "TEA3",
            KsgType::Tea4 => "TEA4",
            KsgType::Tea5 => "TEA5",
            KsgType::Tea6 => "TEA6",
            KsgType::Tea7 => "TEA7",
            KsgType::Proprietary(_) => "PROPRIETARY",
        }
    }
}

impl fmt::Display for KsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// EN 300 392-7 Clause 6.2 network security classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityClass {
    Undefined = 0,
    Class1 = 1,
    Class2 = 2,
    Class3 = 3,
}

impl TryFrom<u32> for SecurityClass {
    type Error = ();
    fn try_from(x: u32) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(SecurityClass::Undefined),
            1 => Ok(SecurityClass::Class1),
            2 => Ok(SecurityClass::Class2),
            3 => Ok(SecurityClass::Class3),
            _ => Err(()),
        }
    }
}

impl SecurityClass {
    pub fn name(self) -> &'static str {
        match self {
            SecurityClass::Undefined => "CLASS_UNDEFINED",
            SecurityClass::Class1 => "CLASS_1",
            SecurityClass::Class2 => "CLASS_2",
            SecurityClass::Class3 => "CLASS_3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    pub mcc: u16,
    pub mnc: u16,
    pub ksg_type: KsgType,
    pub security_class: SecurityClass,
}

impl fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MCC {:4} MNC {:4} ksg_type {} security_class {}",
            self.mcc, self.mnc, self.ksg_type.into_raw(), self.security_class as u8)
    }
}

pub const KEY_BYTES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TetraKey {
    /// Position in the key file, counting key lines only
    pub index: usize,
    pub mcc: u16,
    pub mnc: u16,
    pub key_type: KeyType,
    /// SCK-VN or group key number, depending on the key type
    pub key_num: u32,
    /// ISSI or GSSI the key is bound to, for DCK and MGCK
    pub addr: u32,
    pub key: [u8; KEY_BYTES],
    /// Keystream generator of the network this key belongs to
    pub ksg_type: KsgType,
}

impl fmt::Display for TetraKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MCC {:4} MNC {:4} key_type {}", self.mcc, self.mnc, self.key_type.name())?;
        if matches!(self.key_type, KeyType::Dck | KeyType::Mgck) {
            write!(f, " addr: {:8}", self.addr)?;
        }
        if self.key_type == KeyType::CckSck {
            write!(f, " key_num: {:4}", self.key_num)?;
        }
        write!(f, ": ")?;
        for b in self.key {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum KeyStoreError {
    Io(std::io::Error),
    /// Malformed line, 1-based line number
    Parse { line: usize, reason: String },
    /// A key refers to a network that has no `network` line
    MissingNetwork { line: usize, mcc: u16, mnc: u16 },
}

impl fmt::Display for KeyStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStoreError::Io(e) => write!(f, "cannot read key file: {}", e),
            KeyStoreError::Parse { line, reason } => write!(f, "line {}: {}", line, reason),
            KeyStoreError::MissingNetwork { line, mcc, mnc } => {
                write!(f, "line {}: no network info for MCC {} MNC {}", line, mcc, mnc)
            }
        }
    }
}

impl std::error::Error for KeyStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeyStoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KeyStoreError {
    fn from(e: std::io::Error) -> Self {
        KeyStoreError::Io(e)
    }
}

/// Reads `keyword value` pairs in a fixed order from a whitespace separated line
struct LineFields<'a> {
    tokens: std::str::SplitWhitespace<'a>,
    line: usize,
}

impl<'a> LineFields<'a> {
    fn err(&self, reason: String) -> KeyStoreError {
        KeyStoreError::Parse { line: self.line, reason }
    }

    fn value(&mut self, keyword: &'static str) -> Result<&'a str, KeyStoreError> {
        match (self.tokens.next(), self.tokens.next()) {
            (Some(k), Some(v)) if k == keyword => Ok(v),
            (Some(k), _) if k != keyword => Err(self.err(format!("expected '{}', found '{}'", keyword, k))),
            _ => Err(self.err(format!("missing value for '{}'", keyword))),
        }
    }

    fn num<T: core::str::FromStr>(&mut self, keyword: &'static str) -> Result<T, KeyStoreError> {
        let v = self.value(keyword)?;
        v.parse().map_err(|_| self.err(format!("invalid {} '{}'", keyword, v)))
    }

    fn finish(mut self) -> Result<(), KeyStoreError> {
        match self.tokens.next() {
            Some(t) => Err(self.err(format!("unexpected trailing '{}'", t))),
            None => Ok(()),
        }
    }
}

fn parse_key_hex(s: &str) -> Option<[u8; KEY_BYTES]> {
    if s.len() != 2 * KEY_BYTES || !s.is_ascii() {
        return None;
    }
    let mut key = [0u8; KEY_BYTES];
    for (i, b) in key.iter_mut().enumerate() {
        *b = u8::from_str_radix(&s[2 * i..2 * i + 2], 16).ok()?;
    }
    Some(key)
}

/// Networks and keys loaded from a key file.
///
/// One definition per line, `#` starts a comment line:
/// ```text
/// network mcc 123 mnc 456 ksg_type 1 security_class 2
/// key mcc 123 mnc 456 addr 0 key_type 1 key_num 2 key 1234deadbeefcafebabe
/// ```
#[derive(Debug, Default, Clone)]
pub struct KeyStore {
    networks: Vec<NetworkInfo>,
    keys: Vec<TetraKey>,
}

impl KeyStore {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, KeyStoreError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, KeyStoreError> {
        let mut store = KeyStore::default();
        // Keys are bound to their network after all lines are read
        let mut key_lines = Vec::new();

        for (i, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let kind = tokens.next().unwrap_or_default();
            let mut fields = LineFields { tokens, line: i + 1 };

            match kind {
                "network" => {
                    let mcc = fields.num("mcc")?;
                    let mnc = fields.num("mnc")?;
                    let ksg_type = KsgType::from_raw(fields.num("ksg_type")?);
                    let sc: u32 = fields.num("security_class")?;
                    let security_class = SecurityClass::try_from(sc)
                        .map_err(|_| fields.err(format!("invalid security_class {}", sc)))?;
                    fields.finish()?;

                    let net = NetworkInfo { mcc, mnc, ksg_type, security_class };
                    tracing::debug!("KeyStore: loaded network [{}]", net);
                    store.networks.push(net);
                }
                "key" => {
                    let mcc = fields.num("mcc")?;
                    let mnc = fields.num("mnc")?;
                    let addr = fields.num("addr")?;
                    let kt: u32 = fields.num("key_type")?;
                    let key_type = KeyType::try_from(kt)
                        .map_err(|_| fields.err(format!("invalid key_type {}", kt)))?;
                    let key_num = fields.num("key_num")?;
                    let hex = fields.value("key")?;
                    let key = parse_key_hex(hex)
                        .ok_or_else(|| fields.err(format!("key '{}' is not 20 hex digits", hex)))?;
                    fields.finish()?;

                    let index = store.keys.len();
                    store.keys.push(TetraKey {
                        index, mcc, mnc, key_type, key_num, addr, key,
                        ksg_type: KsgType::Unknown,
                    });
                    key_lines.push(i + 1);
                }
                other => {
                    return Err(fields.err(format!("unknown definition '{}'", other)));
                }
            }
        }

        for (key, line) in store.keys.iter_mut().zip(key_lines) {
            let Some(net) = store.networks.iter().find(|n| n.mcc == key.mcc && n.mnc == key.mnc) else {
                return Err(KeyStoreError::MissingNetwork { line, mcc: key.mcc, mnc: key.mnc });
            };
            key.ksg_type = net.ksg_type;
            tracing::debug!("KeyStore: loaded key [{}]", key);
        }

        Ok(store)
    }

    pub fn networks(&self) -> &[NetworkInfo] {
        &self.networks
    }

    pub fn keys(&self) -> &[TetraKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn find_network(&self, mcc: u16, mnc: u16) -> Option<&NetworkInfo> {
        self.networks.iter().find(|n| n.mcc == mcc && n.mnc == mnc)
    }

    /// First CCK/SCK of the given network with key number `cck_id`
    pub fn find_cck(&self, mcc: u16, mnc: u16, cck_id: u16) -> Option<&TetraKey> {
        self.keys.iter().find(|k| {
            k.mcc == mcc && k.mnc == mnc && k.key_type == KeyType::CckSck && k.key_num == cck_id as u32
        })
    }

    /// First key of the given network bound to the ISSI/GSSI `addr`. `key_types` is a
    /// mask of `KeyType` values, so `Dck as u32 | Mgck as u32` matches either.
    pub fn find_key_by_addr(&self, mcc: u16, mnc: u16, addr: u32, key_types: u32) -> Option<&TetraKey> {
        self.keys.iter().find(|k| {
            k.mcc == mcc && k.mnc == mnc && k.addr == addr && (k.key_type as u32 & key_types) != 0
        })
    }
}
