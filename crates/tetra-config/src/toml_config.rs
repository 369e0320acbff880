use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::receiver_config::{BitFormat, CfgCrypto, CfgInput, CfgVoice, ReceiverConfig};

/// Build `ReceiverConfig` from a TOML configuration file
pub fn from_toml_str(toml_str: &str) -> Result<ReceiverConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref input) = root.input {
        if !input.extra.is_empty() {
            return Err(format!("Unrecognized fields: input::{:?}", sorted_keys(&input.extra)).into());
        }
    }
    if let Some(ref crypto) = root.crypto {
        if !crypto.extra.is_empty() {
            return Err(format!("Unrecognized fields: crypto::{:?}", sorted_keys(&crypto.extra)).into());
        }
    }
    if let Some(ref voice) = root.voice {
        if !voice.extra.is_empty() {
            return Err(format!("Unrecognized fields: voice::{:?}", sorted_keys(&voice.extra)).into());
        }
    }

    let mut cfg = ReceiverConfig {
        debug_log: root.debug_log,
        ..Default::default()
    };
    if let Some(v) = root.verbose {
        cfg.verbose = v;
    }
    if let Some(v) = root.status_interval {
        cfg.status_interval = v;
    }

    if let Some(input) = root.input {
        apply_input_patch(&mut cfg.input, input);
    }
    if let Some(crypto) = root.crypto {
        cfg.crypto = CfgCrypto { keyfile: crypto.keyfile };
    }
    if let Some(voice) = root.voice {
        cfg.voice = CfgVoice { codec_out: voice.codec_out };
    }

    cfg.validate().map_err(|e| format!("Invalid receiver configuration: {}", e))?;
    Ok(cfg)
}

/// Build `ReceiverConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<ReceiverConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `ReceiverConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ReceiverConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

fn apply_input_patch(dst: &mut CfgInput, src: InputDto) {
    dst.path = src.path;
    if let Some(v) = src.format {
        dst.format = v;
    }
    if let Some(v) = src.chunk_size {
        dst.chunk_size = v;
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,
    verbose: Option<bool>,
    status_interval: Option<u32>,

    #[serde(default)]
    input: Option<InputDto>,

    #[serde(default)]
    crypto: Option<CryptoDto>,

    #[serde(default)]
    voice: Option<VoiceDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct InputDto {
    path: Option<String>,
    format: Option<BitFormat>,
    chunk_size: Option<usize>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct CryptoDto {
    keyfile: Option<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct VoiceDto {
    codec_out: Option<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}


#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
config_version = "0.1"
debug_log = "tetra-rx.log"
verbose = true
status_interval = 0

[input]
path = "capture.bits"
format = "Packed"

[crypto]
keyfile = "keys.txt"

[voice]
codec_out = "speech.out"
"#;

    #[test]
    fn test_full_config() {
        let cfg = from_toml_str(FULL).unwrap();
        assert_eq!(cfg.debug_log.as_deref(), Some("tetra-rx.log"));
        assert!(cfg.verbose);
        assert_eq!(cfg.status_interval, 0);
        assert_eq!(cfg.input.path.as_deref(), Some("capture.bits"));
        assert_eq!(cfg.input.format, BitFormat::Packed);
        assert_eq!(cfg.input.chunk_size, 4096);
        assert_eq!(cfg.crypto.keyfile.as_deref(), Some("keys.txt"));
        assert_eq!(cfg.voice.codec_out.as_deref(), Some("speech.out"));
    }

    #[test]
    fn test_defaults() {
        let cfg = from_toml_str("config_version = \"0.1\"").unwrap();
        assert!(cfg.input.path.is_none());
        assert_eq!(cfg.input.format, BitFormat::Unpacked);
        assert_eq!(cfg.status_interval, 72);
        assert!(cfg.crypto.keyfile.is_none());
    }

    #[test]
    fn test_rejected() {
        assert!(from_toml_str("config_version = \"0.5\"").is_err());
        assert!(from_toml_str("config_version = \"0.1\"\nstack_mode = \"Bs\"").is_err());
        assert!(from_toml_str("config_version = \"0.1\"\n[input]\nfile = \"x\"").is_err());
        assert!(from_toml_str("config_version = \"0.1\"\n[input]\nchunk_size = 0").is_err());
        assert!(from_toml_str("config_version = \"0.1\"\n[input]\nformat = \"Hex\"").is_err());
    }
}
