use clap::Parser;

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tetra_config::{BitFormat, ReceiverConfig, toml_config};
use tetra_core::debug;
use tetra_entities::crypto::{KeyStore, NoCiphers};
use tetra_entities::{Receiver, RxEvent};
use tetra_saps::tmd::TmdCircuitDataInd;

/// Load configuration file, or defaults if none was given
fn load_config(cfg_path: Option<&str>) -> ReceiverConfig {
    let Some(cfg_path) = cfg_path else {
        return ReceiverConfig::default();
    };
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

fn parse_format(s: &str) -> Result<BitFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "unpacked" => Ok(BitFormat::Unpacked),
        "packed" => Ok(BitFormat::Packed),
        "ascii" => Ok(BitFormat::Ascii),
        _ => Err(format!("unknown bit format {}, expect unpacked, packed or ascii", s)),
    }
}

/// Converts raw input bytes into one bit per byte
fn unpack_bits(format: BitFormat, raw: &[u8], out: &mut Vec<u8>) {
    out.clear();
    match format {
        BitFormat::Unpacked => out.extend(raw.iter().map(|b| b & 1)),
        BitFormat::Packed => {
            for byte in raw {
                out.extend((0..8).rev().map(|i| (byte >> i) & 1));
            }
        }
        BitFormat::Ascii => out.extend(raw.iter().filter_map(|c| match c {
            b'0' => Some(0),
            b'1' => Some(1),
            _ => None,
        })),
    }
}

/// Appends a speech frame to the codec output as little endian i16 values
fn write_codec_frame(out: &mut impl Write, prim: &TmdCircuitDataInd) -> io::Result<()> {
    for v in &prim.data {
        out.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn build_receiver(cfg: &ReceiverConfig) -> Result<Receiver, Box<dyn std::error::Error>> {
    let Some(keyfile) = &cfg.crypto.keyfile else {
        return Ok(Receiver::default());
    };
    let keystore = KeyStore::load(keyfile)?;
    tracing::info!("Loaded {} networks and {} keys from {}", keystore.networks().len(), keystore.keys().len(), keyfile);
    // TB5 and TEA primitives are not built in. Encrypted traffic is reported but stays undecoded.
    Ok(Receiver::with_keys(Arc::new(keystore), Box::new(NoCiphers)))
}

fn run(cfg: &ReceiverConfig, running: Arc<AtomicBool>) -> Result<(), Box<dyn std::error::Error>> {
    let mut rx = build_receiver(cfg)?;

    let mut input: Box<dyn Read> = match &cfg.input.path {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };
    let mut codec_out = match &cfg.voice.codec_out {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let mut raw = vec![0u8; cfg.input.chunk_size];
    let mut bits = Vec::with_capacity(cfg.input.chunk_size * 8);
    let mut next_status = cfg.status_interval as u64;
    let mut frames_written = 0u64;

    while running.load(Ordering::SeqCst) {
        let n = match input.read(&mut raw) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        unpack_bits(cfg.input.format, &raw[..n], &mut bits);

        for ev in rx.rx_bits(&bits) {
            match ev {
                RxEvent::Sync(sync) => {
                    tracing::info!(ts = %rx.time(), "Locked to MCC {} MNC {} CC {}", sync.mcc, sync.mnc, sync.colour_code);
                }
                RxEvent::Sdu(sdu) => {
                    tracing::info!(ts = %sdu.time, "{} ep {}: {}", sdu.main_address, sdu.endpoint_id, sdu.content);
                }
                RxEvent::Voice(prim) => {
                    if let Some(out) = codec_out.as_mut() {
                        write_codec_frame(out, &prim)?;
                        frames_written += 1;
                    }
                }
                RxEvent::LockLost => {
                    tracing::info!("Searching for SYNC");
                }
            }
        }

        if cfg.status_interval > 0 && rx.slots_received() >= next_status {
            tracing::info!(ts = %rx.time(), "{}", rx.status());
            next_status = rx.slots_received() + cfg.status_interval as u64;
        }
    }

    if let Some(mut out) = codec_out {
        out.flush()?;
    }
    tracing::info!(
        "Done: {} slots received, {} SDUs, {} speech frames written",
        rx.slots_received(),
        rx.llc().rx_count(),
        frames_written
    );
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "TETRA downlink receiver",
    long_about = "Decodes a demodulated TETRA downlink bit stream and logs the cell state and the PDUs it carries"
)]
struct Args {
    /// Config file (optional)
    #[arg(help = "TOML config with input, key file and output settings")]
    config: Option<String>,

    /// Input file, overrides the config. Use - for stdin.
    #[arg(short, long)]
    input: Option<String>,

    /// Bit format of the input: unpacked, packed or ascii
    #[arg(short, long, value_parser = parse_format)]
    format: Option<BitFormat>,

    /// Key file, overrides the config
    #[arg(short, long)]
    keyfile: Option<String>,

    /// Write speech frames for an external ACELP decoder here
    #[arg(short, long)]
    codec_out: Option<String>,

    /// Also log per-PDU decoding details
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    let mut cfg = load_config(args.config.as_deref());

    if let Some(input) = args.input {
        cfg.input.path = if input == "-" { None } else { Some(input) };
    }
    if let Some(format) = args.format {
        cfg.input.format = format;
    }
    if args.keyfile.is_some() {
        cfg.crypto.keyfile = args.keyfile;
    }
    if args.codec_out.is_some() {
        cfg.voice.codec_out = args.codec_out;
    }
    cfg.verbose |= args.verbose;
    if let Err(e) = cfg.validate() {
        println!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let level = if cfg.verbose { Some("debug") } else { None };
    let _log_guard = match debug::setup_logging_with_level(level, cfg.debug_log.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            println!("Failed to set up logging: {}", e);
            std::process::exit(1);
        }
    };

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        tracing::warn!("Failed to set Ctrl+C handler: {}", e);
    }

    if let Err(e) = run(&cfg, running) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
