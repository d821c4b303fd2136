//! Monitor CLI.
//!
//! This binary maps the platform register window and serves the monitor
//! protocol over stdin/stdout. It performs:
//! 1. **Configuration:** Built-in defaults, optional JSON config file, and
//!    flag overrides for the register base and device file.
//! 2. **Bridge setup:** Opens the mmap-backed register bridge.
//! 3. **Session:** Runs the command loop until the host closes its end.

use std::io::{self, Read};
use std::{fs, process};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hostlink_core::bus::MmapBus;
use hostlink_core::{Monitor, MonitorConfig};

#[derive(Parser, Debug)]
#[command(
    name = "hostlink",
    author,
    version,
    about = "Monitor for a memory-mapped hardware core",
    long_about = "Serve the monitor line protocol over stdin/stdout against a hardware core\n\
                  exposed through a fixed register block.\n\n\
                  Examples:\n  hostlink\n  hostlink --base 0x43c10000\n  hostlink --config board.json"
)]
struct Cli {
    /// Physical base address of the register block (hex, e.g. 0x43c00000).
    #[arg(short, long, value_parser = parse_hex_arg)]
    base: Option<u64>,

    /// Device file exposing physical memory.
    #[arg(short, long)]
    device: Option<String>,

    /// JSON config file; flags override its values.
    #[arg(short, long)]
    config: Option<String>,
}

/// Accepts `0x`-prefixed or bare hex.
fn parse_hex_arg(text: &str) -> Result<u64, String> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex address '{text}': {e}"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => load_config(&path),
        None => MonitorConfig::default(),
    };
    if let Some(base) = cli.base {
        config.reg_base = base;
    }
    if let Some(device) = cli.device {
        config.device = device;
    }

    let bus = match MmapBus::new(&config.device, config.reg_base) {
        Ok(bus) => bus,
        Err(e) => {
            eprintln!("\n[!] FATAL: {e}");
            process::exit(1);
        }
    };

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut monitor = Monitor::new(bus, config, stdin, stdout);
    if let Err(e) = monitor.serve() {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

/// Reads and parses the JSON config file; exits with an error message on failure.
fn load_config(path: &str) -> MonitorConfig {
    let mut text = String::new();
    let result = fs::File::open(path).and_then(|mut f| f.read_to_string(&mut text));
    if let Err(e) = result {
        eprintln!("Error reading config {path}: {e}");
        process::exit(1);
    }
    match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error parsing config {path}: {e}");
            process::exit(1);
        }
    }
}
