//! Contract Spec Command-Line Interface
//!
//! Reads a contract spec section (raw XDR, base64, hex, or a compiled wasm
//! module) and prints what it declares as JSON.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn, Level};

use lib_contract_spec::{
    decode_with_deadline, load_spec_bytes, DecoderConfig, EntryKind, SpecDecoder, SpecSource,
    TracingObserver, Truncation,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "contract-spec")]
struct Cli {
    /// Decoder configuration file (TOML)
    #[arg(short, long, env = "CONTRACT_SPEC_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, env = "CONTRACT_SPEC_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the function signatures
    Functions {
        #[command(flatten)]
        input: InputArgs,

        /// Give up after this many milliseconds
        #[arg(long)]
        deadline_ms: Option<u64>,
    },
    /// Print every definition plus the interface fingerprint
    Interface {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print record offsets, lengths and kinds
    Entries {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input file, or `-` for stdin
    path: PathBuf,

    /// Input encoding: auto, raw, base64, hex or wasm
    #[arg(short, long, default_value = "auto")]
    source: SpecSource,
}

#[derive(Serialize)]
struct EntryRow {
    offset: usize,
    length: usize,
    kind: EntryKind,
}

#[derive(Serialize)]
struct EntriesReport {
    entries: Vec<EntryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    truncation: Option<Truncation>,
}

fn init_tracing(verbose: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read stdin")?;
        return Ok(bytes);
    }
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_section(input: &InputArgs, config: &DecoderConfig) -> Result<Vec<u8>> {
    let raw = read_input(&input.path)?;
    let bytes = load_spec_bytes(&raw, input.source, &config.section_name)?;
    info!(
        "Loaded {} spec bytes from {} ({})",
        bytes.len(),
        input.path.display(),
        input.source
    );
    Ok(bytes)
}

fn report_truncation(truncation: Option<&Truncation>) {
    if let Some(t) = truncation {
        warn!(
            "Spec section truncated at offset {}: {} trailing bytes discarded",
            t.offset, t.discarded
        );
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;
    let result = runtime.block_on(run(cli));
    // A decode abandoned at its deadline keeps its blocking worker busy;
    // dropping the runtime would wait for it.
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => DecoderConfig::load(path)?,
        None => DecoderConfig::default(),
    };
    let decoder = SpecDecoder::new(config.clone())?.with_observer(Arc::new(TracingObserver));

    match cli.command {
        Command::Functions { input, deadline_ms } => {
            let bytes = load_section(&input, &config)?;
            let outcome = match deadline_ms {
                Some(ms) => {
                    decode_with_deadline(Arc::new(decoder), bytes, Duration::from_millis(ms))
                        .await?
                }
                None => decoder.decode(&bytes)?,
            };
            report_truncation(outcome.truncation.as_ref());
            print_json(&outcome.signatures)
        }
        Command::Interface { input } => {
            let bytes = load_section(&input, &config)?;
            let outcome = decoder.decode_interface(&bytes)?;
            report_truncation(outcome.truncation.as_ref());
            let fingerprint = outcome.interface.fingerprint_hex()?;
            info!("Interface fingerprint: {}", fingerprint);
            print_json(&serde_json::json!({
                "fingerprint": fingerprint,
                "interface": outcome.interface,
            }))
        }
        Command::Entries { input } => {
            let bytes = load_section(&input, &config)?;
            let scan = decoder.decode_records(&bytes);
            report_truncation(scan.truncation.as_ref());
            let report = EntriesReport {
                entries: scan
                    .records
                    .iter()
                    .map(|record| EntryRow {
                        offset: record.offset,
                        length: record.length,
                        kind: record.kind(),
                    })
                    .collect(),
                truncation: scan.truncation,
            };
            print_json(&report)
        }
    }
}
