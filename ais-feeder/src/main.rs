//! ais: Decode AIS NMEA sentences from files, stdin, or a TCP feed.
//!
//! Decoded messages go to stdout, one per line (JSON or debug format).
//! Logs and the optional summary table go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ais_core::config::{self, Config, OutputFormat};
use ais_core::{
    AisError, DecodeStats, DecodedMsg, MessageHandler, MessageType, NmeaDecoder, StopSignal,
};

mod capture;
mod tcp;

use capture::{LineReader, LineSource};

#[derive(Parser)]
#[command(name = "ais", version, about = "AIS NMEA decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a file of NMEA sentences
    Decode {
        /// Path to NMEA file (use - for stdin)
        file: PathBuf,

        /// Output format: json or debug
        #[arg(short, long)]
        format: Option<String>,

        /// Print a per-type summary when the input ends
        #[arg(short, long)]
        summary: bool,
    },
    /// Connect to a TCP NMEA feed and decode until interrupted
    Listen {
        /// Feed host (defaults to the configured one)
        #[arg(long, env = "AIS_FEED_HOST")]
        host: Option<String>,

        /// Feed port (defaults to the configured one)
        #[arg(short, long, env = "AIS_FEED_PORT")]
        port: Option<u16>,

        /// Output format: json or debug
        #[arg(short, long)]
        format: Option<String>,

        /// Print a per-type summary on exit
        #[arg(short, long)]
        summary: bool,
    },
    /// Show or initialise the configuration file
    Config {
        /// Write the current settings to the config file
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config();

    match cli.command {
        Commands::Decode {
            file,
            format,
            summary,
        } => {
            let format = resolve_format(format.as_deref(), &config);
            cmd_decode(file, format, summary || config.output.summary);
        }
        Commands::Listen {
            host,
            port,
            format,
            summary,
        } => {
            let format = resolve_format(format.as_deref(), &config);
            let host = host.unwrap_or_else(|| config.feed.host.clone());
            let port = port.unwrap_or(config.feed.port);
            cmd_listen(
                &host,
                port,
                &config,
                format,
                summary || config.output.summary,
            );
        }
        Commands::Config { init } => cmd_config(&config, init),
    }
}

fn resolve_format(flag: Option<&str>, config: &Config) -> OutputFormat {
    match flag {
        None => config.output.format,
        Some(s) => s.parse().unwrap_or_else(|e: AisError| {
            error!(error = %e, "bad --format");
            std::process::exit(2);
        }),
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        error!(error = %e, "failed to start runtime");
        std::process::exit(1);
    })
}

fn cmd_decode(file: PathBuf, format: OutputFormat, summary: bool) {
    let source = LineSource::from_arg(&file);
    let mut reader = LineReader::open(&source).unwrap_or_else(|e| {
        error!(source = %source.describe(), error = %e, "cannot open input");
        std::process::exit(1);
    });

    let stop = StopSignal::new();
    let rt = runtime();
    let ctrl_c_stop = stop.clone();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, finishing current line");
            ctrl_c_stop.request_stop();
        }
    });

    info!(source = %source.describe(), "decoding");
    let mut decoder = NmeaDecoder::new();
    let mut printer = Printer::new(format, stop.clone());
    decoder.run(reader.by_ref(), &stop, &mut printer);
    info!(
        source = %source.describe(),
        raw_lines = reader.lines_read(),
        "input read"
    );

    finish(decoder.stats(), summary);
}

fn cmd_listen(host: &str, port: u16, config: &Config, format: OutputFormat, summary: bool) {
    let feed = tcp::FeedConfig::new(
        host,
        port,
        Duration::from_secs(config.feed.reconnect_delay_secs),
    );
    let cancel = CancellationToken::new();
    let rt = runtime();

    let ctrl_c_cancel = cancel.clone();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, closing feed");
            ctrl_c_cancel.cancel();
        }
    });

    info!(feed = %config.feed.name, address = %feed.address, "listening");
    let mut decoder = NmeaDecoder::new();
    let stop = StopSignal::new();
    let mut printer = Printer::new(format, stop.clone());
    let mut handler = |msg: DecodedMsg| {
        printer.on_message(msg);
        if stop.is_stopped() {
            cancel.cancel();
        }
    };

    let connections = rt.block_on(tcp::run_feed(&feed, &mut decoder, &cancel, &mut handler));
    info!(connections, "feed closed");

    finish(decoder.stats(), summary);
}

fn cmd_config(config: &Config, init: bool) {
    if init {
        match config::save_config(config) {
            Ok(path) => println!("Wrote {}", path.display()),
            Err(e) => {
                error!(error = %e, "cannot write config");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Config file: {}", config::config_file().display());
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("feed.name"), Cell::new(&config.feed.name)]);
    table.add_row(vec![Cell::new("feed.host"), Cell::new(&config.feed.host)]);
    table.add_row(vec![Cell::new("feed.port"), Cell::new(config.feed.port)]);
    table.add_row(vec![
        Cell::new("feed.reconnect_delay_secs"),
        Cell::new(config.feed.reconnect_delay_secs),
    ]);
    table.add_row(vec![
        Cell::new("output.format"),
        Cell::new(config.output.format.as_str()),
    ]);
    table.add_row(vec![
        Cell::new("output.summary"),
        Cell::new(config.output.summary),
    ]);
    println!("{table}");
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Writes decoded messages to stdout. A closed stdout (e.g. `| head`)
/// raises `stop` so the reader winds down.
struct Printer {
    format: OutputFormat,
    stop: StopSignal,
}

impl Printer {
    fn new(format: OutputFormat, stop: StopSignal) -> Self {
        Printer { format, stop }
    }
}

impl MessageHandler for Printer {
    fn on_message(&mut self, msg: DecodedMsg) {
        if self.stop.is_stopped() {
            return;
        }

        let line = match self.format {
            OutputFormat::Json => match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "cannot serialize message");
                    return;
                }
            },
            OutputFormat::Debug => format!("{msg:?}"),
        };

        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}") {
            if e.kind() != io::ErrorKind::BrokenPipe {
                error!(error = %e, "write to stdout failed");
            }
            self.stop.request_stop();
        }
    }
}

fn finish(stats: &DecodeStats, summary: bool) {
    info!(
        lines = stats.lines,
        decoded = stats.decoded,
        errors = stats.total_errors(),
        pending_fragments = stats.pending_fragments,
        "done"
    );
    if summary {
        print_summary(stats);
    }
}

fn print_summary(stats: &DecodeStats) {
    let mut table = Table::new();
    table.set_header(vec!["Type", "Name", "Count"]);
    for (&code, &count) in &stats.by_type {
        let name = MessageType::from_code(code).map_or("Unknown", |t| t.name());
        table.add_row(vec![Cell::new(code), Cell::new(name), Cell::new(count)]);
    }
    eprintln!("{table}");

    if !stats.errors.is_empty() {
        let mut errors = Table::new();
        errors.set_header(vec!["Error", "Count"]);
        for (&kind, &count) in &stats.errors {
            errors.add_row(vec![Cell::new(kind), Cell::new(count)]);
        }
        eprintln!("{errors}");
    }

    eprintln!(
        "{} lines, {} messages decoded, {} errors, {} incomplete fragment sets discarded",
        stats.lines,
        stats.decoded,
        stats.total_errors(),
        stats.discarded_fragments
    );
}
