use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use lumen_runner::EffectKind;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod displays;
pub mod listen;
pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream the configured effect to the controller.
    Run(RunArgs),
    /// Act as a controller and print received messages.
    Listen(ListenArgs),
    /// Send a single message.
    Send(SendArgs),
    /// List capture adapters and displays.
    Displays(DisplaysArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, config: Option<PathBuf>, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, config_path(config)?, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Displays(args) => displays::run(args, config_path(config)?, format),
        Command::Version(args) => version::run(args),
    }
}

fn config_path(explicit: Option<PathBuf>) -> CliResult<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => crate::settings::default_config_path(),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Effect to run instead of the configured one.
    #[arg(long, value_parser = parse_effect_kind)]
    pub effect: Option<EffectKind>,
    /// Stop after this long (e.g. 30s, 500ms). Default: until Ctrl-C.
    #[arg(long)]
    pub duration: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Local address to bind (e.g. 0.0.0.0:34254).
    pub bind: String,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Controller endpoint as host:port.
    pub target: String,
    #[command(subcommand)]
    pub message: SendMessage,
}

#[derive(Subcommand, Debug)]
pub enum SendMessage {
    /// Send a keepalive.
    Keepalive {
        /// Advertised liveness window in milliseconds.
        #[arg(long, default_value_t = 1000)]
        duration_ms: u32,
    },
    /// Send a single-color LED state.
    Solid {
        /// Color as RRGGBB.
        #[arg(long)]
        color: String,
        /// Number of pixels.
        #[arg(long)]
        pixels: usize,
    },
}

#[derive(Args, Debug, Default)]
pub struct DisplaysArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_effect_kind(input: &str) -> Result<EffectKind, String> {
    input.parse()
}

pub(crate) fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed to start async runtime", err))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('m') {
        (num, "m")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "ms" => Duration::from_millis(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        _ => Duration::from_secs(value),
    })
}
