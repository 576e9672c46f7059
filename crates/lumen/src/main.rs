mod cmd;
mod exit;
mod logging;
mod output;
mod settings;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "lumen", version, about = "Perimeter LED strip driver")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Settings file.
    #[arg(long, value_name = "PATH", env = "LUMEN_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, cli.config, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_solid() {
        let cli = Cli::try_parse_from([
            "lumen",
            "send",
            "127.0.0.1:34254",
            "solid",
            "--color",
            "ff0000",
            "--pixels",
            "120",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn parses_run_with_effect_and_duration() {
        let cli = Cli::try_parse_from([
            "lumen",
            "--config",
            "/tmp/lumen.json",
            "run",
            "--effect",
            "calibration",
            "--duration",
            "2s",
        ])
        .expect("run args should parse");
        assert!(matches!(cli.command, Command::Run(_)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/lumen.json")));
    }

    #[test]
    fn rejects_unknown_effect() {
        let err = Cli::try_parse_from(["lumen", "run", "--effect", "rainbow"])
            .expect_err("unknown effect should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
