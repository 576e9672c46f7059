use std::io::IsTerminal;
use std::net::SocketAddr;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lumen_protocol::{discriminator_name, ControllerMessage, MessageKind};
use lumen_runner::{AppliedEffect, RunReport};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

#[derive(Serialize)]
struct MessageOutput {
    kind: &'static str,
    timestamp_ms: i64,
    from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pixels: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_pixel: Option<String>,
}

impl MessageOutput {
    fn new(message: &ControllerMessage, from: SocketAddr) -> Self {
        let mut out = MessageOutput {
            kind: discriminator_name(message.kind.discriminator()),
            timestamp_ms: message.timestamp.as_millis(),
            from: from.to_string(),
            duration_ms: None,
            pixels: None,
            first_pixel: None,
        };
        match &message.kind {
            MessageKind::Empty => {}
            MessageKind::KeepAlive { duration_ms } => out.duration_ms = Some(*duration_ms),
            MessageKind::LedState { pixels } => {
                out.pixels = Some(pixels.len());
                out.first_pixel = pixels.first().map(ToString::to_string);
            }
        }
        out
    }

    fn detail(&self) -> String {
        match (self.duration_ms, self.pixels) {
            (Some(ms), _) => format!("valid {ms}ms"),
            (_, Some(n)) => format!(
                "{n} pixels, first {}",
                self.first_pixel.as_deref().unwrap_or("-")
            ),
            _ => "-".to_string(),
        }
    }
}

pub fn print_message(message: &ControllerMessage, from: SocketAddr, format: OutputFormat) {
    let out = MessageOutput::new(message, from);
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = table(vec!["KIND", "TIMESTAMP", "FROM", "DETAIL"]);
            table.add_row(vec![
                out.kind.to_string(),
                out.timestamp_ms.to_string(),
                out.from.clone(),
                out.detail(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "kind={} ts={} from={} {}",
                out.kind,
                out.timestamp_ms,
                out.from,
                out.detail()
            );
        }
    }
}

#[derive(Serialize)]
struct SentOutput {
    kind: &'static str,
    bytes: usize,
    remote: String,
}

pub fn print_sent(message: &ControllerMessage, bytes: usize, remote: SocketAddr, format: OutputFormat) {
    let out = SentOutput {
        kind: discriminator_name(message.kind.discriminator()),
        bytes,
        remote: remote.to_string(),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = table(vec!["KIND", "BYTES", "REMOTE"]);
            table.add_row(vec![out.kind.to_string(), bytes.to_string(), out.remote]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("sent {} ({} bytes) to {}", out.kind, bytes, out.remote),
    }
}

/// One display row of `lumen displays`.
#[derive(Serialize)]
pub struct DisplayRow {
    pub adapter: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Highest valid detail level, when any exists.
    pub max_detail_level: Option<u32>,
}

pub fn print_displays(rows: &[DisplayRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = table(vec!["ADAPTER", "DISPLAY", "RESOLUTION", "DETAIL LEVELS"]);
            for row in rows {
                table.add_row(vec![
                    row.adapter.clone(),
                    row.name.clone(),
                    format!("{}x{}", row.width, row.height),
                    detail_range(row.max_detail_level),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!(
                    "{}: {} {}x{} detail {}",
                    row.adapter,
                    row.name,
                    row.width,
                    row.height,
                    detail_range(row.max_detail_level)
                );
            }
        }
    }
}

fn detail_range(max: Option<u32>) -> String {
    max.map(|max| format!("0..={max}"))
        .unwrap_or_else(|| "-".to_string())
}

#[derive(Serialize)]
struct RunOutput {
    effect: String,
    fell_back: bool,
    frames_sent: u64,
    frames_skipped: u64,
    frames_dropped: u64,
    keepalives_sent: u64,
}

pub fn print_run_summary(applied: &AppliedEffect, report: &RunReport, format: OutputFormat) {
    let out = RunOutput {
        effect: applied.running.to_string(),
        fell_back: applied.fell_back,
        frames_sent: report.frames_sent,
        frames_skipped: report.frames_skipped,
        frames_dropped: report.frames_dropped,
        keepalives_sent: report.keepalives_sent,
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = table(vec!["EFFECT", "FRAMES", "SKIPPED", "DROPPED", "KEEPALIVES"]);
            table.add_row(vec![
                out.effect.clone(),
                out.frames_sent.to_string(),
                out.frames_skipped.to_string(),
                out.frames_dropped.to_string(),
                out.keepalives_sent.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "effect={} fell_back={} frames={} skipped={} dropped={} keepalives={}",
            out.effect,
            out.fell_back,
            out.frames_sent,
            out.frames_skipped,
            out.frames_dropped,
            out.keepalives_sent
        ),
    }
}
