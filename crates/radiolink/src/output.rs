use std::fmt::Write as _;
use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use radiolink_frame::Packet;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
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

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EventOutput<'a> {
    Packet {
        payload_size: usize,
        payload_hex: String,
        timestamp: String,
    },
    LogLine {
        line: &'a str,
        timestamp: String,
    },
}

pub fn print_packet(packet: &Packet, format: OutputFormat) {
    let payload = packet.payload();
    match format {
        OutputFormat::Json => {
            let out = EventOutput::Packet {
                payload_size: payload.len(),
                payload_hex: to_hex(payload),
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    "packet".to_string(),
                    payload.len().to_string(),
                    to_hex(payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("packet size={} payload={}", payload.len(), to_hex(payload));
        }
        OutputFormat::Raw => print_raw(payload),
    }
}

pub fn print_log_line(line: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EventOutput::LogLine {
                line,
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table | OutputFormat::Pretty => println!("device | {line}"),
        // Raw stdout carries packet bytes only.
        OutputFormat::Raw => eprintln!("{line}"),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
