use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use meshlink_bridge::TextMessage;
use meshlink_proto::node_id;
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

/// A message built by `encode`.
#[derive(Serialize, Debug)]
pub struct EncodedOutput {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet_id: Option<u32>,
    pub size: usize,
    pub hex: String,
}

/// One decoded item of a serial capture.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DecodedRow {
    pub frame: usize,
    pub kind: &'static str,
    pub detail: String,
}

#[derive(Serialize)]
pub struct SendOutput {
    pub packet_id: u32,
    pub destination: String,
    pub channel: u8,
    /// `None` when the ack was not awaited.
    pub delivered: Option<bool>,
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    from: String,
    to: String,
    channel: u8,
    packet_id: u32,
    text: &'a str,
    timestamp: String,
}

pub fn print_encoded(out: &EncodedOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let packet_id = out.packet_id.map(|id| format!("{id:#010x}")).unwrap_or_default();
            print_table(
                vec!["KIND", "PACKET ID", "SIZE", "HEX"],
                vec![vec![
                    out.kind.to_string(),
                    packet_id,
                    out.size.to_string(),
                    out.hex.clone(),
                ]],
            );
        }
        OutputFormat::Pretty => println!("{}", out.hex),
    }
}

pub fn print_decoded(rows: &[DecodedRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => rows.iter().for_each(print_json),
        OutputFormat::Table => print_table(
            vec!["FRAME", "KIND", "DETAIL"],
            rows.iter()
                .map(|row| vec![row.frame.to_string(), row.kind.to_string(), row.detail.clone()])
                .collect(),
        ),
        OutputFormat::Pretty => {
            for row in rows {
                println!("frame={} {} {}", row.frame, row.kind, row.detail);
            }
        }
    }
}

pub fn print_send(out: &SendOutput, format: OutputFormat) {
    let delivered = match out.delivered {
        Some(true) => "delivered",
        Some(false) => "failed",
        None => "sent",
    };
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => print_table(
            vec!["PACKET ID", "DESTINATION", "CHANNEL", "RESULT"],
            vec![vec![
                format!("{:#010x}", out.packet_id),
                out.destination.clone(),
                out.channel.to_string(),
                delivered.to_string(),
            ]],
        ),
        OutputFormat::Pretty => println!(
            "packet_id={:#010x} to={} channel={} result={delivered}",
            out.packet_id, out.destination, out.channel
        ),
    }
}

pub fn print_message(message: &TextMessage, format: OutputFormat) {
    let out = MessageOutput {
        from: node_id(message.from),
        to: destination_name(message.to),
        channel: message.channel,
        packet_id: message.packet_id,
        text: &message.text,
        timestamp: now_unix_seconds(),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(
            vec!["FROM", "TO", "CHANNEL", "TEXT"],
            vec![vec![out.from, out.to, out.channel.to_string(), out.text.to_string()]],
        ),
        OutputFormat::Pretty => println!(
            "from={} to={} channel={} text={}",
            out.from, out.to, out.channel, out.text
        ),
    }
}

/// `broadcast` or the `!xxxxxxxx` node id.
pub fn destination_name(node: u32) -> String {
    if node == meshlink_proto::BROADCAST_ADDR {
        "broadcast".to_string()
    } else {
        node_id(node)
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn print_table(header: Vec<&str>, rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
