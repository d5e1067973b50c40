use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use meshlink_proto::BROADCAST_ADDR;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod listen;
pub mod radio;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a framed ToRadio message and print it as hex.
    Encode(EncodeArgs),
    /// Decode a hex dump of serial traffic.
    Decode(DecodeArgs),
    /// Send one text message through a radio and wait for its ack.
    Send(SendArgs),
    /// Print text messages received by a radio.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Packet id to use instead of a random one.
    #[arg(long, value_parser = parse_u32)]
    pub id: Option<u32>,
    #[command(subcommand)]
    pub kind: EncodeKind,
}

#[derive(Subcommand, Debug)]
pub enum EncodeKind {
    /// Text message packet.
    Text {
        message: String,
        /// Destination node (`!a1b2c3d4`, `0x...`, decimal or `broadcast`).
        #[arg(long, value_parser = parse_node)]
        to: Option<u32>,
        #[arg(long)]
        channel: Option<u8>,
    },
    /// Configuration request.
    WantConfig {
        #[arg(long, value_parser = parse_u32)]
        nonce: Option<u32>,
    },
    /// Node info broadcast.
    Nodeinfo {
        /// Local node number.
        #[arg(long, value_parser = parse_node)]
        node: u32,
        #[arg(long)]
        long_name: String,
        #[arg(long)]
        short_name: String,
    },
    /// Admin reboot directive addressed to the local node.
    Reboot {
        #[arg(long, value_parser = parse_node)]
        node: u32,
        #[arg(long, default_value_t = 2)]
        seconds: u32,
    },
    /// The 32-byte wake sequence.
    Wake,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    /// Bytes written by the radio.
    FromRadio,
    /// Bytes written by the host.
    ToRadio,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded serial bytes. Whitespace, `:` and `-` separators are ignored.
    #[arg(conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read the hex dump from a file (`-` for stdin).
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
    /// Which side of the link produced the bytes.
    #[arg(long, value_enum, default_value = "from-radio")]
    pub direction: Direction,
}

/// Serial device and bridge settings shared by commands that talk to a radio.
#[derive(Args, Debug)]
pub struct RadioArgs {
    /// Serial device of the radio (e.g. /dev/ttyUSB0).
    pub device: PathBuf,
    /// Serial speed.
    #[arg(long, default_value_t = 115_200)]
    pub baud: u32,
    /// Bridge configuration file (JSON).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Give up if the radio is not ready after this long (e.g. 45s, 500ms).
    #[arg(long, default_value = "45s", value_parser = parse_duration)]
    pub ready_timeout: Duration,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub radio: RadioArgs,
    /// Text to send.
    #[arg(long, short = 'm')]
    pub message: String,
    /// Destination node. Defaults to the configured destination.
    #[arg(long, value_parser = parse_node)]
    pub to: Option<u32>,
    /// Channel index. Defaults to the configured channel.
    #[arg(long, short = 'c')]
    pub channel: Option<u8>,
    /// Return once the message is handed to the radio.
    #[arg(long)]
    pub no_ack: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub radio: RadioArgs,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Log the radio's full configuration once it is ready.
    #[arg(long)]
    pub dump_config: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Decimal or `0x`-prefixed hex.
pub fn parse_u32(input: &str) -> Result<u32, String> {
    let input = input.trim();
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid number: {input}"))
}

/// A node number: `!a1b2c3d4`, `broadcast`, or anything [`parse_u32`] takes.
pub fn parse_node(input: &str) -> Result<u32, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("broadcast") || input == "^all" {
        return Ok(BROADCAST_ADDR);
    }
    match input.strip_prefix('!') {
        Some(hex) => u32::from_str_radix(hex, 16).map_err(|_| format!("invalid node id: {input}")),
        None => parse_u32(input),
    }
}

pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
