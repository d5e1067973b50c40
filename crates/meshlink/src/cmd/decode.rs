use std::fs;
use std::io::Read;

use meshlink_frame::SerialFramer;
use meshlink_proto::describe::{
    describe_channel, describe_config, describe_module_config, ConfigSection,
};
use meshlink_proto::{node_id, parse_from_radio, portnum, FromRadioEvent, MeshPacket, ToRadio};
use tracing::debug;

use crate::cmd::{DecodeArgs, Direction};
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{destination_name, print_decoded, DecodedRow, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let text = read_input(&args)?;
    let wire = parse_hex(&text)?;
    let rows = decode_capture(&wire, args.direction);
    if rows.is_empty() {
        return Err(CliError::new(DATA_INVALID, "no frames found in input"));
    }
    print_decoded(&rows, format);
    Ok(SUCCESS)
}

fn read_input(args: &DecodeArgs) -> CliResult<String> {
    if let Some(hex) = &args.hex {
        return Ok(hex.clone());
    }
    match &args.file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(text)
        }
    }
}

/// Hex digits with whitespace, `:` and `-` separators and an optional `0x` prefix.
fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();
    hex::decode(&digits).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}

pub fn decode_capture(wire: &[u8], direction: Direction) -> Vec<DecodedRow> {
    let mut framer = SerialFramer::new();
    let mut rows = Vec::new();
    let mut index = 0;
    framer.push_slice(wire, |frame| {
        match direction {
            Direction::FromRadio => rows.extend(from_radio_rows(index, frame)),
            Direction::ToRadio => rows.push(to_radio_row(index, frame)),
        }
        index += 1;
    });

    let stats = framer.stats();
    debug!(
        frames = stats.frames,
        discarded = stats.discarded_bytes,
        rejected = stats.rejected_lengths,
        "capture decoded"
    );
    rows
}

fn from_radio_rows(frame: usize, payload: &[u8]) -> Vec<DecodedRow> {
    let parsed = parse_from_radio(payload);
    let mut rows = Vec::new();
    for event in parsed.events {
        let (kind, detail) = match event {
            FromRadioEvent::Id(id) => ("id", id.to_string()),
            FromRadioEvent::Packet(packet) => ("packet", describe_packet(&packet)),
            FromRadioEvent::MyInfo { node_num } => ("my_info", format!("node={}", node_id(node_num))),
            FromRadioEvent::NodeInfo { num, user } => {
                let names = user
                    .map(|user| format!(" long_name={:?} short_name={:?}", user.long_name, user.short_name))
                    .unwrap_or_default();
                ("node_info", format!("node={}{names}", node_id(num)))
            }
            FromRadioEvent::Config(body) => ("config", describe_sections(&describe_config(&body))),
            FromRadioEvent::ModuleConfig(body) => {
                ("module_config", describe_sections(&describe_module_config(&body)))
            }
            FromRadioEvent::Channel(body) => {
                ("channel", describe_sections(&[describe_channel(&body)]))
            }
            FromRadioEvent::ConfigComplete(id) => ("config_complete", format!("nonce={id:#x}")),
            FromRadioEvent::Rebooted(flag) => ("rebooted", flag.to_string()),
            FromRadioEvent::QueueStatus { res, mesh_packet_id } => (
                "queue_status",
                format!("res={res} packet_id={mesh_packet_id:#010x}"),
            ),
        };
        rows.push(DecodedRow { frame, kind, detail });
    }
    for error in parsed.errors {
        let detail = match error.field {
            Some(field) => format!("field {field}: {}", error.error),
            None => error.error.to_string(),
        };
        rows.push(DecodedRow {
            frame,
            kind: "error",
            detail,
        });
    }
    rows
}

fn to_radio_row(frame: usize, payload: &[u8]) -> DecodedRow {
    let (kind, detail) = match ToRadio::decode(payload) {
        Ok(Some(ToRadio::Packet(packet))) => ("packet", describe_packet(&packet)),
        Ok(Some(ToRadio::WantConfig(nonce))) => ("want_config", format!("nonce={nonce:#x}")),
        Ok(None) => ("unknown", format!("{} bytes", payload.len())),
        Err(err) => ("error", err.to_string()),
    };
    DecodedRow { frame, kind, detail }
}

fn describe_packet(packet: &MeshPacket) -> String {
    let mut detail = format!(
        "from={} to={} channel={} id={:#010x}",
        packet.from.map(node_id).unwrap_or_else(|| "-".to_string()),
        destination_name(packet.to),
        packet.channel,
        packet.id,
    );
    match &packet.decoded {
        None => detail.push_str(" encrypted"),
        Some(data) => {
            detail.push_str(&format!(" port={}", data.portnum));
            if let Some(request_id) = data.request_id {
                detail.push_str(&format!(" request_id={request_id:#010x}"));
            }
            match data.portnum {
                portnum::TEXT_MESSAGE_APP => detail.push_str(&format!(" text={:?}", data.text())),
                _ => detail.push_str(&format!(" payload={}", hex::encode(&data.payload))),
            }
        }
    }
    detail
}

fn describe_sections(sections: &[ConfigSection]) -> String {
    sections
        .iter()
        .map(|section| {
            let fields = section
                .fields
                .iter()
                .map(|field| format!("{}={}", field.name, field.value))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{}: {fields}", section.name)
        })
        .collect::<Vec<_>>()
        .join("; ")
}
