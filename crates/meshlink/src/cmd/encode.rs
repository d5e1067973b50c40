use bytes::BytesMut;
use meshlink_frame::{encode_frame, WAKE_SEQUENCE};
use meshlink_proto::{
    admin, admin_message, config_nonce, nodeinfo_broadcast, uplink_text, want_config,
    PacketIdGenerator, BROADCAST_ADDR,
};

use crate::cmd::{EncodeArgs, EncodeKind};
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_encoded, EncodedOutput, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let out = encode(args.kind, args.id)?;
    print_encoded(&out, format);
    Ok(SUCCESS)
}

fn encode(kind: EncodeKind, id: Option<u32>) -> CliResult<EncodedOutput> {
    let mut rng = rand::rng();
    let packet_id = id.unwrap_or_else(|| PacketIdGenerator::new().next_id(&mut rng));

    let (kind, packet_id, payload) = match kind {
        EncodeKind::Wake => {
            return Ok(EncodedOutput {
                kind: "wake",
                packet_id: None,
                size: WAKE_SEQUENCE.len(),
                hex: hex::encode(WAKE_SEQUENCE),
            });
        }
        EncodeKind::Text {
            message,
            to,
            channel,
        } => {
            let payload = uplink_text(
                &message,
                to.unwrap_or(BROADCAST_ADDR),
                channel.unwrap_or(0),
                packet_id,
            )
            .map_err(|err| CliError::new(DATA_INVALID, err.to_string()))?;
            ("text", Some(packet_id), payload)
        }
        EncodeKind::WantConfig { nonce } => {
            let nonce = nonce.unwrap_or_else(|| config_nonce(&mut rng));
            ("want_config", None, want_config(nonce))
        }
        EncodeKind::Nodeinfo {
            node,
            long_name,
            short_name,
        } => (
            "nodeinfo",
            Some(packet_id),
            nodeinfo_broadcast(&long_name, &short_name, node, packet_id),
        ),
        EncodeKind::Reboot { node, seconds } => (
            "reboot",
            Some(packet_id),
            admin_message(&admin::reboot(seconds), node, packet_id),
        ),
    };

    let mut wire = BytesMut::new();
    encode_frame(&payload, &mut wire).map_err(|err| frame_error("encode failed", err))?;
    Ok(EncodedOutput {
        kind,
        packet_id,
        size: wire.len(),
        hex: hex::encode(&wire),
    })
}
