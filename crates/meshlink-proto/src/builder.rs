//! Encoders for every `ToRadio` envelope the bridge sends.

use bytes::{Bytes, BytesMut};

use crate::error::BuildError;
use crate::message::{
    portnum, Data, MeshPacket, ToRadio, User, BROADCAST_ADDR, DEFAULT_HOP_LIMIT,
    PRIORITY_RELIABLE,
};

/// Longest text payload accepted for a single packet.
pub const MAX_TEXT_LEN: usize = 233;

/// `ToRadio { want_config_id = nonce }`.
pub fn want_config(nonce: u32) -> Bytes {
    ToRadio::WantConfig(nonce).to_bytes()
}

/// Text message expecting a routing acknowledgement.
pub fn uplink_text(
    message: &str,
    destination: u32,
    channel: u8,
    packet_id: u32,
) -> Result<Bytes, BuildError> {
    if message.len() > MAX_TEXT_LEN {
        return Err(BuildError::MessageTooLong {
            len: message.len(),
            max: MAX_TEXT_LEN,
        });
    }
    let packet = MeshPacket {
        to: destination,
        channel,
        decoded: Some(Data {
            portnum: portnum::TEXT_MESSAGE_APP,
            payload: Bytes::copy_from_slice(message.as_bytes()),
            request_id: None,
        }),
        id: packet_id,
        hop_limit: DEFAULT_HOP_LIMIT,
        want_ack: true,
        priority: PRIORITY_RELIABLE,
        ..Default::default()
    };
    Ok(ToRadio::Packet(packet).to_bytes())
}

/// Broadcast of our own `User` record. No acknowledgement is requested.
pub fn nodeinfo_broadcast(long_name: &str, short_name: &str, my_node_num: u32, packet_id: u32) -> Bytes {
    let mut user = BytesMut::new();
    User::for_node(my_node_num, long_name, short_name).encode(&mut user);

    let packet = MeshPacket {
        to: BROADCAST_ADDR,
        channel: 0,
        decoded: Some(Data {
            portnum: portnum::NODEINFO_APP,
            payload: user.freeze(),
            request_id: None,
        }),
        id: packet_id,
        hop_limit: DEFAULT_HOP_LIMIT,
        want_ack: false,
        priority: PRIORITY_RELIABLE,
        ..Default::default()
    };
    ToRadio::Packet(packet).to_bytes()
}

/// Wrap an encoded `AdminMessage` in a packet addressed to the local node.
pub fn admin_message(admin_payload: &[u8], my_node_num: u32, packet_id: u32) -> Bytes {
    let packet = MeshPacket {
        to: my_node_num,
        channel: 0,
        decoded: Some(Data {
            portnum: portnum::ADMIN_APP,
            payload: Bytes::copy_from_slice(admin_payload),
            request_id: None,
        }),
        id: packet_id,
        hop_limit: DEFAULT_HOP_LIMIT,
        want_ack: true,
        ..Default::default()
    };
    ToRadio::Packet(packet).to_bytes()
}
