use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use crate::wire::{
    encode_field_bytes, encode_field_fixed32, encode_field_varint, FieldReader, WireValue,
};

/// Destination address that reaches every node on the mesh.
pub const BROADCAST_ADDR: u32 = 0xFFFF_FFFF;

/// Hop limit used for every packet this crate originates.
pub const DEFAULT_HOP_LIMIT: u8 = 3;

/// `MeshPacket.Priority.RELIABLE`.
pub const PRIORITY_RELIABLE: u8 = 70;

/// Application port numbers carried in [`Data::portnum`].
pub mod portnum {
    pub const TEXT_MESSAGE_APP: u32 = 1;
    pub const NODEINFO_APP: u32 = 4;
    pub const ROUTING_APP: u32 = 5;
    pub const ADMIN_APP: u32 = 6;
}

/// `Routing.error_reason` value for a delivered packet.
pub const ROUTING_ERROR_NONE: u32 = 0;

/// Decoded application payload of a mesh packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Data {
    pub portnum: u32,
    pub payload: Bytes,
    pub request_id: Option<u32>,
}

impl Data {
    pub fn encode(&self, dst: &mut impl BufMut) {
        encode_field_varint(1, self.portnum, dst);
        encode_field_bytes(2, &self.payload, dst);
        if let Some(request_id) = self.request_id {
            encode_field_fixed32(6, request_id, dst);
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut data = Self::default();
        for field in FieldReader::new(buf) {
            let field = field?;
            match (field.number, field.value) {
                (1, WireValue::Varint(portnum)) => data.portnum = portnum,
                (2, WireValue::Bytes(payload)) => data.payload = Bytes::copy_from_slice(payload),
                (6, WireValue::Fixed32(request_id)) => data.request_id = Some(request_id),
                _ => {}
            }
        }
        Ok(data)
    }

    /// Payload interpreted as UTF-8 text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// A packet routed over the mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshPacket {
    pub from: Option<u32>,
    pub to: u32,
    pub channel: u8,
    /// Absent when the radio could not decrypt the packet.
    pub decoded: Option<Data>,
    pub id: u32,
    pub hop_limit: u8,
    pub want_ack: bool,
    pub priority: u8,
}

impl MeshPacket {
    pub fn encode(&self, dst: &mut impl BufMut) {
        if let Some(from) = self.from {
            encode_field_fixed32(1, from, dst);
        }
        encode_field_fixed32(2, self.to, dst);
        encode_field_varint(3, u32::from(self.channel), dst);
        if let Some(data) = &self.decoded {
            let mut inner = BytesMut::new();
            data.encode(&mut inner);
            encode_field_bytes(4, &inner, dst);
        }
        encode_field_fixed32(6, self.id, dst);
        if self.hop_limit != 0 {
            encode_field_varint(9, u32::from(self.hop_limit), dst);
        }
        if self.want_ack {
            encode_field_varint(10, 1, dst);
        }
        if self.priority != 0 {
            encode_field_varint(11, u32::from(self.priority), dst);
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut packet = Self::default();
        for field in FieldReader::new(buf) {
            let field = field?;
            match (field.number, field.value) {
                (1, WireValue::Fixed32(from)) => packet.from = Some(from),
                (2, WireValue::Fixed32(to)) => packet.to = to,
                (3, WireValue::Varint(channel)) => packet.channel = channel as u8,
                (4, WireValue::Bytes(data)) => packet.decoded = Some(Data::decode(data)?),
                (6, WireValue::Fixed32(id)) => packet.id = id,
                (9, WireValue::Varint(hop_limit)) => packet.hop_limit = hop_limit as u8,
                (10, WireValue::Varint(want_ack)) => packet.want_ack = want_ack != 0,
                (11, WireValue::Varint(priority)) => packet.priority = priority as u8,
                _ => {}
            }
        }
        Ok(packet)
    }
}

/// Node identity as broadcast on `NODEINFO_APP`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub long_name: String,
    pub short_name: String,
}

impl User {
    /// User record for `node_num`, with the conventional `!%08x` id.
    pub fn for_node(node_num: u32, long_name: &str, short_name: &str) -> Self {
        Self {
            id: node_id(node_num),
            long_name: long_name.to_owned(),
            short_name: short_name.to_owned(),
        }
    }

    /// Empty names are omitted from the encoding.
    pub fn encode(&self, dst: &mut impl BufMut) {
        encode_field_bytes(1, self.id.as_bytes(), dst);
        if !self.long_name.is_empty() {
            encode_field_bytes(2, self.long_name.as_bytes(), dst);
        }
        if !self.short_name.is_empty() {
            encode_field_bytes(3, self.short_name.as_bytes(), dst);
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut user = Self::default();
        for field in FieldReader::new(buf) {
            let field = field?;
            let WireValue::Bytes(raw) = field.value else {
                continue;
            };
            let text = String::from_utf8_lossy(raw).into_owned();
            match field.number {
                1 => user.id = text,
                2 => user.long_name = text,
                3 => user.short_name = text,
                _ => {}
            }
        }
        Ok(user)
    }
}

/// Textual node id, e.g. `!a1b2c3d4`.
pub fn node_id(node_num: u32) -> String {
    format!("!{node_num:08x}")
}

/// Host-to-radio envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToRadio {
    Packet(MeshPacket),
    WantConfig(u32),
}

impl ToRadio {
    pub fn encode(&self, dst: &mut impl BufMut) {
        match self {
            Self::Packet(packet) => {
                let mut inner = BytesMut::new();
                packet.encode(&mut inner);
                encode_field_bytes(1, &inner, dst);
            }
            Self::WantConfig(nonce) => encode_field_varint(3, *nonce, dst),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }

    pub fn decode(buf: &[u8]) -> Result<Option<Self>> {
        let mut message = None;
        for field in FieldReader::new(buf) {
            let field = field?;
            match (field.number, field.value) {
                (1, WireValue::Bytes(packet)) => {
                    message = Some(Self::Packet(MeshPacket::decode(packet)?));
                }
                (3, WireValue::Varint(nonce)) => message = Some(Self::WantConfig(nonce)),
                _ => {}
            }
        }
        Ok(message)
    }
}

/// `Routing.error_reason` (field 3) from a `ROUTING_APP` payload.
pub fn routing_error_reason(payload: &[u8]) -> Result<u32> {
    let mut reason = ROUTING_ERROR_NONE;
    for field in FieldReader::new(payload) {
        let field = field?;
        if let (3, WireValue::Varint(value)) = (field.number, field.value) {
            reason = value;
        }
    }
    Ok(reason)
}
