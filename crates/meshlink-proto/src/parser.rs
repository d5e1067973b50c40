use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{DecodeError, Result};
use crate::message::{MeshPacket, User};
use crate::wire::{FieldReader, WireValue};

/// One top-level field of a radio-to-host `FromRadio` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromRadioEvent {
    /// Envelope sequence number.
    Id(u32),
    Packet(MeshPacket),
    MyInfo { node_num: u32 },
    NodeInfo { num: u32, user: Option<User> },
    Config(Bytes),
    ModuleConfig(Bytes),
    Channel(Bytes),
    /// End of a config dump; echoes the `want_config` nonce.
    ConfigComplete(u32),
    Rebooted(bool),
    QueueStatus { res: i32, mesh_packet_id: u32 },
}

/// A sub-message that could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    /// Top-level field number, or `None` when the envelope itself broke.
    pub field: Option<u32>,
    pub error: DecodeError,
}

/// Everything recovered from one frame, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FromRadio {
    pub events: Vec<FromRadioEvent>,
    pub errors: Vec<FieldError>,
}

impl FromRadio {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Decode a `FromRadio` frame.
///
/// A malformed sub-message is dropped and recorded in [`FromRadio::errors`]
/// while its siblings are still decoded. If the envelope itself cannot be
/// walked any further, events decoded so far are kept and the rest of the
/// frame is abandoned.
pub fn parse_from_radio(frame: &[u8]) -> FromRadio {
    let mut out = FromRadio::default();

    for field in FieldReader::new(frame) {
        let field = match field {
            Ok(field) => field,
            Err(error) => {
                warn!(%error, decoded = out.events.len(), "abandoning rest of FromRadio frame");
                out.errors.push(FieldError { field: None, error });
                break;
            }
        };

        match decode_event(field.number, field.value) {
            Ok(Some(event)) => out.events.push(event),
            Ok(None) => {
                debug!(
                    field = field.number,
                    wire_type = ?field.value.wire_type(),
                    "skipping FromRadio field"
                );
            }
            Err(error) => {
                warn!(field = field.number, %error, "dropping malformed FromRadio field");
                out.errors.push(FieldError {
                    field: Some(field.number),
                    error,
                });
            }
        }
    }

    out
}

fn decode_event(number: u32, value: WireValue<'_>) -> Result<Option<FromRadioEvent>> {
    let event = match (number, value) {
        (1, WireValue::Varint(id)) => FromRadioEvent::Id(id),
        (2, WireValue::Bytes(buf)) => FromRadioEvent::Packet(MeshPacket::decode(buf)?),
        (3, WireValue::Bytes(buf)) => decode_my_info(buf)?,
        (4, WireValue::Bytes(buf)) => decode_node_info(buf)?,
        (5, WireValue::Bytes(buf)) => FromRadioEvent::Config(Bytes::copy_from_slice(buf)),
        (6, WireValue::Bytes(buf)) => FromRadioEvent::ModuleConfig(Bytes::copy_from_slice(buf)),
        (7, WireValue::Varint(id)) => FromRadioEvent::ConfigComplete(id),
        (8, WireValue::Varint(flag)) => FromRadioEvent::Rebooted(flag != 0),
        (9, WireValue::Bytes(buf)) => FromRadioEvent::Channel(Bytes::copy_from_slice(buf)),
        (11, WireValue::Bytes(buf)) => decode_queue_status(buf)?,
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn decode_my_info(buf: &[u8]) -> Result<FromRadioEvent> {
    let mut node_num = 0;
    for field in FieldReader::new(buf) {
        let field = field?;
        if let (1, WireValue::Varint(num)) = (field.number, field.value) {
            node_num = num;
        }
    }
    Ok(FromRadioEvent::MyInfo { node_num })
}

fn decode_node_info(buf: &[u8]) -> Result<FromRadioEvent> {
    let mut num = 0;
    let mut user = None;
    for field in FieldReader::new(buf) {
        let field = field?;
        match (field.number, field.value) {
            (1, WireValue::Varint(value)) => num = value,
            (2, WireValue::Bytes(raw)) => user = Some(User::decode(raw)?),
            _ => {}
        }
    }
    Ok(FromRadioEvent::NodeInfo { num, user })
}

fn decode_queue_status(buf: &[u8]) -> Result<FromRadioEvent> {
    let mut res = 0;
    let mut mesh_packet_id = 0;
    for field in FieldReader::new(buf) {
        let field = field?;
        match (field.number, field.value) {
            (1, WireValue::Varint(value)) => res = value as i32,
            (4, WireValue::Varint(value)) => mesh_packet_id = value,
            _ => {}
        }
    }
    Ok(FromRadioEvent::QueueStatus { res, mesh_packet_id })
}
