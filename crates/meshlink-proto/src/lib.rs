//! Protobuf wire primitives and the subset of the Meshtastic client API
//! spoken over the serial link.
//!
//! Messages are encoded and decoded by hand against fixed field numbers,
//! without generated code:
//!
//! - [`wire`]: varint/fixed32/length-delimited primitives and [`FieldReader`]
//! - [`message`]: `ToRadio`, `MeshPacket`, `Data`, `User`
//! - [`builder`]: every outbound envelope the bridge sends
//! - [`parser`]: `FromRadio` into an ordered list of events
//! - [`admin`]: `AdminMessage` payloads for settings transactions
//! - [`describe`]: diagnostic rendering of config dumps

pub mod admin;
pub mod builder;
pub mod describe;
pub mod error;
pub mod message;
pub mod packet_id;
pub mod parser;
pub mod wire;

pub use builder::{admin_message, nodeinfo_broadcast, uplink_text, want_config, MAX_TEXT_LEN};
pub use error::{BuildError, DecodeError, Result};
pub use message::{
    node_id, portnum, routing_error_reason, Data, MeshPacket, ToRadio, User, BROADCAST_ADDR,
    ROUTING_ERROR_NONE,
};
pub use packet_id::{config_nonce, PacketIdGenerator};
pub use parser::{parse_from_radio, FieldError, FromRadio, FromRadioEvent};
pub use wire::{FieldReader, WireType, WireValue};
