//! `AdminMessage` payloads used to reconfigure the local radio.
//!
//! Only the handful of variants needed for a settings transaction are
//! modelled; `set_*` take the already-encoded inner message.

use bytes::{Bytes, BytesMut};

use crate::wire::{encode_field_bytes, encode_field_varint};

pub const SET_CHANNEL: u32 = 33;
pub const SET_CONFIG: u32 = 34;
pub const SET_MODULE_CONFIG: u32 = 35;
pub const BEGIN_EDIT_SETTINGS: u32 = 64;
pub const COMMIT_EDIT_SETTINGS: u32 = 65;
pub const REBOOT_SECONDS: u32 = 97;

/// Open a settings transaction.
pub fn begin_edit_settings() -> Bytes {
    flag(BEGIN_EDIT_SETTINGS)
}

/// Persist everything written since [`begin_edit_settings`].
pub fn commit_edit_settings() -> Bytes {
    flag(COMMIT_EDIT_SETTINGS)
}

/// Ask the radio to reboot after `seconds`.
pub fn reboot(seconds: u32) -> Bytes {
    let mut buf = BytesMut::new();
    encode_field_varint(REBOOT_SECONDS, seconds, &mut buf);
    buf.freeze()
}

pub fn set_config(config: &[u8]) -> Bytes {
    nested(SET_CONFIG, config)
}

pub fn set_module_config(module_config: &[u8]) -> Bytes {
    nested(SET_MODULE_CONFIG, module_config)
}

pub fn set_channel(channel: &[u8]) -> Bytes {
    nested(SET_CHANNEL, channel)
}

fn flag(field: u32) -> Bytes {
    let mut buf = BytesMut::new();
    encode_field_varint(field, 1, &mut buf);
    buf.freeze()
}

fn nested(field: u32, inner: &[u8]) -> Bytes {
    let mut buf = BytesMut::new();
    encode_field_bytes(field, inner, &mut buf);
    buf.freeze()
}
