use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// First start marker byte.
pub const START1: u8 = 0x94;

/// Second start marker byte. Also the wake byte.
pub const START2: u8 = 0xC3;

/// Start markers in wire order.
pub const MAGIC: [u8; 2] = [START1, START2];

/// Frame header: start markers (2) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Largest payload a frame may carry.
pub const MAX_PAYLOAD: usize = 512;

/// Sent before every handshake attempt to wake the radio's serial API.
pub const WAKE_SEQUENCE: [u8; 32] = [START2; 32];

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬─────────────┬──────────────────┐
/// │ Start (2B)   │ Length      │ Payload          │
/// │ 0x94 0xC3    │ (2B BE)     │ (Length bytes)   │
/// └──────────────┴─────────────┴──────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.is_empty() {
        return Err(FrameError::EmptyPayload);
    }
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u16(payload.len() as u16);
    dst.put_slice(payload);
    Ok(())
}
