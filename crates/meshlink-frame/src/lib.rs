//! Serial framing for the Meshtastic client API.
//!
//! Every protobuf envelope on the wire is framed with:
//! - A 2-byte start marker (`0x94 0xC3`) for stream synchronization
//! - A 2-byte big-endian payload length in `1..=512`
//!
//! Anything else on the wire (boot logs, noise, truncated frames) is
//! resynchronized against byte by byte.

pub mod codec;
pub mod error;
pub mod framed;
pub mod framer;

pub use codec::{encode_frame, HEADER_SIZE, MAGIC, MAX_PAYLOAD, START1, START2, WAKE_SEQUENCE};
pub use error::{FrameError, Result};
pub use framed::FramedLink;
pub use framer::{FramerState, FramerStats, SerialFramer};
