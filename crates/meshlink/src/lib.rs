//! Host-side bridge to a Meshtastic radio on a serial port.
//!
//! meshlink frames and unframes the radio's serial API, encodes and decodes
//! the handful of protobuf messages a gateway needs, and drives the radio
//! through power-up, the `want_config` handshake, optional admin
//! configuration and acknowledged text sends.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial link, clock and power-line capabilities
//! - [`frame`]: `0x94 0xC3` serial framing
//! - [`proto`]: protobuf wire codec, message builders and `FromRadio` parser
//! - [`bridge`]: connection state machine (behind `bridge` feature)

/// Re-export transport types.
pub mod transport {
    pub use meshlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use meshlink_frame::*;
}

/// Re-export protocol types.
pub mod proto {
    pub use meshlink_proto::*;
}

/// Re-export bridge types (requires `bridge` feature).
#[cfg(feature = "bridge")]
pub mod bridge {
    pub use meshlink_bridge::*;
}
