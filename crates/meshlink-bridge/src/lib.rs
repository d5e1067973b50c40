//! Connection state machine for a Meshtastic radio on a serial link.
//!
//! [`MeshBridge`] owns the link, a clock, a random source and an optional
//! power line. The host calls [`MeshBridge::tick`] from its loop; the bridge
//! powers the radio up, performs the `want_config` handshake, optionally
//! pushes admin configuration, and then sends text messages one at a time,
//! tracking their acknowledgements.
//!
//! ```text
//! Off -> PoweringOn -> Initializing -> Configuring -> [ApplyingConfig] -> Ready <-> Sending
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod listeners;
pub mod state;

pub use bridge::{MeshBridge, PendingSend};
pub use config::{AdminConfig, BootTimeoutPolicy, BridgeConfig};
pub use error::{BridgeError, Result};
pub use listeners::{Listeners, TextMessage};
pub use state::{ConfigPhase, ConnectionState};
