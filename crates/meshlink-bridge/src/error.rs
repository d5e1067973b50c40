use meshlink_frame::FrameError;
use meshlink_proto::BuildError;
use meshlink_transport::TransportError;

use crate::state::ConnectionState;

/// Errors returned by bridge API calls.
///
/// A call that fails leaves the bridge state untouched.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The call is only valid in another state.
    #[error("radio not ready (state: {0})")]
    NotReady(ConnectionState),

    /// Text payload does not fit in a single packet.
    #[error("message too long ({len} bytes, max {max})")]
    MessageTooLong { len: usize, max: usize },

    /// The radio has not reported its node number yet.
    #[error("local node number not known yet")]
    NodeNumberUnknown,

    /// `apply_config` was called without any queued admin messages.
    #[error("no admin configuration to apply")]
    NoAdminConfig,

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<BuildError> for BridgeError {
    fn from(error: BuildError) -> Self {
        match error {
            BuildError::MessageTooLong { len, max } => Self::MessageTooLong { len, max },
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
