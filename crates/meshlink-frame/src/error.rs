use meshlink_transport::TransportError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A received header declared a length outside `1..=512`.
    #[error("invalid frame length {0} (expected 1..=512)")]
    InvalidLength(usize),

    /// Frames must carry at least one payload byte.
    #[error("empty frame payload")]
    EmptyPayload,

    /// The payload exceeds the maximum frame size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The underlying serial link failed.
    #[error("frame transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
