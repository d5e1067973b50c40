use std::path::PathBuf;

/// Errors that can occur on the serial transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to put the serial device into raw mode or set its speed.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested baud rate has no termios equivalent.
    #[error("unsupported baud rate {0}")]
    UnsupportedBaud(u32),

    /// An I/O error occurred on the link.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link has been closed by the other side.
    #[error("serial link closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
