/// Errors raised while decoding protobuf wire data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended inside a varint, fixed-width value or tag.
    #[error("buffer truncated at offset {offset}")]
    Truncated { offset: usize },

    /// A varint did not terminate within five 7-bit groups or does not fit in 32 bits.
    #[error("varint overflows 32 bits at offset {offset}")]
    VarintOverflow { offset: usize },

    /// The tag carried a wire type this codec does not handle.
    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u8),

    /// A length-delimited field claims more bytes than remain.
    #[error("length-delimited field of {len} bytes exceeds remaining {remaining}")]
    LengthOverflow { len: usize, remaining: usize },
}

/// Errors raised while building outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Text payload exceeds what fits in a single mesh packet.
    #[error("message too long ({len} bytes, max {max})")]
    MessageTooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
