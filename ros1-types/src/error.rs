//! Error types for the ROS1 wire codec

use thiserror::Error;

/// Result type for wire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding or decoding a message
#[derive(Debug, Error)]
pub enum Error {
    /// The buffer ended before a value could be read
    #[error("Unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes required by the read
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// A string payload was not valid UTF-8
    #[error("Invalid UTF-8 in string payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A length does not fit in the 4-byte length prefix
    #[error("Length {length} does not fit in a 4-byte length prefix")]
    LengthOverflow {
        /// The offending length
        length: usize,
    },

    /// A fixed-size array was decoded with the wrong number of elements
    #[error("Fixed array expected {expected} elements, decoded {actual}")]
    ArrayLength {
        /// Declared array length
        expected: usize,
        /// Number of elements decoded
        actual: usize,
    },

    /// Bytes were left over after a complete message was decoded
    #[error("{remaining} trailing bytes after message")]
    TrailingBytes {
        /// Unconsumed byte count
        remaining: usize,
    },
}
