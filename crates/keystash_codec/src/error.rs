//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding a text token.
///
/// Encoding never fails; every variant here describes a malformed token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The token length is not valid for the encoding.
    #[error("invalid token length: {len}")]
    InvalidLength {
        /// Length of the rejected token in characters.
        len: usize,
    },

    /// The token contains a character outside the alphabet.
    #[error("invalid byte {byte:#04x} at offset {offset}")]
    InvalidByte {
        /// Offset of the offending character.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    /// The final symbol carries non-zero trailing bits.
    #[error("invalid last symbol {byte:#04x} at offset {offset}")]
    InvalidLastSymbol {
        /// Offset of the offending character.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    /// Padding is missing, misplaced or excessive.
    #[error("invalid padding")]
    InvalidPadding,
}

impl From<base64::DecodeError> for CodecError {
    fn from(err: base64::DecodeError) -> Self {
        match err {
            base64::DecodeError::InvalidByte(offset, byte) => Self::InvalidByte { offset, byte },
            base64::DecodeError::InvalidLength(len) => Self::InvalidLength { len },
            base64::DecodeError::InvalidLastSymbol(offset, byte) => {
                Self::InvalidLastSymbol { offset, byte }
            }
            base64::DecodeError::InvalidPadding => Self::InvalidPadding,
        }
    }
}
