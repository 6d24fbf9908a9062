//! # KeyStash Codec
//!
//! Binary-safe text encoding for KeyStash values.
//!
//! Values in a KeyStash file are arbitrary bytes, but the file itself is
//! line-oriented text. This crate maps bytes to a printable token that can sit
//! on the right-hand side of a `key=value` line and back again.
//!
//! ## Token Rules
//!
//! - Alphabet is standard base64 (`A-Z`, `a-z`, `0-9`, `+`, `/`)
//! - `=` appears only as trailing padding
//! - No whitespace, newlines or control characters
//! - Decoding is strict: bad length, bad alphabet or non-canonical trailing
//!   bits are rejected rather than decoded best-effort
//!
//! ## Usage
//!
//! ```
//! use keystash_codec::{decode, encode};
//!
//! let token = encode(&[0x00, 0xFF, b'=', b'\n']);
//! assert!(keystash_codec::is_token_safe(&token));
//!
//! let bytes = decode(&token).unwrap();
//! assert_eq!(bytes, vec![0x00, 0xFF, b'=', b'\n']);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod token;

pub use error::{CodecError, CodecResult};
pub use token::{decode, decoded_len, encode, encoded_len, is_token_safe, PAD};
