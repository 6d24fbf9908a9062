//! CLI command implementations.

pub mod check;
pub mod delete;
pub mod get;
pub mod list;
pub mod set;

use clap::ValueEnum;
use keystash_core::{KeyStore, StoreConfig, StoreResult};
use std::path::Path;
use thiserror::Error;

/// How a value is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputEncoding {
    /// Raw bytes on stdout.
    Raw,
    /// Base64 text.
    Base64,
    /// Lowercase hex text.
    Hex,
}

/// How a value argument is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputEncoding {
    /// The argument's UTF-8 bytes.
    Utf8,
    /// Base64 text.
    Base64,
    /// Hex text.
    Hex,
}

/// Errors decoding a value argument.
#[derive(Debug, Error)]
pub enum InputError {
    /// The argument is not valid base64.
    #[error("invalid base64 value: {0}")]
    Base64(#[from] keystash_codec::CodecError),

    /// The argument is not valid hex.
    #[error("invalid hex value: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl InputEncoding {
    /// Decodes a command-line argument into value bytes.
    pub fn decode(self, arg: &str) -> Result<Vec<u8>, InputError> {
        match self {
            Self::Utf8 => Ok(arg.as_bytes().to_vec()),
            Self::Base64 => Ok(keystash_codec::decode(arg)?),
            Self::Hex => Ok(hex::decode(arg)?),
        }
    }
}

impl OutputEncoding {
    /// Renders value bytes for stdout.
    pub fn render(self, value: &[u8]) -> Vec<u8> {
        match self {
            Self::Raw => value.to_vec(),
            Self::Base64 => format!("{}\n", keystash_codec::encode(value)).into_bytes(),
            Self::Hex => format!("{}\n", hex::encode(value)).into_bytes(),
        }
    }
}

/// Opens the store the way every command does.
pub fn open_store(path: &Path) -> StoreResult<KeyStore> {
    KeyStore::open(StoreConfig::new(path).exclusive_lock(true))
}

/// Opens a store for a read-only command.
///
/// Unlike [`open_store`], a missing backing file is an error instead of
/// being created along with its lock file.
pub fn open_existing_store(path: &Path) -> Result<KeyStore, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No store found at {:?}", path).into());
    }
    Ok(open_store(path)?)
}
