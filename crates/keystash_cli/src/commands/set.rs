//! Set command implementation.

use super::{open_store, InputEncoding};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the value comes from.
#[derive(Debug)]
pub enum Input {
    /// A command-line argument in the given encoding.
    Arg(String, InputEncoding),
    /// Raw bytes read from a file.
    File(PathBuf),
}

impl Input {
    fn read(self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        match self {
            Self::Arg(arg, encoding) => Ok(encoding.decode(&arg)?),
            Self::File(file) => Ok(std::fs::read(file)?),
        }
    }
}

/// Runs the set command.
pub fn run(path: &Path, key: &str, input: Input) -> Result<(), Box<dyn std::error::Error>> {
    let value = input.read()?;
    let mut store = open_store(path)?;
    store.set(key, &value)?;

    info!("Stored {} bytes under {:?} in {:?}", value.len(), key, path);
    Ok(())
}
