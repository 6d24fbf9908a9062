//! Get command implementation.

use super::{open_existing_store, OutputEncoding};
use std::io::Write;
use std::path::Path;

/// Runs the get command.
pub fn run(
    path: &Path,
    key: &str,
    encoding: OutputEncoding,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing_store(path)?;
    let value = store.get_vec(key)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&encoding.render(&value))?;
    stdout.flush()?;

    Ok(())
}
