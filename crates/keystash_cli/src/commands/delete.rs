//! Delete command implementation.

use super::open_store;
use std::path::Path;
use tracing::info;

/// Runs the delete command.
pub fn run(path: &Path, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(path)?;
    let existed = store.contains(key);
    store.delete(key)?;

    if existed {
        info!("Deleted {:?} from {:?}", key, path);
    } else {
        info!("Key {:?} not present in {:?}", key, path);
    }
    Ok(())
}
