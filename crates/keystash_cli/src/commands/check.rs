//! Check command implementation.

use super::open_existing_store;
use keystash_core::KeyStore;
use std::path::Path;
use tracing::info;

/// A value that failed to decode.
#[derive(Debug)]
pub struct Problem {
    /// The affected key.
    pub key: String,
    /// What went wrong.
    pub message: String,
}

/// Decodes every value and returns the ones that fail.
pub fn verify(store: &KeyStore) -> Vec<Problem> {
    store
        .keys()
        .filter_map(|key| {
            store.get_vec(key).err().map(|err| Problem {
                key: key.to_string(),
                message: err.to_string(),
            })
        })
        .collect()
}

/// Runs the check command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Checking store {:?}", path);

    let store = open_existing_store(path)?;
    let problems = verify(&store);

    if problems.is_empty() {
        println!("✓ {} keys verified", store.len());
        return Ok(());
    }

    for problem in &problems {
        println!("✗ {}: {}", problem.key, problem.message);
    }
    Err(format!("{} of {} values failed to decode", problems.len(), store.len()).into())
}
