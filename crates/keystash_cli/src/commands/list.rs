//! List command implementation.

use super::open_existing_store;
use keystash_core::KeyStore;
use serde::Serialize;
use std::path::Path;

/// One listed key.
#[derive(Debug, Serialize)]
pub struct KeyEntry {
    /// The key.
    pub key: String,
    /// Decoded value length, or `None` if the value does not decode.
    pub len: Option<u16>,
}

/// Store listing result.
#[derive(Debug, Serialize)]
pub struct ListResult {
    /// Store path.
    pub path: String,
    /// Number of keys.
    pub count: usize,
    /// Keys in order.
    pub keys: Vec<KeyEntry>,
}

/// Collects the listing for an open store.
pub fn collect(path: &Path, store: &KeyStore) -> ListResult {
    let keys: Vec<KeyEntry> = store
        .keys()
        .map(|key| KeyEntry {
            key: key.to_string(),
            len: store.value_len(key).ok(),
        })
        .collect();

    ListResult {
        path: path.display().to_string(),
        count: keys.len(),
        keys,
    }
}

/// Runs the list command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing_store(path)?;
    let result = collect(path, &store);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            println!("{} ({} keys)", result.path, result.count);
            for entry in &result.keys {
                match entry.len {
                    Some(len) => println!("  {}  {} bytes", entry.key, len),
                    None => println!("  {}  <invalid encoding>", entry.key),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystash_core::StoreConfig;
    use tempfile::tempdir;

    #[test]
    fn collect_reports_lengths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini");
        let mut store = KeyStore::open(StoreConfig::new(&path)).unwrap();
        store.set("b", &[0; 10]).unwrap();
        store.set("a", &[]).unwrap();

        let result = collect(&path, &store);
        assert_eq!(result.count, 2);
        assert_eq!(result.keys[0].key, "a");
        assert_eq!(result.keys[0].len, Some(0));
        assert_eq!(result.keys[1].len, Some(10));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["keys"][1]["len"], 10);
    }

    #[test]
    fn collect_marks_corrupt_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini");
        std::fs::write(&path, "[Default]\nbad=%%%%\n").unwrap();

        let store = KeyStore::open(StoreConfig::new(&path)).unwrap();
        let result = collect(&path, &store);
        assert_eq!(result.keys[0].len, None);
    }
}
