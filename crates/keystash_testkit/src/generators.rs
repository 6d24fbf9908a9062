//! Property-based test generators using proptest.
//!
//! Provides strategies for keys, values and operation sequences that respect
//! the store's invariants.

use keystash_core::MAX_VALUE_LEN;
use proptest::prelude::*;

/// Strategy for generating valid store keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9][a-zA-Z0-9_./-]{0,31}").expect("Invalid regex")
}

/// Strategy for generating values of arbitrary bytes.
pub fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..256),
        prop::collection::vec(Just(0u8), 0..64),
        prop::collection::vec(Just(0xFFu8), 0..64),
    ]
}

/// Strategy for values up to the largest accepted length.
pub fn large_value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=MAX_VALUE_LEN)
}

/// A store mutation.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Store a value.
    Set {
        /// Key to write.
        key: String,
        /// Value to write.
        value: Vec<u8>,
    },
    /// Remove a key.
    Delete {
        /// Key to remove.
        key: String,
    },
}

/// Strategy for a single operation over a small key space.
///
/// Keys are drawn from a handful of names so sequences overwrite and delete
/// keys they already wrote.
pub fn store_operation_strategy() -> impl Strategy<Value = StoreOperation> {
    let key = prop::sample::select(vec!["alpha", "beta", "gamma", "delta", "epsilon"])
        .prop_map(str::to_string);
    prop_oneof![
        3 => (key.clone(), value_strategy())
            .prop_map(|(key, value)| StoreOperation::Set { key, value }),
        1 => key.prop_map(|key| StoreOperation::Delete { key }),
    ]
}

/// Strategy for a sequence of operations.
pub fn operation_sequence_strategy(
    max_len: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(), 0..max_len)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self { cases: 256 }
    }
}

impl PropTestConfig {
    /// Quick configuration for fast tests.
    pub fn quick() -> Self {
        Self { cases: 32 }
    }

    /// Converts to proptest config.
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            ..ProptestConfig::default()
        }
    }
}
