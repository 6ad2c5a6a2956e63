//! Persistence boundary.
//!
//! Every subsystem aggregate is persisted as an opaque JSON blob under its own
//! namespaced key; subsystems never write each other's keys. Loading is
//! deliberately forgiving: a missing key yields a fresh default, a malformed
//! blob is logged and treated as "no save present", and partially-shaped blobs
//! heal field-by-field through `#[serde(default)]` on the aggregates.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::convert::Infallible;

/// Persisted-state keys, one per aggregate.
pub const KEY_PLAYER: &str = "greenmarch.player";
pub const KEY_CAMPAIGN: &str = "greenmarch.campaign";
pub const KEY_TERRAIN: &str = "greenmarch.terrain";
pub const KEY_TOWN: &str = "greenmarch.town";
pub const KEY_MISSIONS: &str = "greenmarch.missions";

/// Abstract key-value blob store. Platform hosts provide the implementation
/// (browser local storage, disk, ...).
pub trait StateStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write `value` under `key`, overwriting any previous blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete the blob under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), Self::Error>;
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.blobs.keys().map(String::as_str).collect()
    }
}

impl StateStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        self.blobs.remove(key);
        Ok(())
    }
}

/// How a tolerant load resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    Missing,
    /// The blob existed but could not be parsed; it was discarded.
    Corrupt,
}

/// Serialize and write one aggregate under its key.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn save_aggregate<S, T>(store: &mut S, key: &str, value: &T) -> anyhow::Result<()>
where
    S: StateStore,
    S::Error: Into<anyhow::Error>,
    T: Serialize,
{
    let blob = serde_json::to_string(value)?;
    store.set(key, &blob).map_err(Into::into)?;
    Ok(())
}

/// Load one aggregate, falling back to `T::default()` on any expected failure
/// mode. Corruption never propagates to the caller as an error.
pub fn load_or_default<S, T>(store: &S, key: &str) -> (T, LoadStatus)
where
    S: StateStore,
    T: DeserializeOwned + Default,
{
    let blob = match store.get(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return (T::default(), LoadStatus::Missing),
        Err(err) => {
            log::warn!("failed to read {key}: {err}");
            return (T::default(), LoadStatus::Missing);
        }
    };
    match serde_json::from_str(&blob) {
        Ok(value) => (value, LoadStatus::Loaded),
        Err(err) => {
            log::warn!("discarding corrupt save under {key}: {err}");
            (T::default(), LoadStatus::Corrupt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(default)]
        count: u32,
        #[serde(default)]
        label: String,
    }

    #[test]
    fn round_trip_preserves_value() {
        let mut store = MemoryStore::new();
        let sample = Sample {
            count: 7,
            label: "seven".to_string(),
        };
        save_aggregate(&mut store, KEY_TOWN, &sample).expect("save");
        let (loaded, status) = load_or_default::<_, Sample>(&store, KEY_TOWN);
        assert_eq!(status, LoadStatus::Loaded);
        assert_eq!(loaded, sample);
    }

    #[test]
    fn missing_key_yields_default() {
        let store = MemoryStore::new();
        let (loaded, status) = load_or_default::<_, Sample>(&store, KEY_PLAYER);
        assert_eq!(status, LoadStatus::Missing);
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn corrupt_blob_is_discarded_not_propagated() {
        let mut store = MemoryStore::new();
        store.set(KEY_CAMPAIGN, "not json {{{").expect("set");
        let (loaded, status) = load_or_default::<_, Sample>(&store, KEY_CAMPAIGN);
        assert_eq!(status, LoadStatus::Corrupt);
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn partially_shaped_blob_defaults_missing_fields() {
        let mut store = MemoryStore::new();
        store.set(KEY_TERRAIN, r#"{"count": 3}"#).expect("set");
        let (loaded, status) = load_or_default::<_, Sample>(&store, KEY_TERRAIN);
        assert_eq!(status, LoadStatus::Loaded);
        assert_eq!(loaded.count, 3);
        assert_eq!(loaded.label, "");
    }

    #[test]
    fn keys_are_namespaced_and_distinct() {
        let keys = [KEY_PLAYER, KEY_CAMPAIGN, KEY_TERRAIN, KEY_TOWN, KEY_MISSIONS];
        for key in keys {
            assert!(key.starts_with("greenmarch."));
        }
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }
}
