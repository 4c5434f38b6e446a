//! In-memory tile store.
//!
//! Ephemeral backend used by tests and by callers that want caching without
//! persistence. Lock hold times are bounded to the map operation itself, so
//! the mutex never spans an await point.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{BoxFuture, StoreError, TileStore};

/// In-process tile store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryTileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl TileStore for MemoryTileStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, StoreError>> {
        let value = self.entries.lock().get(key).cloned();
        Box::pin(async move { Ok(value) })
    }

    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), StoreError>> {
        self.entries.lock().insert(key.to_string(), value);
        Box::pin(async move { Ok(()) })
    }

    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
        let present = self.entries.lock().contains_key(key);
        Box::pin(async move { Ok(present) })
    }

    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        let keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        Box::pin(async move { Ok(keys) })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        self.entries.lock().clear();
        Box::pin(async move { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryTileStore::new();

        store.set("14_100_200", vec![1, 2, 3]).await.unwrap();
        let value = store.get("14_100_200").await.unwrap();

        assert_eq!(value, Some(vec![1, 2, 3]));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryTileStore::new();
        assert_eq!(store.get("14_0_0").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryTileStore::new();

        store.set("10_1_1", vec![1]).await.unwrap();
        store.set("10_1_1", vec![2, 2]).await.unwrap();

        assert_eq!(store.get("10_1_1").await.unwrap(), Some(vec![2, 2]));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_contains() {
        let store = MemoryTileStore::new();

        assert!(!store.contains("12_5_5").await.unwrap());
        store.set("12_5_5", vec![0]).await.unwrap();
        assert!(store.contains("12_5_5").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_and_clear() {
        let store = MemoryTileStore::new();
        store.set("10_1_2", vec![1]).await.unwrap();
        store.set("11_3_4", vec![2]).await.unwrap();

        let mut keys = store.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["10_1_2".to_string(), "11_3_4".to_string()]);

        store.clear().await.unwrap();
        assert!(store.is_empty());
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemoryTileStore>();
    }
}
