//! Named cache partitions
//!
//! A partition maps request URLs to captured responses. Entries never expire;
//! a partition goes away only when it is deleted as a whole, which is how a
//! version bump invalidates everything.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::models::Response;

type Partition = HashMap<String, Response>;

/// Every partition, in creation order
#[derive(Default)]
pub struct CacheStorage {
    partitions: RwLock<Vec<(String, Partition)>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    // The maps hold plain values, so a poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Vec<(String, Partition)>> {
        self.partitions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(String, Partition)>> {
        self.partitions.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create the partition if it does not exist yet
    pub fn open(&self, name: &str) {
        let mut partitions = self.write();
        if !partitions.iter().any(|(n, _)| n == name) {
            partitions.push((name.to_string(), Partition::new()));
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.read().iter().any(|(n, _)| n == name)
    }

    /// Returns whether a partition was removed
    pub fn delete(&self, name: &str) -> bool {
        let mut partitions = self.write();
        let before = partitions.len();
        partitions.retain(|(n, _)| n != name);
        partitions.len() != before
    }

    pub fn names(&self) -> Vec<String> {
        self.read().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Store a response, opening the partition on first use
    pub fn put(&self, name: &str, url: &str, response: Response) {
        let mut partitions = self.write();
        match partitions.iter_mut().find(|(n, _)| n == name) {
            Some((_, partition)) => {
                partition.insert(url.to_string(), response);
            }
            None => {
                let mut partition = Partition::new();
                partition.insert(url.to_string(), response);
                partitions.push((name.to_string(), partition));
            }
        }
    }

    /// Look up `url` in one partition
    pub fn match_in(&self, name: &str, url: &str) -> Option<Response> {
        self.read()
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, partition)| partition.get(url).cloned())
    }

    /// Look up `url` across partitions, oldest partition first
    pub fn match_any(&self, url: &str) -> Option<Response> {
        self.read()
            .iter()
            .find_map(|(_, partition)| partition.get(url).cloned())
    }

    /// URLs cached in a partition, sorted
    pub fn keys(&self, name: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .read()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, partition)| partition.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_match() {
        let caches = CacheStorage::new();
        caches.put("static-v2", "https://app.test/", Response::new(200, "shell"));

        assert!(caches.has("static-v2"));
        assert_eq!(
            caches.match_in("static-v2", "https://app.test/").unwrap().body,
            "shell"
        );
        assert!(caches.match_in("dynamic-v2", "https://app.test/").is_none());
        assert!(caches.match_any("https://app.test/").is_some());
    }

    #[test]
    fn test_match_any_prefers_older_partition() {
        let caches = CacheStorage::new();
        caches.open("static-v2");
        caches.open("dynamic-v2");
        caches.put("dynamic-v2", "/a", Response::new(200, "dynamic"));
        caches.put("static-v2", "/a", Response::new(200, "static"));

        assert_eq!(caches.match_any("/a").unwrap().body, "static");
    }

    #[test]
    fn test_delete_drops_entries() {
        let caches = CacheStorage::new();
        caches.put("static-v1", "/a", Response::new(200, "old"));

        assert!(caches.delete("static-v1"));
        assert!(!caches.delete("static-v1"));
        assert!(caches.match_any("/a").is_none());
        assert!(caches.names().is_empty());
    }

    #[test]
    fn test_keys_sorted() {
        let caches = CacheStorage::new();
        caches.put("p", "/b", Response::new(200, ""));
        caches.put("p", "/a", Response::new(200, ""));
        assert_eq!(caches.keys("p"), vec!["/a".to_string(), "/b".to_string()]);
        assert!(caches.keys("missing").is_empty());
    }
}
