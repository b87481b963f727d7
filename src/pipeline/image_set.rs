//! Deduplicating set of image references shared by pipeline tasks.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

/// Thread-safe, append-only set of image file names.
///
/// Only insertion and point-in-time snapshots are exposed; there is no
/// iterator that could race with concurrent inserts.
#[derive(Debug, Default)]
pub struct ImageSet {
    names: RwLock<HashSet<String>>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name. Returns `true` if it was not already present.
    pub fn insert(&self, name: impl Into<String>) -> bool {
        // A panic while holding the lock cannot leave a HashSet<String>
        // half-inserted, so a poisoned lock is still usable.
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the current contents, sorted.
    ///
    /// Only complete once every task that may insert has been joined.
    pub fn snapshot(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_starts_empty() {
        let set = ImageSet::new();
        assert!(set.is_empty());
        assert!(set.snapshot().is_empty());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let set = ImageSet::new();
        assert!(set.insert("a.jpg"));
        assert!(!set.insert("a.jpg"));
        assert!(set.insert("b.jpg"));

        assert_eq!(set.len(), 2);
        assert!(set.contains("a.jpg"));
        assert_eq!(set.snapshot(), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let set = ImageSet::new();
        set.insert("a.jpg");

        let mut snapshot = set.snapshot();
        snapshot.push("injected.jpg".to_string());
        set.insert("b.jpg");

        assert_eq!(set.snapshot(), vec!["a.jpg", "b.jpg"]);
        assert_eq!(snapshot, vec!["a.jpg", "injected.jpg"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_of_same_name() {
        let set = Arc::new(ImageSet::new());

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let set = Arc::clone(&set);
                tokio::spawn(async move { set.insert("same.jpg") })
            })
            .collect();

        let mut newly_inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                newly_inserted += 1;
            }
        }

        assert_eq!(newly_inserted, 1);
        assert_eq!(set.snapshot(), vec!["same.jpg"]);
    }

    #[test]
    fn test_concurrent_inserts_from_threads() {
        let set = Arc::new(ImageSet::new());

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let set = Arc::clone(&set);
                scope.spawn(move || {
                    for i in 0..100 {
                        set.insert(format!("img-{}.jpg", (worker * 100 + i) % 50));
                    }
                });
            }
        });

        assert_eq!(set.len(), 50);
    }
}
