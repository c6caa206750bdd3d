use dashmap::DashSet;

/// Keys that were handed to the loader and haven't been claimed yet.
#[derive(Debug, Default)]
pub struct PendingSet {
    keys: DashSet<String>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key wasn't pending before.
    pub fn insert(&self, key: &str) -> bool {
        self.keys.insert(key.to_string())
    }

    pub fn remove(&self, key: &str) -> bool {
        self.keys.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&self) {
        self.keys.clear()
    }
}
