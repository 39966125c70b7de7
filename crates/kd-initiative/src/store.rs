//! Blob persistence for initiative state.

use std::collections::HashMap;
use std::io;

/// Stores one opaque string per channel.
///
/// Implementations know nothing about what the strings contain.
pub trait BlobStore {
    /// Fetch the blob for a channel, if any.
    fn get(&self, channel: &str) -> io::Result<Option<String>>;

    /// Store the blob for a channel, replacing any previous one.
    fn put(&mut self, channel: &str, blob: &str) -> io::Result<()>;

    /// Remove the blob for a channel. Removing a missing blob is not an error.
    fn delete(&mut self, channel: &str) -> io::Result<()>;
}

/// A [`BlobStore`] held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blob exists for the channel.
    pub fn contains(&self, channel: &str) -> bool {
        self.blobs.contains_key(channel)
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, channel: &str) -> io::Result<Option<String>> {
        Ok(self.blobs.get(channel).cloned())
    }

    fn put(&mut self, channel: &str, blob: &str) -> io::Result<()> {
        self.blobs.insert(channel.to_string(), blob.to_string());
        Ok(())
    }

    fn delete(&mut self, channel: &str) -> io::Result<()> {
        self.blobs.remove(channel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete() {
        let mut store = MemoryBlobStore::new();
        assert_eq!(store.get("c1").unwrap(), None);
        store.put("c1", "one").unwrap();
        store.put("c1", "two").unwrap();
        assert_eq!(store.get("c1").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
        store.delete("c1").unwrap();
        store.delete("c1").unwrap();
        assert!(store.is_empty());
    }
}
