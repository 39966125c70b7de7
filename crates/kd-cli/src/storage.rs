//! On-disk layout of a data directory.
//!
//! ```text
//! <data>/cards.json
//! <data>/initiative/<channel>.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kd_core::MemoryStore;
use kd_initiative::BlobStore;

const CARDS_FILE: &str = "cards.json";
const INITIATIVE_DIR: &str = "initiative";

/// Read the card file. A missing file is an empty store.
pub fn load_cards(data: &Path) -> Result<MemoryStore, String> {
    let path = data.join(CARDS_FILE);
    match fs::read_to_string(&path) {
        Ok(json) => MemoryStore::from_json(&json)
            .map_err(|e| format!("cannot read {}: {e}", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(MemoryStore::new()),
        Err(e) => Err(format!("cannot read {}: {e}", path.display())),
    }
}

/// Write the card file, creating the data directory if needed.
pub fn save_cards(data: &Path, store: &MemoryStore) -> Result<(), String> {
    let path = data.join(CARDS_FILE);
    let json = store
        .to_json()
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    fs::create_dir_all(data)
        .and_then(|()| fs::write(&path, json))
        .map_err(|e| format!("cannot write {}: {e}", path.display()))
}

/// A [`BlobStore`] keeping one JSON file per channel.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    dir: PathBuf,
}

impl DirBlobStore {
    pub fn new(data: &Path) -> Self {
        Self {
            dir: data.join(INITIATIVE_DIR),
        }
    }

    fn path(&self, channel: &str) -> io::Result<PathBuf> {
        let valid = !channel.is_empty()
            && channel
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !channel.starts_with('.');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid channel name '{channel}'"),
            ));
        }
        Ok(self.dir.join(format!("{channel}.json")))
    }
}

impl BlobStore for DirBlobStore {
    fn get(&self, channel: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(channel)?) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn put(&mut self, channel: &str, blob: &str) -> io::Result<()> {
        let path = self.path(channel)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, blob)
    }

    fn delete(&mut self, channel: &str) -> io::Result<()> {
        match fs::remove_file(self.path(channel)?) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kd_core::CharacterStore;
    use tempfile::TempDir;

    #[test]
    fn cards_round_trip() {
        let dir = TempDir::new().unwrap();
        assert!(load_cards(dir.path()).unwrap().card_names().next().is_none());

        let mut store = MemoryStore::new();
        store.set_attribute("pc", "力量", 60, 100);
        save_cards(dir.path(), &store).unwrap();
        assert_eq!(load_cards(dir.path()).unwrap(), store);
    }

    #[test]
    fn saved_file_holds_the_cards() {
        let dir = TempDir::new().unwrap();
        let mut store = MemoryStore::new();
        store.create_card("Alice");
        save_cards(dir.path(), &store).unwrap();
        let written = fs::read_to_string(dir.path().join(CARDS_FILE)).unwrap();
        assert!(!written.is_empty());
        assert!(written.contains("Alice"));
    }

    #[test]
    fn corrupt_card_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CARDS_FILE), "{oops").unwrap();
        assert!(load_cards(dir.path()).is_err());
    }

    #[test]
    fn blob_files() {
        let dir = TempDir::new().unwrap();
        let mut store = DirBlobStore::new(dir.path());
        assert_eq!(store.get("table-1").unwrap(), None);
        store.put("table-1", "{}").unwrap();
        assert!(dir.path().join("initiative/table-1.json").exists());
        assert_eq!(store.get("table-1").unwrap().as_deref(), Some("{}"));
        store.delete("table-1").unwrap();
        store.delete("table-1").unwrap();
        assert_eq!(store.get("table-1").unwrap(), None);
    }

    #[test]
    fn channel_names_cannot_escape() {
        let dir = TempDir::new().unwrap();
        let mut store = DirBlobStore::new(dir.path());
        for name in ["", "../x", "a/b", ".hidden"] {
            assert!(store.put(name, "{}").is_err(), "{name:?} accepted");
        }
    }
}
