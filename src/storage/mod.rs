pub mod records;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

pub use records::{new_game_id, MoveHistoryEntry, RecordedMove, ScoreEntry};

/// Append-only list persisted as one pretty-printed JSON array.
///
/// Loaded once when opened; every save rewrites the whole file.
#[derive(Debug)]
pub struct JsonListStore<T> {
    path: PathBuf,
    entries: Vec<T>,
}

impl<T> JsonListStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Missing or unreadable files open as an empty list.
    pub fn open(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "corrupt store, starting empty");
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable store, starting empty");
                Vec::new()
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "store loaded");
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, body)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), entries = self.entries.len(), "store saved");
        Ok(())
    }

    /// Appends and immediately persists. On a failed save the entry is
    /// dropped again so memory matches the file.
    pub fn append(&mut self, entry: T) -> Result<()> {
        self.push(entry);
        if let Err(err) = self.save() {
            self.entries.pop();
            return Err(err);
        }
        Ok(())
    }
}

pub type ScoreStore = JsonListStore<ScoreEntry>;
pub type HistoryStore = JsonListStore<MoveHistoryEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, moves: u32) -> ScoreEntry {
        ScoreEntry {
            name: name.to_string(),
            disks: 3,
            time: 12.5,
            moves,
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ScoreStore::open(&dir.path().join("absent.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn failed_append_leaves_store_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.json");
        fs::create_dir(&path).expect("mkdir");
        let mut store = ScoreStore::open(&path);
        assert!(store.is_empty());

        assert!(store.append(entry("Ada", 7)).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.json");
        fs::write(&path, "{not json").expect("write");
        let store = ScoreStore::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn save_rewrites_whole_file_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("scores.json");

        let mut store = ScoreStore::open(&path);
        store.append(entry("ada", 7)).expect("save");
        store.append(entry("bob", 9)).expect("save");

        let reloaded = ScoreStore::open(&path);
        assert_eq!(reloaded.entries(), store.entries());
        assert_eq!(reloaded.len(), 2);

        let raw = fs::read_to_string(&path).expect("read");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(parsed[0]["name"], "ada");
        assert_eq!(parsed[1]["moves"], 9);
    }
}
