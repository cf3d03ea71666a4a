use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{HarvestError, Result};
use crate::model::Poem;

/// Accumulates poems for one run, rejects repeated URLs, and snapshots the
/// whole collection to disk every `interval` accepted poems.
pub struct PoemStore {
    path: PathBuf,
    interval: usize,
    poems: Vec<Poem>,
    seen: HashSet<String>,
}

impl PoemStore {
    pub fn new(path: impl Into<PathBuf>, interval: usize) -> Self {
        PoemStore {
            path: path.into(),
            interval,
            poems: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.poems.len()
    }

    /// Returns `false` (and keeps the first record) when the URL is known.
    pub fn add(&mut self, poem: Poem) -> bool {
        if !self.seen.insert(poem.url.clone()) {
            return false;
        }
        self.poems.push(poem);

        if self.interval > 0 && self.poems.len() % self.interval == 0 {
            if let Err(e) = self.checkpoint() {
                warn!("Checkpoint failed, continuing: {}", e);
            }
        }
        true
    }

    /// Overwrite the dataset file with the current collection.
    pub fn checkpoint(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.poems)?;
        info!(
            "Checkpoint: {} poems saved to {}",
            self.poems.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Sort by comment count (descending, ties keep crawl order) and persist.
    pub fn finish(mut self) -> Result<Vec<Poem>> {
        self.poems.sort_by(|a, b| b.comment_count.cmp(&a.comment_count));
        self.checkpoint()?;
        Ok(self.poems)
    }
}

/// Read a dataset file strictly: missing or malformed files are errors.
pub fn read_dataset<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = fs::read_to_string(path).map_err(|source| HarvestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Previously persisted poems, or nothing. An unreadable or mismatched file
/// is logged and treated as absent.
pub fn load_existing(path: &Path) -> Vec<Poem> {
    if !path.exists() {
        return Vec::new();
    }
    match read_dataset(path) {
        Ok(poems) => poems,
        Err(e) => {
            warn!("Unable to load existing data from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Pretty UTF-8 JSON written to a sibling temp file, then renamed over `path`.
/// Readers see either the previous snapshot or the new one, never a mix.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let io_err = |source: std::io::Error| HarvestError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|source| HarvestError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poem(url: &str, comments: u32) -> Poem {
        Poem {
            title: format!("Poème {}", url),
            url: url.to_string(),
            comment_count: comments,
            author: "Anonyme".into(),
            themes: vec!["Été".into()],
        }
    }

    #[test]
    fn first_sighting_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PoemStore::new(dir.path().join("p.json"), 0);

        assert!(store.add(poem("https://x/1/", 1)));
        let mut dup = poem("https://x/1/", 99);
        dup.author = "Autre".into();
        assert!(!store.add(dup));

        let poems = store.finish().unwrap();
        assert_eq!(poems.len(), 1);
        assert_eq!(poems[0].author, "Anonyme");
    }

    #[test]
    fn checkpoints_every_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut store = PoemStore::new(&path, 2);

        store.add(poem("https://x/1/", 1));
        assert!(!path.exists());
        store.add(poem("https://x/2/", 2));
        store.add(poem("https://x/3/", 3));

        let on_disk: Vec<Poem> = read_dataset(&path).unwrap();
        assert_eq!(on_disk.len(), 2);
        assert_eq!(on_disk[0].url, "https://x/1/");
    }

    #[test]
    fn finish_sorts_by_comments_and_keeps_ties_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut store = PoemStore::new(&path, 0);
        store.add(poem("https://x/a/", 3));
        store.add(poem("https://x/b/", 10));
        store.add(poem("https://x/c/", 3));

        let poems = store.finish().unwrap();
        let urls: Vec<_> = poems.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/b/", "https://x/a/", "https://x/c/"]);

        let on_disk: Vec<Poem> = read_dataset(&path).unwrap();
        assert_eq!(on_disk, poems);
    }

    #[test]
    fn snapshot_is_complete_json_with_literal_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut store = PoemStore::new(&path, 1);
        store.add(poem("https://x/1/", 0));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Été"));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for record in value.as_array().unwrap() {
            for field in ["title", "url", "comments", "author", "categories"] {
                assert!(record.get(field).is_some(), "missing {}", field);
            }
        }
        // no stray temp files next to the dataset
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn load_existing_tolerates_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        assert!(load_existing(&path).is_empty());

        fs::write(&path, "{ not json").unwrap();
        assert!(load_existing(&path).is_empty());

        fs::write(&path, r#"[{"title": "sans url"}]"#).unwrap();
        assert!(load_existing(&path).is_empty());

        write_json_atomic(&path, &vec![poem("https://x/1/", 5)]).unwrap();
        assert_eq!(load_existing(&path).len(), 1);
    }
}
