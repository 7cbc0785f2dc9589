//! Persistence adapters: one opaque string value per key.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::Mutex;
use tempfile::NamedTempFile;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Raw value stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Write `value` only if the current value equals `expected` (`None` meaning
    /// absent). Returns whether the write happened.
    ///
    /// The default implementation is a plain read followed by a write and is
    /// only as atomic as the caller's own serialization.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> anyhow::Result<bool> {
        let current = self.get(key).await?;
        if current.as_deref() != expected {
            return Ok(false);
        }
        self.set(key, value).await?;
        Ok(true)
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    #[must_use]
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> anyhow::Result<bool> {
        let mut entries = self.entries.lock();
        if entries.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(true)
    }
}

/// One file per key under `dir`.
///
/// The key is percent-encoded into the file name. Writes go to a uniquely
/// named temporary sibling that is renamed into place, so readers see either
/// the old or the new value. Every write holds an exclusive advisory lock on
/// `<key>.lock`, which serializes writers across store instances and processes.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

#[derive(Debug, Clone)]
struct KeyFiles {
    dir: PathBuf,
    data: PathBuf,
    lock: PathBuf,
}

impl FileKeyValueStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    ///
    /// # Errors
    /// Returns an error for an empty key.
    pub fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        Ok(self.files_for(key)?.data)
    }

    fn files_for(&self, key: &str) -> anyhow::Result<KeyFiles> {
        if key.is_empty() {
            anyhow::bail!("storage key must not be empty");
        }
        let encoded = urlencoding::encode(key);
        Ok(KeyFiles {
            dir: self.dir.clone(),
            data: self.dir.join(format!("{encoded}.json")),
            lock: self.dir.join(format!("{encoded}.lock")),
        })
    }
}

/// Run blocking file work off the async runtime.
async fn blocking<T, F>(work: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("file store task failed")?
}

fn read_file(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Exclusive lock on the key, released when the returned file is dropped.
fn lock_key(files: &KeyFiles) -> anyhow::Result<File> {
    std::fs::create_dir_all(&files.dir)
        .with_context(|| format!("failed to create {}", files.dir.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&files.lock)
        .with_context(|| format!("failed to open {}", files.lock.display()))?;
    FileExt::lock_exclusive(&file)
        .with_context(|| format!("failed to lock {}", files.lock.display()))?;
    Ok(file)
}

/// Caller must hold the key lock.
fn replace_file(files: &KeyFiles, value: &str) -> anyhow::Result<()> {
    let mut tmp = NamedTempFile::new_in(&files.dir)
        .with_context(|| format!("failed to create a temporary file in {}", files.dir.display()))?;
    tmp.write_all(value.as_bytes())
        .context("failed to write temporary file")?;
    tmp.as_file()
        .sync_all()
        .context("failed to sync temporary file")?;
    tmp.persist(&files.data)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to move {} into place", files.data.display()))?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let files = self.files_for(key)?;
        blocking(move || read_file(&files.data)).await
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let files = self.files_for(key)?;
        let value = value.to_owned();
        blocking(move || {
            let _lock = lock_key(&files)?;
            replace_file(&files, &value)
        })
        .await
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> anyhow::Result<bool> {
        let files = self.files_for(key)?;
        let expected = expected.map(str::to_owned);
        let value = value.to_owned();
        blocking(move || {
            let _lock = lock_key(&files)?;
            if read_file(&files.data)?.as_deref() != expected.as_deref() {
                return Ok(false);
            }
            replace_file(&files, &value)?;
            Ok(true)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_get_set() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("userData").await.unwrap(), None);
        store.set("userData", "{}").await.unwrap();
        assert_eq!(store.get("userData").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_in_memory_compare_and_set() {
        let store = InMemoryKeyValueStore::with_entries([("k", "v1")]);

        assert!(!store.compare_and_set("k", None, "v2").await.unwrap());
        assert!(!store.compare_and_set("k", Some("other"), "v2").await.unwrap());
        assert!(store.compare_and_set("k", Some("v1"), "v2").await.unwrap());
        assert_eq!(store.snapshot("k").as_deref(), Some("v2"));

        assert!(store.compare_and_set("new", None, "x").await.unwrap());
        assert_eq!(store.snapshot("new").as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("data"));

        assert_eq!(store.get("userData").await.unwrap(), None);
        store.set("userData", r#"{"displayName":"Asha"}"#).await.unwrap();
        assert_eq!(
            store.get("userData").await.unwrap().as_deref(),
            Some(r#"{"displayName":"Asha"}"#)
        );

        store.set("userData", "{}").await.unwrap();
        assert_eq!(store.get("userData").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_file_store_encodes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        let path = store.path_for("netswith:theme_mode").unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "netswith%3Atheme_mode.json"
        );

        store.set("netswith:theme_mode", "light").await.unwrap();
        assert!(path.is_file());
        assert!(store.path_for("").is_err());
    }

    #[tokio::test]
    async fn test_file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        store.set("userData", "{}").await.unwrap();
        store.set("userData", "{\"a\":1}").await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["userData.json", "userData.lock"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_compare_and_set_is_atomic_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let path = dir.path().to_path_buf();
            handles.push(tokio::spawn(async move {
                let store = FileKeyValueStore::new(path);
                store
                    .compare_and_set("k", None, &format!("writer {i}"))
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_file_store_compare_and_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        assert!(store.compare_and_set("k", None, "v1").await.unwrap());
        assert!(!store.compare_and_set("k", None, "v2").await.unwrap());
        assert!(store.compare_and_set("k", Some("v1"), "v2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    }
}
