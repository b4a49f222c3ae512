use super::KeyValueStore;
use crate::error::{PortalError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Browsers give each origin about 5 MiB of local storage.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

const VALUE_EXT: &str = "json";

pub struct FileStorage {
    root: PathBuf,
    quota: u64,
}

impl FileStorage {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            quota: DEFAULT_QUOTA_BYTES,
        }
    }

    pub fn with_quota(mut self, quota: u64) -> Self {
        self.quota = quota;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn quota(&self) -> u64 {
        self.quota
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", key, VALUE_EXT))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(PortalError::Io)?;
        }
        Ok(())
    }

    /// Bytes used by every stored value except `key`.
    fn used_bytes_excluding(&self, key: &str) -> Result<u64> {
        let skip = self.value_path(key);
        let mut used = 0;
        for entry in fs::read_dir(&self.root).map_err(PortalError::Io)? {
            let path = entry.map_err(PortalError::Io)?.path();
            if path == skip || path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXT) {
                continue;
            }
            used += fs::metadata(&path).map_err(PortalError::Io)?.len();
        }
        Ok(used)
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(PortalError::Io)?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;

        let needed = self.used_bytes_excluding(key)? + value.len() as u64;
        if needed > self.quota {
            return Err(PortalError::StorageQuotaExceeded {
                needed,
                quota: self.quota,
            });
        }

        let target = self.value_path(key);
        let tmp = self
            .root
            .join(format!(".{}-{}.tmp", key, std::process::id()));
        let written = fs::write(&tmp, value).and_then(|_| fs::rename(&tmp, &target));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(match e.kind() {
                ErrorKind::StorageFull => PortalError::StorageQuotaExceeded {
                    needed,
                    quota: self.quota,
                },
                _ => PortalError::Io(e),
            });
        }

        debug!(key, bytes = value.len(), path = %target.display(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key);
        if path.exists() {
            fs::remove_file(path).map_err(PortalError::Io)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));
        (dir, storage)
    }

    #[test]
    fn missing_key_reads_none() {
        let (_dir, storage) = setup();
        assert_eq!(storage.get("cart").unwrap(), None);
    }

    #[test]
    fn set_creates_dir_and_reads_back() {
        let (_dir, storage) = setup();
        storage.set("cart", "{\"a\":1}").unwrap();
        assert!(storage.root().join("cart.json").exists());
        assert_eq!(storage.get("cart").unwrap().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn overwrite_leaves_no_tmp_files() {
        let (_dir, storage) = setup();
        storage.set("cart", "one").unwrap();
        storage.set("cart", "two").unwrap();
        assert_eq!(storage.get("cart").unwrap().as_deref(), Some("two"));

        for entry in fs::read_dir(storage.root()).unwrap() {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }

    #[test]
    fn quota_counts_other_keys() {
        let (_dir, storage) = setup();
        let storage = storage.with_quota(10);
        storage.set("a", "123456").unwrap();

        // Replacing a key does not count its old size
        storage.set("a", "1234567890").unwrap();

        let err = storage.set("b", "1").unwrap_err();
        assert!(matches!(
            err,
            PortalError::StorageQuotaExceeded {
                needed: 11,
                quota: 10
            }
        ));
        assert_eq!(storage.get("b").unwrap(), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, storage) = setup();
        storage.set("cart", "x").unwrap();
        storage.remove("cart").unwrap();
        storage.remove("cart").unwrap();
        assert_eq!(storage.get("cart").unwrap(), None);
    }
}
