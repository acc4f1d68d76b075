//! Filesystem-based credential store.
//!
//! Stores secrets as a JSON object in `~/.config/shipnote/credentials.json`,
//! readable only by the owner on Unix.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{CredentialError, CredentialStore};

/// Filesystem-based credential store.
pub struct FileCredentialStore {
    path: Option<PathBuf>,
}

impl FileCredentialStore {
    /// Create a store at the default location.
    pub fn new() -> Self {
        let path = dirs::config_dir().map(|d| {
            d.join(crate::constants::CONFIG_DIR)
                .join(crate::constants::CREDENTIALS_FILENAME)
        });
        Self { path }
    }

    /// Create a store backed by a specific file (useful for testing).
    pub fn new_with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Return the credential file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn require_path(&self) -> Result<&Path, CredentialError> {
        self.path.as_deref().ok_or(CredentialError::NoConfigDir)
    }

    fn load(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let path = self.require_path()?;
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(path).map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| CredentialError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let path = self.require_path()?;
        let io_err = |source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(values).map_err(|source| {
            CredentialError::Corrupt {
                path: path.to_path_buf(),
                source,
            }
        })?;
        write_private(path, content.as_bytes()).map_err(io_err)
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `content` to a file only the owner can read.
///
/// New files are created with mode 0600; an existing file is tightened
/// before it is truncated.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    if path.exists() {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<bool, CredentialError> {
        let mut values = self.load()?;
        let removed = values.remove(key).is_some();
        if removed {
            self.save(&values)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileCredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new_with_path(dir.path().join("nested").join("credentials.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get("github").unwrap(), None);
        assert!(!store.remove("github").unwrap());
    }

    #[test]
    fn set_get_remove() {
        let (_dir, store) = temp_store();
        store.set("github", "ghp_secret").unwrap();
        store.set("other", "value").unwrap();
        assert_eq!(store.get("github").unwrap().as_deref(), Some("ghp_secret"));

        assert!(store.remove("github").unwrap());
        assert_eq!(store.get("github").unwrap(), None);
        assert_eq!(store.get("other").unwrap().as_deref(), Some("value"));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = temp_store();
        store.set("github", "ghp_secret").unwrap();
        let mode = std::fs::metadata(store.path().unwrap()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_readable_file_is_tightened_on_save() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = temp_store();
        let path = store.path().unwrap().to_path_buf();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        store.set("github", "ghp_secret").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get("github").unwrap().as_deref(), Some("ghp_secret"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (_dir, store) = temp_store();
        let path = store.path().unwrap().to_path_buf();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        let err = store.get("github").unwrap_err();
        assert!(err.to_string().contains("corrupt"), "got: {err}");
    }

    #[test]
    fn default_path_mentions_app_dir() {
        if let Some(path) = FileCredentialStore::new().path() {
            assert!(path.to_string_lossy().contains("shipnote"));
        }
    }
}
