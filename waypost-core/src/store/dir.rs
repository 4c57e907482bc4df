use crate::identity::{OBJECT_EXTENSION, RouteId};
use crate::store::{ObjectStore, SYSTEM_PREFIX, StoreError, discover};
use std::fs;
use std::io::{ErrorKind, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Mode of written objects; the proxy usually runs as another user.
const OBJECT_MODE: u32 = 0o644;

/// One YAML file per object in a single directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the object `key`. Keys that could leave the root are refused.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !is_plain_key(key) {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{}.{}", key, OBJECT_EXTENSION)))
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && !key.contains("..")
        && !key.contains(['/', '\\', '\0'])
}

impl ObjectStore for DirStore {
    fn list(&self) -> Result<Vec<RouteId>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::io(
                &self.root,
                std::io::Error::new(ErrorKind::NotFound, "config directory does not exist"),
            ));
        }

        let ids = discover(&self.root, &format!("*.{}", OBJECT_EXTENSION))?
            .iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !n.starts_with(SYSTEM_PREFIX))
            })
            .filter_map(|p| RouteId::from_path(p))
            .collect();
        Ok(ids)
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;

        // Stage next to the target so the final rename stays on one filesystem.
        let mut staged =
            NamedTempFile::new_in(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        staged
            .write_all(bytes)
            .map_err(|e| StoreError::io(staged.path(), e))?;
        staged
            .as_file()
            .set_permissions(fs::Permissions::from_mode(OBJECT_MODE))
            .map_err(|e| StoreError::io(staged.path(), e))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| StoreError::io(staged.path(), e))?;
        staged
            .persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;

        debug!(path = %path.display(), bytes = bytes.len(), "config object written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "config object removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        path.try_exists().map_err(|e| StoreError::io(path, e))
    }
}
