use crate::store::StoreError;
use glob::{Pattern, glob};
use std::path::{Path, PathBuf};

/// Discovers files matching a glob pattern below `root`.
///
/// Returns the matching regular files in sorted order. Unreadable entries and
/// directories are filtered out.
///
/// # Errors
///
/// Returns `StoreError::Glob` if the pattern is malformed.
pub fn discover(root: &Path, glob_pattern: &str) -> Result<Vec<PathBuf>, StoreError> {
    let pattern = &resolve_glob(root, glob_pattern);
    let mut paths: Vec<_> = glob(pattern)
        .map_err(|e| StoreError::Glob {
            pattern: pattern.to_string(),
            source: e,
        })?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    paths.sort();
    Ok(paths)
}

/// Joins `pattern` to `root`. Glob metacharacters inside `root` are escaped so
/// only `pattern` is interpreted.
pub fn resolve_glob(root: &Path, pattern: &str) -> String {
    let root = Pattern::escape(&root.to_string_lossy());
    Path::new(&root).join(pattern).to_string_lossy().into_owned()
}
