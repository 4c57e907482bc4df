use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// File extension of every stored config object.
pub const OBJECT_EXTENSION: &str = "yaml";

/// Length of the hex tag appended to a route name.
pub const HASH_LEN: usize = 8;

/// Stable identifier of a route object: `name_hash8`.
///
/// Objects written by older versions carry a single-part id (just the name).
/// Those are still valid ids, they are only reported as [`RouteId::is_legacy`]
/// so the schema migration can give them a hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Derive a fresh id for `name` with a random hash tag.
    pub fn generate(name: &str) -> Self {
        Self(format!("{}_{}", name, rand_hash()))
    }

    /// Wrap an existing identifier verbatim.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Recover the id from a stored object's path (`dir/blog_1a2b3c4d.yaml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        Some(Self(stem.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The user-chosen part of the id.
    pub fn name(&self) -> &str {
        match self.split() {
            Some((name, _)) => name,
            None => &self.0,
        }
    }

    /// The random tag, if the id has the two-part form.
    pub fn hash(&self) -> Option<&str> {
        self.split().map(|(_, hash)| hash)
    }

    pub fn is_legacy(&self) -> bool {
        self.split().is_none()
    }

    /// A two-part id keeping this whole (legacy) id as the name part.
    pub fn with_fresh_hash(&self) -> Self {
        Self::generate(self.name())
    }

    /// Key of the plaintext router.
    pub fn http_router(&self) -> String {
        format!("{}-http", self.0)
    }

    /// Key of a route-local middleware, e.g. `blog_1a2b3c4d-headers`.
    pub fn middleware(&self, kind: &str) -> String {
        format!("{}-{}", self.0, kind)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, OBJECT_EXTENSION)
    }

    fn split(&self) -> Option<(&str, &str)> {
        let (name, hash) = self.0.rsplit_once('_')?;
        if name.is_empty() || !looks_like_hash(hash) {
            return None;
        }
        Some((name, hash))
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Eight lowercase hex chars taken from the digest of 16 random bytes.
///
/// The tag only separates routes sharing a name, it is not a secret.
pub fn rand_hash() -> String {
    let mut seed = [0u8; 16];
    rand::rng().fill_bytes(&mut seed);
    let digest = Sha256::digest(seed);
    digest
        .iter()
        .take(HASH_LEN / 2)
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn looks_like_hash(s: &str) -> bool {
    s.len() == HASH_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn generate_appends_hash_to_name() {
        // Act
        let id = RouteId::generate("blog");

        // Assert
        assert_eq!(id.name(), "blog");
        let hash = id.hash().unwrap();
        assert_eq!(hash.len(), HASH_LEN);
        assert!(hash.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        assert!(!id.is_legacy());
    }

    #[test]
    fn generated_hashes_differ() {
        let a = RouteId::generate("blog");
        let b = RouteId::generate("blog");

        assert_ne!(a, b);
    }

    #[test]
    fn name_is_recovered_from_paths() {
        let cases = [
            ("./dynamic.d/Test_12345678.yaml", "Test"),
            ("./dynamic.d/Test.yaml", "Test"),
            ("./dynamic.d/Test_12345678", "Test"),
        ];

        for (path, name) in cases {
            let id = RouteId::from_path(&PathBuf::from(path)).unwrap();
            assert_eq!(id.name(), name, "path {path}");
        }
    }

    #[test]
    fn from_path_strips_directory_and_extension() {
        let id = RouteId::from_path(Path::new("/etc/traefik/blog_0a1b2c3d.yaml")).unwrap();

        assert_eq!(id.as_str(), "blog_0a1b2c3d");
        assert_eq!(id.file_name(), "blog_0a1b2c3d.yaml");
    }

    #[test]
    fn single_part_ids_are_legacy() {
        let id = RouteId::new("Test");

        assert!(id.is_legacy());
        assert_eq!(id.name(), "Test");
        assert_eq!(id.hash(), None);
    }

    #[test]
    fn non_hash_suffix_is_part_of_the_name() {
        let id = RouteId::new("my_site");

        assert!(id.is_legacy());
        assert_eq!(id.name(), "my_site");

        let migrated = id.with_fresh_hash();
        assert_eq!(migrated.name(), "my_site");
        assert!(!migrated.is_legacy());
    }

    #[test]
    fn derived_keys_use_the_full_id() {
        let id = RouteId::new("blog_0a1b2c3d");

        assert_eq!(id.http_router(), "blog_0a1b2c3d-http");
        assert_eq!(id.middleware("headers"), "blog_0a1b2c3d-headers");
    }
}
