mod codec;
mod dir;
mod discover;
mod error;
#[cfg(test)]
mod tests;

pub use codec::{decode, encode};
pub use dir::DirStore;
pub use discover::{discover, resolve_glob};
pub use error::StoreError;

use crate::identity::RouteId;

/// File name prefix reserved for shared objects that are not routes.
pub const SYSTEM_PREFIX: &str = "sys_";

/// Byte-level contract over a flat collection of config objects.
///
/// Keys are object names without extension (`blog_1a2b3c4d`, `sys_middlewares`).
/// Each call touches one object; there is no cross-object transaction.
pub trait ObjectStore {
    /// Route objects in discovery order. Reserved system objects are skipped.
    fn list(&self) -> Result<Vec<RouteId>, StoreError>;

    /// `None` when the object does not exist.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Create or replace an object. Readers never observe a partial write.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Returns whether something was removed.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;

    fn exists(&self, key: &str) -> Result<bool, StoreError>;
}
