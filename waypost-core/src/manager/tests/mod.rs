
use crate::identity::RouteId;
use crate::manager::RouteManager;
use crate::route::{Backend, RouteDescription};
use crate::store::{DirStore, ObjectStore, StoreError};
use crate::testing::{StaticHasher, StaticHostIp};
use std::cell::Cell;
use std::net::Ipv4Addr;
use std::path::Path;

fn manager(dir: &Path) -> RouteManager {
    RouteManager::open(dir, "le")
        .with_hasher(StaticHasher)
        .with_host_ip(StaticHostIp::new(Ipv4Addr::new(10, 1, 2, 3)))
}

fn route(name: &str) -> RouteDescription {
    RouteDescription {
        name: name.to_string(),
        domain: format!("{}.example.com", name),
        backend: Backend::new("http://10.0.0.5:8080"),
        https: true,
        force_tls: true,
        hsts: true,
        ..Default::default()
    }
}

/// Directory store whose writes start failing after `budget` successes.
struct FlakyStore {
    inner: DirStore,
    budget: Cell<usize>,
}

impl FlakyStore {
    fn new(root: &Path, budget: usize) -> Self {
        Self {
            inner: DirStore::new(root),
            budget: Cell::new(budget),
        }
    }
}

impl ObjectStore for FlakyStore {
    fn list(&self) -> Result<Vec<RouteId>, StoreError> {
        self.inner.list()
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let left = self.budget.get();
        if left == 0 {
            return Err(StoreError::io(
                self.inner.path_for(key)?,
                std::io::Error::other("disk full"),
            ));
        }
        self.budget.set(left - 1);
        self.inner.write(key, bytes)
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.remove(key)
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(key)
    }
}
