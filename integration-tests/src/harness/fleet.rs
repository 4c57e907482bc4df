use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use waypost_core::graph::ConfigGraph;
use waypost_core::identity::RouteId;
use waypost_core::manager::RouteManager;
use waypost_core::route::{Backend, RouteDescription};
use waypost_core::store::decode;
use waypost_core::testing::{StaticHasher, StaticHostIp};

pub const HOST_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

/// A config directory in a temp dir plus a manager over it.
pub struct TestFleet {
    dir: TempDir,
    pub manager: RouteManager,
}

impl TestFleet {
    pub fn new() -> Self {
        Self::with_host_ip(StaticHostIp::new(HOST_IP))
    }

    pub fn with_host_ip(host_ip: StaticHostIp) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let manager = RouteManager::open(dir.path(), "http01")
            .with_hasher(StaticHasher)
            .with_host_ip(host_ip);
        Self { dir, manager }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn object_path(&self, id: &RouteId) -> PathBuf {
        self.path().join(id.file_name())
    }

    /// Copy a fixture object into the config directory verbatim.
    pub fn seed(&self, fixture_name: &str) {
        fs::copy(fixture(fixture_name), self.path().join(fixture_name))
            .expect("failed to seed fixture");
    }

    pub fn raw(&self, id: &RouteId) -> String {
        fs::read_to_string(self.object_path(id)).expect("failed to read object")
    }

    pub fn stored(&self, id: &RouteId) -> ConfigGraph {
        decode(id.as_str(), self.raw(id).as_bytes()).expect("failed to decode object")
    }

    /// File names in the config directory, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("failed to read config dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl Default for TestFleet {
    fn default() -> Self {
        Self::new()
    }
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

/// A valid https route with redirect and HSTS.
pub fn route(name: &str, domain: &str, backend: &str) -> RouteDescription {
    RouteDescription {
        name: name.to_string(),
        domain: domain.to_string(),
        backend: Backend::new(backend),
        https: true,
        force_tls: true,
        hsts: true,
        ..Default::default()
    }
}
