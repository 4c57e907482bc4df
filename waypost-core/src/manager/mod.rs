//! Lifecycle of route objects over an [`ObjectStore`].
//!
//! Every operation runs to completion on the calling thread. Single-object
//! operations are atomic at file granularity. Bulk operations load the whole
//! fleet before touching anything and stop at the first failed write.

mod bulk;
mod error;
#[cfg(test)]
mod tests;

pub use bulk::ForwardAuthOp;
pub use error::ManagerError;

use crate::compile::{BcryptHasher, Compiler, CredentialHasher, HostIpLookup, InterfaceLookup};
use crate::graph::ConfigGraph;
use crate::identity::RouteId;
use crate::project::{ProjectionError, project};
use crate::route::RouteDescription;
use crate::store::{DirStore, ObjectStore, decode, encode};
use crate::validation::validate_route;
use std::path::PathBuf;
use tracing::{debug, info};

/// One stored route: its id and decoded graph.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteObject {
    pub id: RouteId,
    pub graph: ConfigGraph,
}

impl RouteObject {
    pub fn describe(&self) -> Result<RouteDescription, ProjectionError> {
        project(&self.id, &self.graph)
    }
}

/// Explicit handle over one config directory.
///
/// Carries the active certificate resolver and the compile collaborators; there
/// is no process-wide state.
pub struct RouteManager<S: ObjectStore = DirStore> {
    store: S,
    cert_resolver: String,
    hasher: Box<dyn CredentialHasher>,
    host_ip: Box<dyn HostIpLookup>,
}

impl RouteManager<DirStore> {
    pub fn open(config_dir: impl Into<PathBuf>, cert_resolver: impl Into<String>) -> Self {
        Self::new(DirStore::new(config_dir), cert_resolver)
    }
}

impl<S: ObjectStore> RouteManager<S> {
    pub fn new(store: S, cert_resolver: impl Into<String>) -> Self {
        Self {
            store,
            cert_resolver: cert_resolver.into(),
            hasher: Box::new(BcryptHasher::default()),
            host_ip: Box::new(InterfaceLookup),
        }
    }

    pub fn with_hasher(mut self, hasher: impl CredentialHasher + 'static) -> Self {
        self.hasher = Box::new(hasher);
        self
    }

    pub fn with_host_ip(mut self, host_ip: impl HostIpLookup + 'static) -> Self {
        self.host_ip = Box::new(host_ip);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cert_resolver(&self) -> &str {
        &self.cert_resolver
    }

    /// Create a route under a fresh id.
    pub fn add(&self, route: &RouteDescription) -> Result<RouteObject, ManagerError> {
        check(route)?;
        if self.name_taken(&route.name, None)? {
            return Err(ManagerError::AlreadyExists(route.name.clone()));
        }

        let id = self.fresh_id(&route.name)?;
        let graph = self.compile(&id, route, None)?;
        self.write(&id, &graph)?;

        info!(id = %id, domain = %route.domain, "route added");
        Ok(RouteObject { id, graph })
    }

    /// Replace the route named by `route.id`.
    ///
    /// The new object is written before the old one is removed, so a failed
    /// write leaves the previous version in place. The id survives unless the
    /// name changed.
    pub fn update(&self, route: &RouteDescription) -> Result<RouteObject, ManagerError> {
        let current = route.id.clone().ok_or(ManagerError::MissingId)?;
        check(route)?;

        let previous = self
            .load(&current)?
            .ok_or_else(|| ManagerError::NotFound(current.clone()))?;

        let id = if current.name() == route.name {
            current.clone()
        } else {
            if self.name_taken(&route.name, Some(&current))? {
                return Err(ManagerError::AlreadyExists(route.name.clone()));
            }
            self.fresh_id(&route.name)?
        };

        let graph = self.compile(&id, route, Some(&previous))?;
        self.write(&id, &graph)?;
        if id != current {
            self.store.remove(current.as_str())?;
            info!(from = %current, to = %id, "route renamed");
        }

        info!(id = %id, domain = %route.domain, "route updated");
        Ok(RouteObject { id, graph })
    }

    pub fn delete(&self, id: &RouteId) -> Result<(), ManagerError> {
        if !self.store.remove(id.as_str())? {
            return Err(ManagerError::NotFound(id.clone()));
        }
        info!(id = %id, "route deleted");
        Ok(())
    }

    pub fn get(&self, id: &RouteId) -> Result<Option<RouteObject>, ManagerError> {
        Ok(self.load(id)?.map(|graph| RouteObject {
            id: id.clone(),
            graph,
        }))
    }

    /// Every route object in discovery order. One undecodable object fails
    /// the whole listing.
    pub fn list(&self) -> Result<Vec<RouteObject>, ManagerError> {
        let ids = self.store.list()?;
        let mut objects = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(graph) = self.load(&id)? else {
                debug!(id = %id, "route object disappeared during listing");
                continue;
            };
            objects.push(RouteObject { id, graph });
        }
        Ok(objects)
    }

    pub fn list_descriptions(&self) -> Result<Vec<RouteDescription>, ManagerError> {
        self.list()?
            .iter()
            .map(|object| object.describe().map_err(ManagerError::from))
            .collect()
    }

    fn load(&self, id: &RouteId) -> Result<Option<ConfigGraph>, ManagerError> {
        match self.store.read(id.as_str())? {
            Some(bytes) => Ok(Some(decode(id.as_str(), &bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, id: &RouteId, graph: &ConfigGraph) -> Result<(), ManagerError> {
        let bytes = encode(id.as_str(), graph)?;
        self.store.write(id.as_str(), &bytes)?;
        Ok(())
    }

    fn compile(
        &self,
        id: &RouteId,
        route: &RouteDescription,
        previous: Option<&ConfigGraph>,
    ) -> Result<ConfigGraph, ManagerError> {
        Compiler::new(&self.cert_resolver, self.hasher.as_ref(), self.host_ip.as_ref())
            .recompile(id, route, previous)
            .map_err(|source| ManagerError::Compile {
                id: id.clone(),
                source,
            })
    }

    /// Whether any stored route other than `except` is called `name`.
    fn name_taken(&self, name: &str, except: Option<&RouteId>) -> Result<bool, ManagerError> {
        Ok(self
            .store
            .list()?
            .iter()
            .any(|id| id.name() == name && Some(id) != except))
    }

    fn fresh_id(&self, name: &str) -> Result<RouteId, ManagerError> {
        loop {
            let id = RouteId::generate(name);
            if !self.store.exists(id.as_str())? {
                return Ok(id);
            }
        }
    }
}

fn check(route: &RouteDescription) -> Result<(), ManagerError> {
    let report = validate_route(route);
    if report.is_valid() {
        Ok(())
    } else {
        Err(ManagerError::Validation(report))
    }
}
