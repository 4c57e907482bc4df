use crate::graph::file_ref;
use crate::identity::RouteId;
use crate::manager::{ManagerError, RouteManager, RouteObject};
use crate::store::{ObjectStore, encode};
use crate::system::{self, SYSTEM_OBJECT, SystemMiddlewares};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardAuthOp {
    Add,
    Remove,
}

impl<S: ObjectStore> RouteManager<S> {
    /// (Re)write the shared middleware object.
    pub fn write_system_middlewares(
        &self,
        system: &SystemMiddlewares,
    ) -> Result<(), ManagerError> {
        let bytes = encode(SYSTEM_OBJECT, &system.graph())?;
        self.store.write(SYSTEM_OBJECT, &bytes)?;
        info!(
            forward_auth = system.forward_auth,
            listen_port = system.listen_port,
            "system middlewares written"
        );
        Ok(())
    }

    /// Point every TLS router of the fleet at `name`.
    ///
    /// Objects already using `name` are left untouched. Returns how many
    /// objects were rewritten.
    pub fn set_cert_resolver(&mut self, name: &str) -> Result<usize, ManagerError> {
        let rewritten = self.rewrite_fleet("set_cert_resolver", |object| {
            let mut changed = false;
            for router in object.graph.http.routers.values_mut() {
                if let Some(tls) = router.tls.as_mut()
                    && tls.cert_resolver.as_deref() != Some(name)
                {
                    tls.cert_resolver = Some(name.to_string());
                    changed = true;
                }
            }
            changed
        })?;
        self.cert_resolver = name.to_string();
        Ok(rewritten)
    }

    /// Attach or detach the shared forward-auth middleware on every router.
    pub fn set_forward_auth(&self, op: ForwardAuthOp) -> Result<usize, ManagerError> {
        self.rewrite_fleet("set_forward_auth", |object| {
            let mut changed = false;
            for router in object.graph.http.routers.values_mut() {
                match op {
                    ForwardAuthOp::Add if !router.has_middleware(system::FORWARD_AUTH) => {
                        router.attach(file_ref(system::FORWARD_AUTH));
                        changed = true;
                    }
                    ForwardAuthOp::Add => {}
                    ForwardAuthOp::Remove => changed |= router.detach(system::FORWARD_AUTH),
                }
            }
            changed
        })
    }

    /// Give every single-part (legacy) id a hash tag.
    ///
    /// Keys and references inside the object follow the new id. The new
    /// object is written before the old one is removed.
    pub fn migrate_schema(&self) -> Result<Vec<(RouteId, RouteId)>, ManagerError> {
        let legacy: Vec<RouteObject> = self
            .list()?
            .into_iter()
            .filter(|object| object.id.is_legacy())
            .collect();

        let mut migrated = Vec::with_capacity(legacy.len());
        for mut object in legacy {
            let new = self.fresh_id(object.id.name())?;
            object.graph.rename_identity(&object.id, &new);
            self.write(&new, &object.graph)?;
            self.store.remove(object.id.as_str())?;

            info!(from = %object.id, to = %new, "route id migrated");
            migrated.push((object.id, new));
        }

        if !migrated.is_empty() {
            info!(count = migrated.len(), "schema migration finished");
        }
        Ok(migrated)
    }

    /// Load the whole fleet, then rewrite each object `edit` reports as
    /// changed. A failed write stops the run.
    fn rewrite_fleet<F>(&self, operation: &str, mut edit: F) -> Result<usize, ManagerError>
    where
        F: FnMut(&mut RouteObject) -> bool,
    {
        let objects = self.list()?;
        let total = objects.len();
        let mut rewritten = 0;

        for mut object in objects {
            if !edit(&mut object) {
                continue;
            }
            self.write(&object.id, &object.graph)?;
            debug!(operation, id = %object.id, "route object rewritten");
            rewritten += 1;
        }

        info!(operation, total, rewritten, "bulk edit finished");
        Ok(rewritten)
    }
}
