use crate::compile::CompileError;
use crate::identity::RouteId;
use crate::project::ProjectionError;
use crate::store::StoreError;
use crate::validation::ValidationReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    /// The description broke field rules. Rendered to the caller, not a fault.
    #[error("route description is invalid ({} issue(s))", .0.errors.len())]
    Validation(ValidationReport),

    #[error("route '{0}' does not exist")]
    NotFound(RouteId),

    #[error("a route named '{0}' already exists")]
    AlreadyExists(String),

    #[error("route description carries no id")]
    MissingId,

    #[error("failed to compile route '{id}': {source}")]
    Compile {
        id: RouteId,
        #[source]
        source: CompileError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}
