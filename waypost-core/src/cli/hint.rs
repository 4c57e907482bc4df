use crate::manager::ManagerError;
use crate::settings::ConfigError;
use crate::store::StoreError;

pub fn config_error_hint(err: &ConfigError) -> Option<&'static str> {
    match err {
        ConfigError::ReadFile { .. } => Some(
            "Create a settings file or pass both --config-dir and --cert-resolver.\n\
             \n\
             Example (waypost.hcl):\n\
             \n\
             server {\n\
             \x20 config_dir    = \"/etc/traefik/dynamic.d\"\n\
             \x20 cert_resolver = \"http01\"\n\
             }\n\
             \n\
             Or run: waypost init",
        ),

        ConfigError::Parse { .. } => Some(
            "Settings are HCL with a single `server` block.\n\
             \n\
             Required attributes: config_dir, cert_resolver.\n\
             Optional attributes: listen_port, auth_endpoint.",
        ),

        ConfigError::Invalid { .. } => Some(
            "The config directory must already exist; it is the directory the proxy's\n\
             file provider watches.",
        ),
    }
}

pub fn manager_error_hint(err: &ManagerError) -> Option<&'static str> {
    match err {
        ManagerError::AlreadyExists(_) => Some(
            "Route names must be unique. Pick another name, or update the existing route.",
        ),

        ManagerError::NotFound(_) => Some("List the existing routes with: waypost list"),

        ManagerError::MissingId => Some(
            "Updates need the `id` of the route being changed.\n\
             \n\
             Fetch it with: waypost get <id> --json",
        ),

        ManagerError::Store(StoreError::Decode { .. }) => Some(
            "A config object could not be parsed. Fix or remove it by hand; bulk\n\
             operations refuse to run while any object is unreadable.",
        ),

        ManagerError::Store(StoreError::InvalidKey { .. }) => Some(
            "Route ids are file stems inside the config directory, e.g. blog_1a2b3c4d.",
        ),

        //---------------------------------------------------------------------
        // Everything else: no hint
        //---------------------------------------------------------------------
        _ => None,
    }
}

/// Hint for the first known error in the chain.
pub fn error_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ManagerError>() {
            manager_error_hint(e)
        } else if let Some(e) = cause.downcast_ref::<ConfigError>() {
            config_error_hint(e)
        } else {
            None
        }
    })
}
