//! Operator settings, read from an HCL file.
//!
//! ```hcl
//! server {
//!   config_dir    = "/etc/traefik/dynamic.d"
//!   cert_resolver = "http01"
//!   listen_port   = 8099
//!   auth_endpoint = "https://auth.example.com/authorize"
//! }
//! ```

mod error;

pub use error::ConfigError;

use crate::manager::RouteManager;
use crate::system::{DEFAULT_LISTEN_PORT, SystemMiddlewares};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "waypost.hcl";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Directory the proxy's file provider watches.
    pub config_dir: PathBuf,

    /// Name of a certificate resolver configured in the proxy, e.g. `http01`.
    pub cert_resolver: String,

    /// Port of the local auth callback referenced by the forward-auth middleware.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Authorization endpoint for forward auth. Forward auth is disabled fleet-wide without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_endpoint: Option<String>,
}

fn default_listen_port() -> u16 {
    DEFAULT_LISTEN_PORT
}

impl ServerSettings {
    pub fn system_middlewares(&self) -> SystemMiddlewares {
        SystemMiddlewares {
            listen_port: self.listen_port,
            forward_auth: self.auth_endpoint.is_some(),
        }
    }

    pub fn manager(&self) -> RouteManager {
        RouteManager::open(&self.config_dir, &self.cert_resolver)
    }
}

impl Settings {
    /// Command-line values win over the file.
    pub fn with_overrides(
        mut self,
        config_dir: Option<PathBuf>,
        cert_resolver: Option<String>,
    ) -> Self {
        if let Some(dir) = config_dir {
            self.server.config_dir = dir;
        }
        if let Some(resolver) = cert_resolver {
            self.server.cert_resolver = resolver;
        }
        self
    }
}

pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    hcl::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Every problem at once, like route validation.
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    let server = &settings.server;
    let mut reasons = Vec::new();

    if server.cert_resolver.trim().is_empty() {
        reasons.push("server.cert_resolver must not be empty".to_string());
    }

    if !server.config_dir.is_dir() {
        reasons.push(format!(
            "server.config_dir '{}' does not exist or is not a directory",
            server.config_dir.display()
        ));
    }

    if server.listen_port == 0 {
        reasons.push("server.listen_port must be between 1 and 65535".to_string());
    }

    if let Some(endpoint) = &server.auth_endpoint {
        match Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => reasons.push(format!(
                "server.auth_endpoint must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => reasons.push(format!(
                "server.auth_endpoint '{}' is not a URL: {}",
                endpoint, e
            )),
        }
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid { reasons })
    }
}
