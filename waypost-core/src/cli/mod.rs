mod bootstrap;
mod check;
mod hint;
mod init;
mod routes;

pub use bootstrap::*;
pub use check::*;
pub use hint::*;
pub use init::*;
pub use routes::*;

use crate::settings::{
    DEFAULT_SETTINGS_FILE, ServerSettings, Settings, load_settings, validate_settings,
};
use clap::Args;
use std::path::PathBuf;

/// Where to find the settings, and the values flags may override.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Path to the settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Directory holding the proxy's dynamic config objects
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Certificate resolver configured in the proxy, e.g. http01 or dns01
    #[arg(long)]
    pub cert_resolver: Option<String>,
}

impl SettingsArgs {
    /// Load and validate settings.
    ///
    /// A missing settings file is fine when both overriding flags are given.
    pub fn resolve(&self) -> anyhow::Result<Settings> {
        let settings = match (&self.config_dir, &self.cert_resolver) {
            (Some(dir), Some(resolver)) if !self.settings.exists() => Settings {
                server: ServerSettings {
                    config_dir: dir.clone(),
                    cert_resolver: resolver.clone(),
                    listen_port: crate::system::DEFAULT_LISTEN_PORT,
                    auth_endpoint: None,
                },
            },
            _ => load_settings(&self.settings)?
                .with_overrides(self.config_dir.clone(), self.cert_resolver.clone()),
        };

        validate_settings(&settings)?;
        Ok(settings)
    }
}
