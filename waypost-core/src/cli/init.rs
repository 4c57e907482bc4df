use crate::settings::DEFAULT_SETTINGS_FILE;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

/// Write a starter settings file and an empty config directory under `path`.
pub fn init(path: &Path) -> Result<()> {
    let settings_path = path.join(DEFAULT_SETTINGS_FILE);
    if settings_path.exists() {
        bail!("{} already exists", settings_path.display());
    }

    let config_dir = path.join("dynamic.d");
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("failed to create {}", config_dir.display()))?;

    let contents = SETTINGS_TEMPLATE.replace("{config_dir}", &config_dir.display().to_string());
    fs::write(&settings_path, contents.trim_start())
        .with_context(|| format!("failed to write {}", settings_path.display()))?;

    println!("✔ Initialized waypost in {}", path.display());
    println!("✔ Created:");
    println!("  - {}", DEFAULT_SETTINGS_FILE);
    println!("  - dynamic.d/");
    println!();
    println!("Next steps:");
    println!("  point the proxy's file provider at dynamic.d");
    println!("  waypost bootstrap");

    Ok(())
}

const SETTINGS_TEMPLATE: &str = r#"
server {
  config_dir    = "{config_dir}"
  cert_resolver = "http01"
  listen_port   = 8099

  # Enables forward auth for routes that ask for it.
  # auth_endpoint = "https://auth.example.com/authorize"
}
"#;
