use crate::manager::ForwardAuthOp;
use crate::settings::Settings;
use anyhow::Result;
use tracing::info;

/// Startup bulk operations, in order: shared middlewares, schema migration,
/// certificate resolver, then forward-auth removal when no auth endpoint is set.
pub fn bootstrap(settings: &Settings) -> Result<()> {
    let server = &settings.server;
    let mut manager = server.manager();

    manager.write_system_middlewares(&server.system_middlewares())?;
    println!("✔ System middlewares written");

    let migrated = manager.migrate_schema()?;
    for (old, new) in &migrated {
        println!("✔ Migrated {} -> {}", old, new);
    }

    let rewritten = manager.set_cert_resolver(&server.cert_resolver)?;
    println!(
        "✔ Certificate resolver '{}' ({} object(s) rewritten)",
        server.cert_resolver, rewritten
    );

    if server.auth_endpoint.is_none() {
        let detached = manager.set_forward_auth(ForwardAuthOp::Remove)?;
        println!("✔ Forward auth disabled ({} object(s) rewritten)", detached);
    }

    info!(config_dir = %server.config_dir.display(), "bootstrap finished");
    Ok(())
}
