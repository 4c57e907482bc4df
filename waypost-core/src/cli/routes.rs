use crate::cli::read_route;
use crate::identity::RouteId;
use crate::manager::{ManagerError, RouteManager, RouteObject};
use crate::probe::{PROBE_TIMEOUT, annotate_health};
use crate::route::RouteDescription;
use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn list(manager: &RouteManager, probe: bool, json: bool) -> Result<()> {
    let mut routes = manager.list_descriptions()?;
    if probe {
        annotate_health(&mut routes, PROBE_TIMEOUT);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
        return Ok(());
    }

    if routes.is_empty() {
        println!("no routes");
        return Ok(());
    }
    for route in &routes {
        println!("{}", summary_line(route, probe));
    }
    Ok(())
}

pub fn get(manager: &RouteManager, id: &RouteId, yaml: bool) -> Result<()> {
    let Some(object) = manager.get(id)? else {
        return Err(ManagerError::NotFound(id.clone()).into());
    };

    if yaml {
        print!("{}", serde_yaml::to_string(&object.graph)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&object.describe()?)?);
    }
    Ok(())
}

pub fn add(manager: &RouteManager, path: &Path) -> Result<()> {
    let route = read_route(path)?;
    let object = report_validation(manager.add(&route))?;
    println!("✔ Added {}", object.id);
    Ok(())
}

pub fn update(manager: &RouteManager, path: &Path) -> Result<()> {
    let route = read_route(path)?;
    let object = report_validation(manager.update(&route))?;
    println!("✔ Updated {}", object.id);
    Ok(())
}

pub fn delete(manager: &RouteManager, id: &RouteId) -> Result<()> {
    manager.delete(id)?;
    println!("✔ Deleted {}", id);
    Ok(())
}

/// Validation failures are the caller's to fix: show the report, not a fault.
fn report_validation(result: Result<RouteObject, ManagerError>) -> Result<RouteObject> {
    match result {
        Ok(object) => Ok(object),
        Err(ManagerError::Validation(report)) => {
            eprint!("{}", report.render_pretty());
            bail!("route description is invalid");
        }
        Err(e) => Err(e.into()),
    }
}

fn summary_line(route: &RouteDescription, probed: bool) -> String {
    let id = route.id.as_ref().map(RouteId::as_str).unwrap_or("-");
    let scheme = if route.https { "https" } else { "http" };
    let mut flags = Vec::new();
    if route.force_tls {
        flags.push("forceTLS");
    }
    if route.hsts {
        flags.push("hsts");
    }
    if route.forward_auth {
        flags.push("forwardAuth");
    }
    if route.active_credentials().next().is_some() {
        flags.push("basicAuth");
    }
    if route.ip_restriction.is_some() {
        flags.push("ipRestriction");
    }

    let mut line = format!(
        "{}  {}://{} -> {}",
        id.bold(),
        scheme,
        route.domain,
        route.backend.url
    );
    if !flags.is_empty() {
        line.push_str(&format!("  [{}]", flags.join(", ")));
    }
    if probed {
        let health = if route.backend.healthy {
            "up".green().to_string()
        } else {
            "down".red().to_string()
        };
        line.push_str(&format!("  {}", health));
    }
    line
}
