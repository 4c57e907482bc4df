use crate::route::RouteDescription;
use crate::validation::{ValidationReport, validate_route};
use anyhow::{Context, bail};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pretty,
    Plain,
    Json,
}

impl ReportFormat {
    pub fn from_flags(plain: bool, json: bool) -> Self {
        if json {
            ReportFormat::Json
        } else if plain {
            ReportFormat::Plain
        } else {
            ReportFormat::Pretty
        }
    }
}

pub fn read_route(path: &Path) -> anyhow::Result<RouteDescription> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a route description", path.display()))
}

pub fn render_report(report: &ValidationReport, format: ReportFormat) -> anyhow::Result<String> {
    Ok(match format {
        ReportFormat::Pretty => report.render_pretty(),
        ReportFormat::Plain => report.render_plain(),
        ReportFormat::Json => report.render_json()?,
    })
}

/// Validate a route description file without touching the store.
pub fn check(path: &Path, format: ReportFormat) -> anyhow::Result<()> {
    let route = read_route(path)?;
    let report = validate_route(&route);

    let rendered = render_report(&report, format)?;
    if report.is_valid() {
        println!("{}", rendered.trim_end());
        Ok(())
    } else {
        eprintln!("{}", rendered.trim_end());
        bail!("{} has {} validation error(s)", path.display(), report.errors.len());
    }
}
