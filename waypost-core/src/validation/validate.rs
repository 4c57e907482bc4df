use crate::route::RouteDescription;
use crate::validation::{Field, IP_RESTRICTION_DEPTH, ValidationReport, validate_range};
use once_cell::sync::Lazy;
use regex::Regex;

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]{3,32}$").unwrap());
static DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9]+\.){2,63}[A-Za-z]{2,6}$").unwrap());
static BACKEND_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[A-Za-z0-9.-]+:[0-9]{0,5}$").unwrap());
static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{3,32}$").unwrap());
static PASSWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.{1,128}$").unwrap());
static IP_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,3}\.){3}[0-9]{1,3}(/[0-9]{1,2})?$").unwrap());
static HEADER_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());
static HEADER_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.{3,128}$").unwrap());

/// Check a route description against the field rules.
///
/// Pure; every violation is collected. Entries whose fields are all empty are
/// unused form slots and are skipped.
pub fn validate_route(route: &RouteDescription) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !NAME.is_match(&route.name) {
        report.invalid_name(&route.name);
    }

    if !DOMAIN.is_match(&route.domain) {
        report.invalid_domain(&route.domain);
    }

    if !BACKEND_URL.is_match(&route.backend.url) {
        report.invalid_backend_url(&route.backend.url);
    }

    for (i, entry) in route.basic_auth.iter().enumerate() {
        if entry.is_empty() {
            continue;
        }
        if !USERNAME.is_match(&entry.username) {
            report.invalid_username(i, &entry.username);
        }
        if !PASSWORD.is_match(&entry.password) {
            report.invalid_password(i);
        }
    }

    if let Some(ipr) = &route.ip_restriction {
        validate_range(
            ipr.depth,
            &IP_RESTRICTION_DEPTH,
            &mut report,
            Field::IpRestrictionDepth,
        );

        for (i, ip) in ipr.ips.iter().enumerate() {
            if ip.is_empty() {
                continue;
            }
            if !is_ip_entry(ip) {
                report.invalid_ip_entry(i, ip);
            }
        }
    }

    for (i, header) in route.headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        if !HEADER_NAME.is_match(&header.name) {
            report.invalid_header_name(i, &header.name);
        }
        if !HEADER_VALUE.is_match(&header.value) {
            report.invalid_header_value(i);
        }
    }

    report
}

/// Dotted-quad shape with an optional prefix length; octet values are not
/// bounded.
fn is_ip_entry(ip: &str) -> bool {
    IP_ENTRY.is_match(ip)
}
