use crate::validation::Field;
use owo_colors::OwoColorize;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    #[serde(flatten)]
    pub field: Field,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Every problem found in one route description.
///
/// Rules never short-circuit, so a single report can mark all bad fields at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
}

#[derive(Serialize)]
struct ValidationReportJson<'a> {
    valid: bool,
    errors: &'a [ValidationIssue],
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ValidationReportJson {
            valid: self.is_valid(),
            errors: &self.errors,
        }
        .serialize(serializer)
    }
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors_for(&self, field: Field) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(move |i| i.field == field)
    }

    pub fn has_error(&self, field: Field) -> bool {
        self.errors_for(field).next().is_some()
    }

    /// Distinct fields that carry at least one error, in field order.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self.errors.iter().map(|i| i.field).collect();
        fields.sort();
        fields.dedup();
        fields
    }

    pub(crate) fn error(&mut self, field: Field, message: String, help: Option<String>) {
        self.errors.push(ValidationIssue {
            field,
            message,
            help,
        });
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_plain(&self) -> String {
        let mut out = String::new();
        for issue in &self.errors {
            let _ = writeln!(out, "{}: error: {}", issue.field, issue.message);
            if let Some(help) = &issue.help {
                let _ = writeln!(out, "  help: {}", help);
            }
        }
        out
    }

    pub fn render_pretty(&self) -> String {
        let mut out = String::new();
        if self.is_valid() {
            let _ = writeln!(out, "{} route description is valid", "✔".green());
            return out;
        }

        let _ = writeln!(
            out,
            "route validation failed ({} errors)\n",
            self.errors.len()
        );

        let mut by_field = BTreeMap::new();
        for issue in &self.errors {
            by_field
                .entry(issue.field)
                .or_insert(Vec::new())
                .push(issue);
        }

        for (field, issues) in by_field {
            let _ = writeln!(out, "{}", field.bold());
            for issue in issues {
                let _ = writeln!(out, "  {}: {}", "error".red().bold(), issue.message);
                if let Some(help) = &issue.help {
                    let _ = writeln!(out, "  {}: {}", "help".cyan(), help);
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Route field rules
impl ValidationReport {
    pub fn invalid_name(&mut self, name: &str) {
        self.error(
            Field::Name,
            format!("invalid name: '{}'", name),
            Some("Use 3 to 32 letters, digits or hyphens.".to_string()),
        );
    }

    pub fn invalid_domain(&mut self, domain: &str) {
        self.error(
            Field::Domain,
            format!("not a valid domain name: '{}'", domain),
            Some("Example: blog.example.com".to_string()),
        );
    }

    pub fn invalid_backend_url(&mut self, url: &str) {
        self.error(
            Field::Backend,
            format!("invalid backend url: '{}'", url),
            Some("Format: http://192.168.1.12:5000".to_string()),
        );
    }
}

/// Header entry rules
impl ValidationReport {
    pub fn invalid_header_name(&mut self, index: usize, name: &str) {
        self.error(
            Field::Header(index),
            format!("invalid header name: '{}'", name),
            Some("Use 1 to 64 letters, digits, '-' or '_'.".to_string()),
        );
    }

    pub fn invalid_header_value(&mut self, index: usize) {
        self.error(
            Field::Header(index),
            "header value must be between 3 and 128 characters".to_string(),
            None,
        );
    }
}

/// Basic auth entry rules
impl ValidationReport {
    pub fn invalid_username(&mut self, index: usize, username: &str) {
        self.error(
            Field::BasicAuth(index),
            format!("invalid username: '{}'", username),
            Some("Use 3 to 32 letters or digits.".to_string()),
        );
    }

    pub fn invalid_password(&mut self, index: usize) {
        self.error(
            Field::BasicAuth(index),
            "password must be between 1 and 128 characters".to_string(),
            None,
        );
    }
}

/// IP restriction rules
impl ValidationReport {
    pub fn invalid_ip_entry(&mut self, index: usize, ip: &str) {
        self.error(
            Field::IpRestriction(index),
            format!("not a valid IPv4 address or CIDR range: '{}'", ip),
            Some("Example: 192.168.1.0/24".to_string()),
        );
    }
}
