use crate::identity::RouteId;
use serde::{Deserialize, Serialize};

/// Operator-facing description of a single proxied route.
///
/// This is what the form submits and what listing returns; the stored
/// representation is the compiled [`crate::graph::ConfigGraph`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescription {
    /// Empty when creating a route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RouteId>,
    pub name: String,
    pub domain: String,
    pub backend: Backend,
    #[serde(default)]
    pub forward_auth: bool,
    #[serde(default)]
    pub https: bool,
    #[serde(default, rename = "forceTLS")]
    pub force_tls: bool,
    #[serde(default)]
    pub hsts: bool,
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
    #[serde(default)]
    pub basic_auth: Vec<BasicAuthEntry>,
    #[serde(default)]
    pub ip_restriction: Option<IpRestriction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backend {
    pub url: String,
    /// Result of the last reachability probe. Never persisted.
    #[serde(default, skip_deserializing)]
    pub healthy: bool,
}

impl Backend {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            healthy: false,
        }
    }
}

/// Request header to inject. The value may contain [`crate::compile::SERVER_IP_TOKEN`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl HeaderEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// An unused form slot.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuthEntry {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl BasicAuthEntry {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// An unused form slot.
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRestriction {
    /// Hop count into `X-Forwarded-For` used to pick the client address.
    #[serde(default)]
    pub depth: i64,
    #[serde(default)]
    pub ips: Vec<String>,
}

impl IpRestriction {
    /// Entries that are actually filled in, in submission order.
    pub fn active_ips(&self) -> impl Iterator<Item = &str> {
        self.ips.iter().map(String::as_str).filter(|ip| !ip.is_empty())
    }
}

impl RouteDescription {
    /// Entries that are actually filled in, in submission order.
    pub fn active_headers(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.headers.iter().filter(|h| !h.is_empty())
    }

    /// Entries that are actually filled in, in submission order.
    pub fn active_credentials(&self) -> impl Iterator<Item = &BasicAuthEntry> {
        self.basic_auth.iter().filter(|b| !b.is_empty())
    }
}
