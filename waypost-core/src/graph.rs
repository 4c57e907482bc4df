//! Proxy-native routing graph: routers, services and middlewares.
//!
//! Field names follow the proxy's file provider schema. Keys this crate does
//! not manage are kept in the `extra` maps so they survive a decode/encode
//! cycle untouched.

use crate::identity::RouteId;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Provider suffix the proxy uses to resolve references across files.
pub const PROVIDER_SUFFIX: &str = "@file";

pub const ENTRYPOINT_WEB: &str = "web";
pub const ENTRYPOINT_WEBSECURE: &str = "websecure";

pub type Extra = BTreeMap<String, Value>;

/// Qualify a router, service or middleware name for cross-references.
pub fn file_ref(name: &str) -> String {
    format!("{}{}", name, PROVIDER_SUFFIX)
}

/// Name part of a reference, with or without a provider suffix.
pub fn ref_name(reference: &str) -> &str {
    match reference.rsplit_once('@') {
        Some((name, _)) => name,
        None => reference,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigGraph {
    #[serde(default, skip_serializing_if = "HttpSection::is_empty")]
    pub http: HttpSection,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpSection {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub routers: BTreeMap<String, Router>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Service>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub middlewares: BTreeMap<String, Middleware>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_points: Option<Vec<String>>,
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<RouterTls>,
    /// `None` and an empty list are different things to the proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middlewares: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterTls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_resolver: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancer>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One middleware definition. Exactly one kind is present per entry.
///
/// Kinds this crate does not compile are carried as [`Middleware::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Middleware {
    RedirectScheme(RedirectScheme),
    Headers(Headers),
    BasicAuth(BasicAuth),
    IpWhiteList(IpWhiteList),
    ForwardAuth(ForwardAuth),
    Other(Mapping),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedirectScheme {
    pub scheme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_request_headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sts_seconds: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpWhiteList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_range: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_strategy: Option<IpStrategy>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpStrategy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardAuth {
    pub address: String,
    #[serde(flatten)]
    pub extra: Extra,
}

const KIND_REDIRECT_SCHEME: &str = "redirectScheme";
const KIND_HEADERS: &str = "headers";
const KIND_BASIC_AUTH: &str = "basicAuth";
const KIND_IP_WHITE_LIST: &str = "ipWhiteList";
const KIND_FORWARD_AUTH: &str = "forwardAuth";

impl Serialize for Middleware {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Middleware::RedirectScheme(m) => map.serialize_entry(KIND_REDIRECT_SCHEME, m)?,
            Middleware::Headers(m) => map.serialize_entry(KIND_HEADERS, m)?,
            Middleware::BasicAuth(m) => map.serialize_entry(KIND_BASIC_AUTH, m)?,
            Middleware::IpWhiteList(m) => map.serialize_entry(KIND_IP_WHITE_LIST, m)?,
            Middleware::ForwardAuth(m) => map.serialize_entry(KIND_FORWARD_AUTH, m)?,
            Middleware::Other(raw) => {
                for (k, v) in raw {
                    map.serialize_entry(k, v)?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Middleware {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Mapping::deserialize(deserializer)?;
        let first = raw
            .iter()
            .next()
            .filter(|_| raw.len() == 1)
            .and_then(|(k, v)| k.as_str().map(|k| (k.to_string(), v.clone())));
        let Some((kind, body)) = first else {
            return Ok(Middleware::Other(raw));
        };

        fn typed<T, E>(body: &Value) -> Result<T, E>
        where
            T: serde::de::DeserializeOwned,
            E: serde::de::Error,
        {
            serde_yaml::from_value(body.clone()).map_err(E::custom)
        }

        let middleware = match kind.as_str() {
            KIND_REDIRECT_SCHEME => Middleware::RedirectScheme(typed::<_, D::Error>(&body)?),
            KIND_HEADERS => Middleware::Headers(typed::<_, D::Error>(&body)?),
            KIND_BASIC_AUTH => Middleware::BasicAuth(typed::<_, D::Error>(&body)?),
            KIND_IP_WHITE_LIST => Middleware::IpWhiteList(typed::<_, D::Error>(&body)?),
            KIND_FORWARD_AUTH => Middleware::ForwardAuth(typed::<_, D::Error>(&body)?),
            _ => return Ok(Middleware::Other(raw)),
        };
        Ok(middleware)
    }
}

impl Middleware {
    pub fn as_headers(&self) -> Option<&Headers> {
        match self {
            Middleware::Headers(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_basic_auth(&self) -> Option<&BasicAuth> {
        match self {
            Middleware::BasicAuth(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_ip_white_list(&self) -> Option<&IpWhiteList> {
        match self {
            Middleware::IpWhiteList(w) => Some(w),
            _ => None,
        }
    }
}

impl HttpSection {
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
            && self.services.is_empty()
            && self.middlewares.is_empty()
            && self.extra.is_empty()
    }
}

impl LoadBalancer {
    pub fn servers(&self) -> &[Server] {
        self.servers.as_deref().unwrap_or_default()
    }
}

impl Headers {
    pub fn custom_request_headers(&self) -> Option<&BTreeMap<String, String>> {
        self.custom_request_headers.as_ref()
    }
}

impl BasicAuth {
    pub fn users(&self) -> &[String] {
        self.users.as_deref().unwrap_or_default()
    }
}

impl IpWhiteList {
    pub fn source_range(&self) -> &[String] {
        self.source_range.as_deref().unwrap_or_default()
    }
}

impl IpStrategy {
    /// Hop depth; the proxy treats an absent depth as zero.
    pub fn depth(&self) -> u32 {
        self.depth.unwrap_or_default()
    }
}

impl Router {
    pub fn entry_points(&self) -> &[String] {
        self.entry_points.as_deref().unwrap_or_default()
    }

    pub fn middleware_refs(&self) -> &[String] {
        self.middlewares.as_deref().unwrap_or_default()
    }

    /// Whether `name` is referenced, with or without provider suffix.
    pub fn has_middleware(&self, name: &str) -> bool {
        self.middleware_refs().iter().any(|r| ref_name(r) == name)
    }

    pub fn attach(&mut self, reference: String) {
        self.middlewares.get_or_insert_with(Vec::new).push(reference);
    }

    /// Drop every reference to `name`. A list emptied this way is removed.
    pub fn detach(&mut self, name: &str) -> bool {
        let Some(list) = self.middlewares.as_mut() else {
            return false;
        };
        let before = list.len();
        list.retain(|r| ref_name(r) != name);
        let changed = list.len() != before;
        if changed && list.is_empty() {
            self.middlewares = None;
        }
        changed
    }
}

impl ConfigGraph {
    pub fn any_router_has_middleware(&self, name: &str) -> bool {
        self.http.routers.values().any(|r| r.has_middleware(name))
    }

    /// Middleware references that resolve neither to a local definition nor
    /// to one of `external` (names defined in other objects).
    pub fn dangling_references(&self, external: &[&str]) -> Vec<String> {
        let mut dangling = Vec::new();
        for router in self.http.routers.values() {
            for reference in router.middleware_refs() {
                let name = ref_name(reference);
                if !self.http.middlewares.contains_key(name) && !external.contains(&name) {
                    dangling.push(reference.clone());
                }
            }
            if let Some(service) = &router.service
                && !self.http.services.contains_key(ref_name(service))
            {
                dangling.push(service.clone());
            }
        }
        dangling
    }

    /// Move every key and reference derived from `old` over to `new`.
    pub fn rename_identity(&mut self, old: &RouteId, new: &RouteId) {
        let rename = |key: &str| -> String {
            if key == old.as_str() {
                return new.to_string();
            }
            match key.strip_prefix(old.as_str()) {
                Some(rest) if rest.starts_with('-') => format!("{}{}", new, rest),
                _ => key.to_string(),
            }
        };
        let rename_ref = |reference: &str| -> String {
            let name = ref_name(reference);
            let suffix = &reference[name.len()..];
            format!("{}{}", rename(name), suffix)
        };

        let routers = std::mem::take(&mut self.http.routers);
        self.http.routers = routers
            .into_iter()
            .map(|(key, mut router)| {
                router.service = router.service.as_deref().map(&rename_ref);
                if let Some(list) = router.middlewares.as_mut() {
                    for reference in list.iter_mut() {
                        *reference = rename_ref(reference);
                    }
                }
                (rename(&key), router)
            })
            .collect();

        let services = std::mem::take(&mut self.http.services);
        self.http.services = services
            .into_iter()
            .map(|(key, service)| (rename(&key), service))
            .collect();

        let middlewares = std::mem::take(&mut self.http.middlewares);
        self.http.middlewares = middlewares
            .into_iter()
            .map(|(key, middleware)| (rename(&key), middleware))
            .collect();
    }
}
