//! Route description to routing graph.
//!
//! Compilation is pure apart from its two collaborators: the credential hasher
//! and the host address lookup. Identity is assigned by the caller, and the
//! input is expected to be valid already.

mod collaborators;
mod error;

pub use collaborators::{BcryptHasher, CredentialHasher, HostIpLookup, InterfaceLookup};
pub use error::{CompileError, HostIpError};

use crate::graph::{
    BasicAuth, ConfigGraph, ENTRYPOINT_WEB, ENTRYPOINT_WEBSECURE, Headers, IpStrategy,
    IpWhiteList, LoadBalancer, Middleware, Router, RouterTls, Server, Service, file_ref,
};
use crate::identity::RouteId;
use crate::route::RouteDescription;
use crate::system;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Header value token replaced with the host's address.
pub const SERVER_IP_TOKEN: &str = "$ServerIP";

/// Substituted when the host address cannot be determined.
pub const SERVER_IP_FALLBACK: &str = "n/a";

pub const HEADERS_SUFFIX: &str = "headers";
pub const BASIC_AUTH_SUFFIX: &str = "basicauth";
pub const IP_RESTRICT_SUFFIX: &str = "iprestrict";

pub struct Compiler<'a> {
    cert_resolver: &'a str,
    hasher: &'a dyn CredentialHasher,
    host_ip: &'a dyn HostIpLookup,
}

impl<'a> Compiler<'a> {
    pub fn new(
        cert_resolver: &'a str,
        hasher: &'a dyn CredentialHasher,
        host_ip: &'a dyn HostIpLookup,
    ) -> Self {
        Self {
            cert_resolver,
            hasher,
            host_ip,
        }
    }

    pub fn compile(
        &self,
        id: &RouteId,
        route: &RouteDescription,
    ) -> Result<ConfigGraph, CompileError> {
        self.recompile(id, route, None)
    }

    /// Compile, reusing credential hashes of `previous` where the submitted
    /// password is the stored hash itself.
    pub fn recompile(
        &self,
        id: &RouteId,
        route: &RouteDescription,
        previous: Option<&ConfigGraph>,
    ) -> Result<ConfigGraph, CompileError> {
        let mut graph = ConfigGraph::default();
        let target = file_ref(id.as_str());
        let rule = format!("Host(`{}`)", route.domain);

        graph.http.services.insert(
            id.to_string(),
            Service {
                load_balancer: Some(LoadBalancer {
                    servers: Some(vec![Server {
                        url: route.backend.url.clone(),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        let mut plain = Router {
            entry_points: Some(vec![ENTRYPOINT_WEB.to_string()]),
            rule: rule.clone(),
            service: Some(target.clone()),
            ..Default::default()
        };
        let mut secure = None;

        if route.https {
            if route.force_tls {
                plain.attach(file_ref(system::REDIRECT_SCHEME));
            }
            let mut router = Router {
                entry_points: Some(vec![ENTRYPOINT_WEBSECURE.to_string()]),
                rule,
                service: Some(target),
                tls: Some(self.tls()),
                ..Default::default()
            };
            if route.hsts {
                router.attach(file_ref(system::HSTS));
            }
            secure = Some(router);
        }

        if route.forward_auth {
            attach_all(&mut plain, &mut secure, &file_ref(system::FORWARD_AUTH));
        }

        let headers = self.resolve_headers(route);
        if !headers.is_empty() {
            let name = id.middleware(HEADERS_SUFFIX);
            graph.http.middlewares.insert(
                name.clone(),
                Middleware::Headers(Headers {
                    custom_request_headers: Some(headers),
                    ..Default::default()
                }),
            );
            attach_all(&mut plain, &mut secure, &file_ref(&name));
        }

        let users = self.hash_credentials(route, previous)?;
        if !users.is_empty() {
            let name = id.middleware(BASIC_AUTH_SUFFIX);
            graph.http.middlewares.insert(
                name.clone(),
                Middleware::BasicAuth(BasicAuth {
                    users: Some(users),
                    ..Default::default()
                }),
            );
            secure.as_mut().unwrap_or(&mut plain).attach(file_ref(&name));
        }

        if let Some(ipr) = &route.ip_restriction {
            let source_range: Vec<String> = ipr.active_ips().map(str::to_string).collect();
            if !source_range.is_empty() {
                let name = id.middleware(IP_RESTRICT_SUFFIX);
                let ip_strategy = u32::try_from(ipr.depth)
                    .ok()
                    .filter(|depth| *depth > 0)
                    .map(|depth| IpStrategy {
                        depth: Some(depth),
                        ..Default::default()
                    });
                graph.http.middlewares.insert(
                    name.clone(),
                    Middleware::IpWhiteList(IpWhiteList {
                        source_range: Some(source_range),
                        ip_strategy,
                        ..Default::default()
                    }),
                );
                attach_all(&mut plain, &mut secure, &file_ref(&name));
            }
        }

        graph.http.routers.insert(id.http_router(), plain);
        if let Some(router) = secure {
            graph.http.routers.insert(id.to_string(), router);
        }

        debug!(
            id = %id,
            routers = graph.http.routers.len(),
            middlewares = graph.http.middlewares.len(),
            "route compiled"
        );
        Ok(graph)
    }

    fn tls(&self) -> RouterTls {
        RouterTls {
            cert_resolver: Some(self.cert_resolver.to_string()).filter(|r| !r.is_empty()),
            ..Default::default()
        }
    }

    fn resolve_headers(&self, route: &RouteDescription) -> BTreeMap<String, String> {
        let mut server_ip: Option<String> = None;
        let mut resolved = BTreeMap::new();

        for header in route.active_headers() {
            let value = if header.value.contains(SERVER_IP_TOKEN) {
                let ip = server_ip.get_or_insert_with(|| self.server_ip());
                header.value.replace(SERVER_IP_TOKEN, ip)
            } else {
                header.value.clone()
            };
            if !value.is_empty() {
                resolved.insert(header.name.clone(), value);
            }
        }
        resolved
    }

    fn server_ip(&self) -> String {
        match self.host_ip.host_ip() {
            Ok(ip) => ip.to_string(),
            Err(e) => {
                warn!(error = %e, fallback = SERVER_IP_FALLBACK, "host address lookup failed");
                SERVER_IP_FALLBACK.to_string()
            }
        }
    }

    fn hash_credentials(
        &self,
        route: &RouteDescription,
        previous: Option<&ConfigGraph>,
    ) -> Result<Vec<String>, CompileError> {
        let stored = previous.map(stored_hashes).unwrap_or_default();

        route
            .active_credentials()
            .map(|entry| -> Result<String, CompileError> {
                let hash = match stored.get(entry.username.as_str()) {
                    Some(hash) if *hash == entry.password => hash.to_string(),
                    _ => self
                        .hasher
                        .hash(&entry.password)
                        .map_err(|source| CompileError::Hash {
                            username: entry.username.clone(),
                            source,
                        })?,
                };
                Ok(format!("{}:{}", entry.username, hash))
            })
            .collect()
    }
}

fn attach_all(plain: &mut Router, secure: &mut Option<Router>, reference: &str) {
    plain.attach(reference.to_string());
    if let Some(router) = secure {
        router.attach(reference.to_string());
    }
}

/// `user -> hash` of the basic-auth middleware in a route's stored object.
///
/// The stored object may still carry the id the route had before a rename.
fn stored_hashes(graph: &ConfigGraph) -> BTreeMap<&str, &str> {
    let suffix = format!("-{}", BASIC_AUTH_SUFFIX);

    graph
        .http
        .middlewares
        .iter()
        .filter(|(key, _)| key.ends_with(&suffix))
        .filter_map(|(_, middleware)| middleware.as_basic_auth())
        .flat_map(|auth| auth.users().iter())
        .filter_map(|entry| entry.split_once(':'))
        .collect()
}
