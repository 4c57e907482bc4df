//! Routing graph back to the route description it was compiled from.

use crate::compile::{BASIC_AUTH_SUFFIX, HEADERS_SUFFIX, IP_RESTRICT_SUFFIX};
use crate::graph::{ConfigGraph, Router, ref_name};
use crate::identity::RouteId;
use crate::route::{Backend, BasicAuthEntry, HeaderEntry, IpRestriction, RouteDescription};
use crate::system;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("route '{0}' has no router")]
    MissingRouter(RouteId),

    #[error("route '{id}' references missing service '{service}'")]
    MissingService { id: RouteId, service: String },

    #[error("service of route '{0}' has no backend server")]
    MissingBackend(RouteId),
}

/// Recover the operator-facing description of a stored route.
///
/// Credentials come back with the stored hash in place of the password.
pub fn project(id: &RouteId, graph: &ConfigGraph) -> Result<RouteDescription, ProjectionError> {
    let routers = &graph.http.routers;
    let plain = routers.get(&id.http_router());
    let secure = routers.get(id.as_str());
    let primary = plain
        .or(secure)
        .ok_or_else(|| ProjectionError::MissingRouter(id.clone()))?;

    let service = primary
        .service
        .as_deref()
        .map(ref_name)
        .unwrap_or(id.as_str());
    let url = graph
        .http
        .services
        .get(service)
        .ok_or_else(|| ProjectionError::MissingService {
            id: id.clone(),
            service: service.to_string(),
        })?
        .load_balancer
        .as_ref()
        .and_then(|lb| lb.servers().first())
        .map(|server| server.url.clone())
        .ok_or_else(|| ProjectionError::MissingBackend(id.clone()))?;

    let middleware = |suffix: &str| graph.http.middlewares.get(&id.middleware(suffix));

    let headers = middleware(HEADERS_SUFFIX)
        .and_then(|m| m.as_headers())
        .and_then(|h| h.custom_request_headers())
        .map(|headers| {
            headers
                .iter()
                .map(|(name, value)| HeaderEntry::new(name, value))
                .collect()
        })
        .unwrap_or_default();

    let basic_auth = middleware(BASIC_AUTH_SUFFIX)
        .and_then(|m| m.as_basic_auth())
        .map(|auth| {
            auth.users()
                .iter()
                .map(|entry| match entry.split_once(':') {
                    Some((user, hash)) => BasicAuthEntry::new(user, hash),
                    None => BasicAuthEntry::new(entry, ""),
                })
                .collect()
        })
        .unwrap_or_default();

    let ip_restriction = middleware(IP_RESTRICT_SUFFIX)
        .and_then(|m| m.as_ip_white_list())
        .map(|filter| IpRestriction {
            depth: filter
                .ip_strategy
                .as_ref()
                .map(|s| i64::from(s.depth()))
                .unwrap_or(0),
            ips: filter.source_range().to_vec(),
        });

    Ok(RouteDescription {
        id: Some(id.clone()),
        name: id.name().to_string(),
        domain: host_of(primary),
        backend: Backend::new(url),
        forward_auth: graph.any_router_has_middleware(system::FORWARD_AUTH),
        https: secure.is_some_and(|r| r.tls.is_some()),
        force_tls: plain.is_some_and(|r| r.has_middleware(system::REDIRECT_SCHEME)),
        hsts: secure.is_some_and(|r| r.has_middleware(system::HSTS)),
        headers,
        basic_auth,
        ip_restriction,
    })
}

fn host_of(router: &Router) -> String {
    router
        .rule
        .strip_prefix("Host(`")
        .and_then(|rest| rest.strip_suffix("`)"))
        .unwrap_or(&router.rule)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::Compiler;
    use crate::store::decode;
    use crate::testing::{StaticHasher, StaticHostIp};
    use pretty_assertions::assert_eq;

    const LEGACY: &str = r#"http:
  routers:
    Test:
      entryPoints:
      - websecure
      rule: Host(`test.example.com`)
      service: Test
      tls:
        certResolver: http01
      middlewares:
      - sys-hsts
      - sys-forwardauth
      - Test-headers
    Test-http:
      entryPoints:
      - web
      rule: Host(`test.example.com`)
      service: Test
      middlewares:
      - sys-redirscheme
      - sys-forwardauth
      - Test-headers
  services:
    Test:
      loadBalancer:
        servers:
        - url: http://1.2.3.4:80
  middlewares:
    Test-headers:
      headers:
        customRequestHeaders:
          X-Server-IP: 10.1.2.3
"#;

    #[test]
    fn projects_what_was_compiled() {
        // Arrange
        let id = RouteId::new("blog_0a1b2c3d");
        let input = RouteDescription {
            id: Some(id.clone()),
            name: "blog".to_string(),
            domain: "blog.example.com".to_string(),
            backend: Backend::new("http://10.0.0.5:8080"),
            forward_auth: true,
            https: true,
            force_tls: true,
            hsts: false,
            headers: vec![HeaderEntry::new("X-Env", "prod")],
            basic_auth: vec![BasicAuthEntry::new("admin", "secret")],
            ip_restriction: Some(IpRestriction {
                depth: 4,
                ips: vec!["10.0.0.0/8".to_string()],
            }),
        };
        let graph = Compiler::new("le", &StaticHasher, &StaticHostIp::unavailable())
            .compile(&id, &input)
            .unwrap();

        // Act
        let projected = project(&id, &graph).unwrap();

        // Assert
        let expected = RouteDescription {
            basic_auth: vec![BasicAuthEntry::new("admin", "$static$secret")],
            ..input
        };
        assert_eq!(projected, expected);
    }

    #[test]
    fn understands_unsuffixed_references() {
        // Arrange
        let graph = decode("Test", LEGACY.as_bytes()).unwrap();

        // Act
        let route = project(&RouteId::new("Test"), &graph).unwrap();

        // Assert
        assert_eq!(route.name, "Test");
        assert_eq!(route.domain, "test.example.com");
        assert_eq!(route.backend.url, "http://1.2.3.4:80");
        assert!(route.https && route.force_tls && route.hsts && route.forward_auth);
        assert_eq!(route.headers, vec![HeaderEntry::new("X-Server-IP", "10.1.2.3")]);
        assert_eq!(route.ip_restriction, None);
    }

    #[test]
    fn missing_pieces_are_reported() {
        let id = RouteId::new("Test");
        let mut graph = decode("Test", LEGACY.as_bytes()).unwrap();
        graph.http.services.clear();

        assert_eq!(
            project(&id, &graph),
            Err(ProjectionError::MissingService {
                id: id.clone(),
                service: "Test".to_string(),
            })
        );

        graph.http.routers.clear();
        assert_eq!(
            project(&id, &graph),
            Err(ProjectionError::MissingRouter(id))
        );
    }
}
