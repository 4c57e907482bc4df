//! The shared object holding middlewares every route may reference.

use crate::graph::{ConfigGraph, ForwardAuth, Headers, Middleware, RedirectScheme};

/// Store key of the shared object. The `sys_` prefix keeps it out of listings.
pub const SYSTEM_OBJECT: &str = "sys_middlewares";

pub const REDIRECT_SCHEME: &str = "sys-redirscheme";
pub const HSTS: &str = "sys-hsts";
pub const FORWARD_AUTH: &str = "sys-forwardauth";

/// One year.
pub const HSTS_MAX_AGE_SECONDS: u64 = 31_536_000;

pub const DEFAULT_LISTEN_PORT: u16 = 8099;

/// Inputs of the shared middleware object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemMiddlewares {
    /// Port of the local auth callback.
    pub listen_port: u16,
    /// The forward-auth entry is only defined when an auth endpoint exists.
    pub forward_auth: bool,
}

impl Default for SystemMiddlewares {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_LISTEN_PORT,
            forward_auth: false,
        }
    }
}

impl SystemMiddlewares {
    pub fn forward_auth_address(&self) -> String {
        format!("http://localhost:{}/auth", self.listen_port)
    }

    pub fn graph(&self) -> ConfigGraph {
        let mut graph = ConfigGraph::default();
        let middlewares = &mut graph.http.middlewares;

        middlewares.insert(
            REDIRECT_SCHEME.to_string(),
            Middleware::RedirectScheme(RedirectScheme {
                scheme: "https".to_string(),
                permanent: Some(true),
                ..Default::default()
            }),
        );
        middlewares.insert(
            HSTS.to_string(),
            Middleware::Headers(Headers {
                sts_seconds: Some(HSTS_MAX_AGE_SECONDS),
                ..Default::default()
            }),
        );
        if self.forward_auth {
            middlewares.insert(
                FORWARD_AUTH.to_string(),
                Middleware::ForwardAuth(ForwardAuth {
                    address: self.forward_auth_address(),
                    ..Default::default()
                }),
            );
        }

        graph
    }

    /// Names a route object may reference without defining them itself.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = vec![REDIRECT_SCHEME, HSTS];
        if self.forward_auth {
            names.push(FORWARD_AUTH);
        }
        names
    }
}

/// Every well-known name, whether or not it is currently defined.
pub const WELL_KNOWN: [&str; 3] = [REDIRECT_SCHEME, HSTS, FORWARD_AUTH];
