//! Best-effort backend reachability, for display only.

use crate::route::RouteDescription;
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use url::{Host, Url};

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Whether a TCP connection to the backend's host and port succeeds within
/// `timeout`. Name resolution and every connect attempt share that one
/// deadline. Unparsable URLs are unreachable.
pub fn probe_backend(url: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    let Some(addrs) = socket_addrs(url, timeout) else {
        debug!(url, "backend address not resolved");
        return false;
    };
    connect_any(&addrs, deadline)
}

/// Fill `backend.healthy` for every route. Probes run concurrently, so the
/// whole call is bounded by `timeout`.
pub fn annotate_health(routes: &mut [RouteDescription], timeout: Duration) {
    thread::scope(|scope| {
        for route in routes.iter_mut() {
            scope.spawn(move || {
                route.backend.healthy = probe_backend(&route.backend.url, timeout);
            });
        }
    });
}

fn connect_any(addrs: &[SocketAddr], deadline: Instant) -> bool {
    for addr in addrs {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return false;
        }
        if TcpStream::connect_timeout(addr, left).is_ok() {
            return true;
        }
    }
    false
}

fn socket_addrs(url: &str, timeout: Duration) -> Option<Vec<SocketAddr>> {
    let parsed = Url::parse(url).ok()?;
    let port = parsed.port_or_known_default()?;
    let host = match parsed.host()? {
        Host::Ipv4(ip) => return Some(vec![SocketAddr::new(IpAddr::V4(ip), port)]),
        Host::Ipv6(ip) => return Some(vec![SocketAddr::new(IpAddr::V6(ip), port)]),
        Host::Domain(name) => name.to_string(),
    };
    resolve_within(host, port, timeout)
}

/// The system resolver has no timeout of its own. The lookup runs on a
/// detached thread and is abandoned once `timeout` passes.
fn resolve_within(host: String, port: u16, timeout: Duration) -> Option<Vec<SocketAddr>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let addrs = (host.as_str(), port)
            .to_socket_addrs()
            .map(|addrs| addrs.collect::<Vec<_>>());
        let _ = tx.send(addrs);
    });
    rx.recv_timeout(timeout).ok()?.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Backend;
    use std::net::TcpListener;

    #[test]
    fn listening_backend_is_healthy() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        // Act
        let healthy = probe_backend(&format!("http://127.0.0.1:{}", port), PROBE_TIMEOUT);

        // Assert
        assert!(healthy);
    }

    #[test]
    fn unparsable_url_is_unhealthy() {
        assert!(!probe_backend("test.example.com", PROBE_TIMEOUT));
        assert!(!probe_backend("http://", PROBE_TIMEOUT));
    }

    #[test]
    fn annotates_each_route() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let closed = {
            let probe = TcpListener::bind("127.0.0.1:0").unwrap();
            probe.local_addr().unwrap().port()
        };
        let mut routes = vec![
            RouteDescription {
                backend: Backend::new(format!("http://127.0.0.1:{}", port)),
                ..Default::default()
            },
            RouteDescription {
                backend: Backend::new(format!("http://127.0.0.1:{}", closed)),
                ..Default::default()
            },
        ];

        // Act
        annotate_health(&mut routes, Duration::from_millis(500));

        // Assert
        assert!(routes[0].backend.healthy);
        assert!(!routes[1].backend.healthy);
    }

    #[test]
    fn attempts_share_one_deadline() {
        // Arrange
        // TEST-NET-1; connects either hang or fail fast.
        let addrs: Vec<SocketAddr> = ["192.0.2.1:81", "192.0.2.2:81", "192.0.2.3:81"]
            .iter()
            .map(|a| a.parse().unwrap())
            .collect();
        let timeout = Duration::from_millis(300);

        // Act
        let started = Instant::now();
        let reachable = connect_any(&addrs, started + timeout);
        let elapsed = started.elapsed();

        // Assert
        assert!(!reachable);
        assert!(elapsed < Duration::from_millis(600), "took {elapsed:?}");
    }

    #[test]
    fn expired_deadline_skips_connecting() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        assert!(!connect_any(&[addr], Instant::now()));
    }
}
