use crate::graph::Middleware;
use crate::store::{StoreError, decode, encode};
use pretty_assertions::assert_eq;

const HAND_EDITED: &str = r#"http:
  routers:
    blog_0a1b2c3d:
      entryPoints:
      - websecure
      rule: Host(`blog.example.com`)
      service: blog_0a1b2c3d@file
      tls:
        certResolver: le
      priority: 10
  services:
    blog_0a1b2c3d:
      loadBalancer:
        servers:
        - url: http://10.0.0.5:8080
        passHostHeader: true
  middlewares:
    blog_0a1b2c3d-compress:
      compress: {}
tcp:
  routers: {}
"#;

#[test]
fn unmanaged_keys_survive_a_decode_encode_cycle() {
    // Act
    let graph = decode("blog_0a1b2c3d", HAND_EDITED.as_bytes()).unwrap();
    let bytes = encode("blog_0a1b2c3d", &graph).unwrap();

    // Assert
    assert_eq!(String::from_utf8(bytes).unwrap(), HAND_EDITED);
    let router = &graph.http.routers["blog_0a1b2c3d"];
    assert!(router.extra.contains_key("priority"));
    assert!(graph.extra.contains_key("tcp"));
    assert!(matches!(
        graph.http.middlewares["blog_0a1b2c3d-compress"],
        Middleware::Other(_)
    ));
}

#[test]
fn absent_optional_fields_are_omitted() {
    // Arrange
    let yaml = "http:\n  routers:\n    blog_0a1b2c3d-http:\n      entryPoints:\n      - web\n      rule: Host(`blog.example.com`)\n";
    let graph = decode("blog_0a1b2c3d", yaml.as_bytes()).unwrap();

    // Act
    let out = String::from_utf8(encode("blog_0a1b2c3d", &graph).unwrap()).unwrap();

    // Assert
    assert_eq!(out, yaml);
    assert!(!out.contains("middlewares"));
    assert!(!out.contains("tls"));
}

const SPARSE: &str = r#"http:
  routers:
    blog_0a1b2c3d-http:
      entryPoints: []
      rule: Host(`blog.example.com`)
      middlewares: []
  services:
    blog_0a1b2c3d:
      loadBalancer: {}
  middlewares:
    blog_0a1b2c3d-basicauth:
      basicAuth:
        usersFile: /etc/traefik/users
    blog_0a1b2c3d-headers:
      headers: {}
    blog_0a1b2c3d-iprestrict:
      ipWhiteList:
        ipStrategy:
          excludedIPs:
          - 10.0.0.1
    blog_0a1b2c3d-redirect:
      redirectScheme:
        scheme: https
"#;

#[test]
fn absent_and_empty_fields_stay_distinct() {
    // Act
    let graph = decode("blog_0a1b2c3d", SPARSE.as_bytes()).unwrap();
    let bytes = encode("blog_0a1b2c3d", &graph).unwrap();

    // Assert
    assert_eq!(String::from_utf8(bytes).unwrap(), SPARSE);
    let router = &graph.http.routers["blog_0a1b2c3d-http"];
    assert_eq!(router.entry_points, Some(vec![]));
    assert_eq!(router.middlewares, Some(vec![]));
    let auth = graph.http.middlewares["blog_0a1b2c3d-basicauth"]
        .as_basic_auth()
        .unwrap();
    assert_eq!(auth.users, None);
}

#[test]
fn object_without_http_section_stays_without_one() {
    let yaml = "tcp:\n  routers: {}\n";
    let graph = decode("tcp-only", yaml.as_bytes()).unwrap();

    let out = String::from_utf8(encode("tcp-only", &graph).unwrap()).unwrap();

    assert_eq!(out, yaml);
}

#[test]
fn malformed_object_names_its_key() {
    let err = decode("broken", b"http: [unclosed").unwrap_err();

    match err {
        StoreError::Decode { key, .. } => assert_eq!(key, "broken"),
        other => panic!("unexpected error: {:?}", other),
    }
}
