use integration_tests::harness::{TestFleet, route};
use pretty_assertions::assert_eq;
use waypost_core::identity::RouteId;
use waypost_core::manager::ForwardAuthOp;
use waypost_core::route::BasicAuthEntry;
use waypost_core::store::ObjectStore;
use waypost_core::system::{FORWARD_AUTH, SYSTEM_OBJECT, SystemMiddlewares, WELL_KNOWN};

fn fleet_with_forward_auth(names: &[&str]) -> (TestFleet, Vec<RouteId>) {
    let fleet = TestFleet::new();
    let ids = names
        .iter()
        .map(|name| {
            let domain = format!("{}.example.com", name);
            let mut input = route(name, &domain, "http://10.0.0.5:8080");
            input.forward_auth = true;
            fleet.manager.add(&input).unwrap().id
        })
        .collect();
    (fleet, ids)
}

#[test]
fn migration_hashes_legacy_id_without_dangling_references() {
    // Arrange
    let fleet = TestFleet::new();
    fleet.seed("Test.yaml");
    fleet.seed("sys_middlewares.yaml");

    // Act
    let migrated = fleet.manager.migrate_schema().unwrap();

    // Assert
    assert_eq!(migrated.len(), 1);
    let (old, new) = &migrated[0];
    assert_eq!(old, &RouteId::new("Test"));
    assert_eq!(new.name(), "Test");
    assert_eq!(new.hash().map(str::len), Some(8));
    assert_eq!(
        fleet.files(),
        vec![new.file_name(), "sys_middlewares.yaml".to_string()]
    );

    let graph = fleet.stored(new);
    assert!(graph.dangling_references(&WELL_KNOWN).is_empty());
    let raw = fleet.raw(new);
    for line in raw.lines() {
        let token = line.trim_start_matches(['-', ' ']);
        assert!(
            !token.starts_with("Test-") && !line.ends_with(": Test"),
            "reference to old id survived: {line}"
        );
    }

    let described = fleet.manager.get(new).unwrap().unwrap().describe().unwrap();
    assert_eq!(described.domain, "test.example.com");
    assert_eq!(described.backend.url, "http://1.2.3.4:80");
    assert!(described.https && described.force_tls && described.forward_auth);
    assert!(!described.hsts);
    assert_eq!(described.headers.len(), 2);
    assert_eq!(described.basic_auth.len(), 1);
    assert_eq!(described.ip_restriction.map(|r| r.depth), Some(1));
}

#[test]
fn forward_auth_remove_then_add_restores_every_router() {
    // Arrange
    let (fleet, ids) = fleet_with_forward_auth(&["blog", "wiki", "shop"]);

    // Act
    fleet.manager.set_forward_auth(ForwardAuthOp::Remove).unwrap();

    // Assert
    for id in &ids {
        assert!(!fleet.stored(id).any_router_has_middleware(FORWARD_AUTH));
        assert!(!fleet.raw(id).contains(FORWARD_AUTH));
    }

    // Act
    fleet.manager.set_forward_auth(ForwardAuthOp::Add).unwrap();

    // Assert
    for id in &ids {
        let graph = fleet.stored(id);
        assert_eq!(graph.http.routers.len(), 2);
        for router in graph.http.routers.values() {
            let count = router
                .middleware_refs()
                .iter()
                .filter(|r| r.starts_with(FORWARD_AUTH))
                .count();
            assert_eq!(count, 1);
        }
    }
}

#[test]
fn cert_resolver_change_reaches_the_whole_fleet() {
    // Arrange
    let (mut fleet, ids) = fleet_with_forward_auth(&["blog", "wiki"]);

    // Act
    let rewritten = fleet.manager.set_cert_resolver("dns01").unwrap();

    // Assert
    assert_eq!(rewritten, 2);
    for id in &ids {
        let graph = fleet.stored(id);
        let tls = graph.http.routers[id.as_str()].tls.as_ref().unwrap();
        assert_eq!(tls.cert_resolver.as_deref(), Some("dns01"));
    }

    // New routes pick up the new resolver too.
    let added = fleet
        .manager
        .add(&route("shop", "shop.example.com", "http://10.0.0.7:80"))
        .unwrap();
    assert!(fleet.raw(&added.id).contains("certResolver: dns01"));
}

#[test]
fn bootstrap_sequence_without_auth_endpoint() {
    // Arrange
    let (mut fleet, ids) = fleet_with_forward_auth(&["blog"]);
    fleet.seed("Test.yaml");
    let system = SystemMiddlewares {
        listen_port: 8099,
        forward_auth: false,
    };

    // Act
    fleet.manager.write_system_middlewares(&system).unwrap();
    let migrated = fleet.manager.migrate_schema().unwrap();
    fleet.manager.set_cert_resolver("dns01").unwrap();
    fleet.manager.set_forward_auth(ForwardAuthOp::Remove).unwrap();

    // Assert
    assert!(fleet.manager.store().exists(SYSTEM_OBJECT).unwrap());

    let routes = fleet.manager.list_descriptions().unwrap();
    assert_eq!(routes.len(), 2);
    assert!(routes.iter().all(|r| !r.forward_auth));
    assert_eq!(migrated.len(), 1);
    assert!(fleet.manager.get(&ids[0]).unwrap().is_some());
}

#[test]
fn listing_keeps_stored_hashes_for_edit_round_trip() {
    let fleet = TestFleet::new();
    let mut input = route("blog", "blog.example.com", "http://10.0.0.5:8080");
    input.basic_auth = vec![BasicAuthEntry::new("admin", "secret")];
    fleet.manager.add(&input).unwrap();

    let listed = fleet.manager.list_descriptions().unwrap();
    let updated = fleet.manager.update(&listed[0]).unwrap();

    assert_eq!(updated.describe().unwrap().basic_auth, listed[0].basic_auth);
}
