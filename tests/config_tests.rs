//! Configuration and construction tests

use std::time::Duration;

use streamhub::config::{PortRoles, ServerConfig};
use streamhub::{HubError, TcpServer};

#[test]
fn test_builder_defaults() {
    let config = ServerConfig::default();
    assert!(config.write_port.is_none());
    assert!(config.read_port.is_none());
    assert_eq!(config.protocol_name, "BURST");
    assert!(!config.use_dns);
    assert!(config.acl.is_none());
}

#[test]
fn test_builder_sets_fields() {
    let config = ServerConfig::builder()
        .write_port(8888)
        .read_port(8889)
        .protocol("LENGTH")
        .protocol_args(["2"])
        .read_timeout(Duration::from_millis(100))
        .use_dns(true)
        .build();

    assert_eq!(config.write_port, Some(8888));
    assert_eq!(config.read_port, Some(8889));
    assert_eq!(config.protocol_name, "LENGTH");
    assert_eq!(config.protocol_args, vec!["2".to_string()]);
    assert_eq!(config.read_timeout, Some(Duration::from_millis(100)));
    assert!(config.use_dns);
}

// =============================================================================
// Bind Plan
// =============================================================================

#[test]
fn test_bind_plan_merges_equal_ports() {
    let config = ServerConfig::builder().write_port(8888).read_port(8888).build();
    assert_eq!(
        config.bind_plan(),
        vec![PortRoles {
            port: 8888,
            read: true,
            write: true
        }]
    );
}

#[test]
fn test_bind_plan_distinct_ports() {
    let config = ServerConfig::builder().write_port(8888).read_port(8889).build();
    let plan = config.bind_plan();
    assert_eq!(plan.len(), 2);
    assert!(plan.contains(&PortRoles {
        port: 8888,
        read: false,
        write: true
    }));
    assert!(plan.contains(&PortRoles {
        port: 8889,
        read: true,
        write: false
    }));
}

#[test]
fn test_bind_plan_single_role() {
    let write_only = ServerConfig::builder().write_port(8888).build();
    assert_eq!(write_only.bind_plan().len(), 1);
    assert!(write_only.bind_plan()[0].write);
    assert!(!write_only.bind_plan()[0].read);

    let read_only = ServerConfig::builder().read_port(8889).build();
    assert_eq!(read_only.bind_plan().len(), 1);
    assert!(read_only.bind_plan()[0].read);

    let neither = ServerConfig::default();
    assert!(neither.bind_plan().is_empty());
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_server_rejects_bad_protocol_name() {
    let config = ServerConfig::builder()
        .write_port(8888)
        .read_port(8889)
        .protocol("Unknown")
        .build();

    match TcpServer::new(config) {
        Err(HubError::Config(msg)) => assert!(msg.contains("Unknown stream protocol")),
        other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_server_rejects_bad_protocol_args() {
    let config = ServerConfig::builder()
        .read_port(8889)
        .protocol("FIXED")
        .protocol_args(["nope"])
        .build();

    assert!(matches!(TcpServer::new(config), Err(HubError::Config(_))));
}

#[test]
fn test_server_construction_touches_no_socket() {
    // Construction with ports that could never bind still succeeds; only
    // connect() binds.
    let config = ServerConfig::builder().write_port(1).read_port(1).build();
    let server = TcpServer::new(config).unwrap();
    assert!(!server.connected());
    assert_eq!(server.num_clients(), 0);
}
