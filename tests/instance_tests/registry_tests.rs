//! Tests for InstanceRegistry and bindings

use std::net::{IpAddr, Ipv4Addr};

use atlascoord::instance::{Instance, InstanceBindings, InstanceId, InstanceRegistry, InstanceStatus};
use atlascoord::CoordError;

fn bindings(last_octet: u8, port: u16) -> InstanceBindings {
    InstanceBindings {
        addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)),
        inport: port,
        inver: 1,
        outport: port + 1,
        outver: 1,
    }
}

#[test]
fn test_register_and_lookup() {
    let mut registry = InstanceRegistry::new();
    let id = registry
        .register(Instance::new(bindings(1, 2012), 10, 1))
        .unwrap();

    assert_eq!(id, InstanceId(1));
    assert!(registry.contains(id));
    assert!(registry.is_live(id));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(id).unwrap().pid(), 10);
}

#[test]
fn test_duplicate_token_rejected() {
    let mut registry = InstanceRegistry::new();
    registry.register(Instance::new(bindings(1, 2012), 10, 1)).unwrap();

    let err = registry
        .register(Instance::new(bindings(2, 2012), 11, 1))
        .unwrap_err();

    assert!(matches!(err, CoordError::DuplicateInstance(InstanceId(1))));
}

#[test]
fn test_mark_failed_once() {
    let mut registry = InstanceRegistry::new();
    registry.register(Instance::new(bindings(1, 2012), 10, 1)).unwrap();

    assert!(registry.mark_failed(InstanceId(1)).unwrap());
    assert!(!registry.mark_failed(InstanceId(1)).unwrap());
    assert!(!registry.is_live(InstanceId(1)));
    assert_eq!(
        registry.get(InstanceId(1)).unwrap().status(),
        InstanceStatus::Failed
    );
    assert_eq!(registry.live().count(), 0);
    assert_eq!(registry.iter().count(), 1);
}

#[test]
fn test_unknown_instance_errors() {
    let mut registry = InstanceRegistry::new();

    assert!(matches!(
        registry.mark_failed(InstanceId(9)),
        Err(CoordError::UnknownInstance(_))
    ));
    assert!(registry.remove(InstanceId(9)).is_err());
    assert!(!registry.is_live(InstanceId(9)));
}

#[test]
fn test_live_at_endpoint_matches_address_and_port() {
    let mut registry = InstanceRegistry::new();
    registry.register(Instance::new(bindings(1, 2012), 10, 1)).unwrap();
    registry.register(Instance::new(bindings(1, 3000), 11, 2)).unwrap();

    let restarted = InstanceBindings {
        inver: 2,
        outver: 2,
        ..bindings(1, 2012)
    };
    assert_eq!(registry.live_at_endpoint(&restarted), Some(InstanceId(1)));
    assert_eq!(registry.live_at_endpoint(&bindings(2, 2012)), None);

    registry.mark_failed(InstanceId(1)).unwrap();
    assert_eq!(registry.live_at_endpoint(&restarted), None);
}

#[test]
fn test_bindings_display() {
    let b = bindings(7, 2012);
    assert_eq!(b.to_string(), "10.0.0.7:2012.1/2013.1");
}
