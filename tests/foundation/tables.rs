//! Integration tests for per-session reference tables

use graft_foundation::{Name, ReferenceTables, ResourcePath, TypeName};

#[test]
fn interning_is_idempotent() {
    let mut tables = ReferenceTables::new();
    let a = tables.find_or_add_name(&Name::from("color")).unwrap();
    let b = tables.find_or_add_name(&Name::from("range")).unwrap();
    assert_eq!(tables.find_or_add_name(&Name::from("color")).unwrap(), a);
    assert_ne!(a, b);
    assert_eq!(tables.names().len(), 2);
    assert_eq!(tables.name(b), Some(&Name::from("range")));
}

#[test]
fn kinds_are_indexed_separately() {
    let mut tables = ReferenceTables::new();
    let r = tables.find_or_add_resource(&ResourcePath::from("mesh/rock")).unwrap();
    let t = tables.find_or_add_type(&TypeName::from("Rock")).unwrap();
    assert_eq!(r, 0);
    assert_eq!(t, 0);
    assert_eq!(tables.type_name(t), Some(&TypeName::from("Rock")));
    assert!(tables.resource(1).is_none());
}

#[test]
fn replacement_keeps_indices() {
    let mut tables = ReferenceTables::new();
    let idx = tables.find_or_add_resource(&ResourcePath::from("old")).unwrap();
    assert!(tables.replace_resource(&ResourcePath::from("old"), &ResourcePath::from("new")));
    assert_eq!(tables.resource(idx), Some(&ResourcePath::from("new")));
    assert_eq!(tables.find_resource(&ResourcePath::from("new")), Some(idx));
    assert!(!tables.replace_resource(&ResourcePath::from("old"), &ResourcePath::from("x")));
}

#[test]
fn from_parts_restores_lookups() {
    let tables = ReferenceTables::from_parts(
        vec![ResourcePath::from("a"), ResourcePath::from("b")],
        Vec::new(),
        vec![Name::from("n")],
    );
    assert_eq!(tables.find_resource(&ResourcePath::from("b")), Some(1));
    assert_eq!(tables.name(0), Some(&Name::from("n")));
}
