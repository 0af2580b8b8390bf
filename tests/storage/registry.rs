//! Integration tests for type registration

use graft_foundation::{ErrorKind, FieldSchema, FieldType, TypeName};
use graft_storage::{ObjectKind, TypeRegistry, TypeSchema};

#[test]
fn registered_types_are_found_by_name() {
    let registry = TypeRegistry::new()
        .with(TypeSchema::entity("Door").with_field(FieldSchema::new("locked", FieldType::Bool)))
        .unwrap();
    let door = registry.get("Door").unwrap();
    assert_eq!(door.kind, ObjectKind::Entity);
    assert!(door.field("locked").is_some());
    assert!(door.field("open").is_none());
    assert_eq!(registry.len(), 2);
}

#[test]
fn default_entity_cannot_become_a_behavior() {
    let err = TypeRegistry::new()
        .with(TypeSchema::behavior(TypeRegistry::DEFAULT_ENTITY))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::KindMismatch { .. }));
}

#[test]
fn reregistering_replaces_schema() {
    let registry = TypeRegistry::new()
        .with(TypeSchema::behavior("Light"))
        .and_then(|r| r.with(TypeSchema::behavior("Light").with_field(FieldSchema::new("lux", FieldType::Float))))
        .unwrap();
    let light = registry
        .expect_kind(&TypeName::from("Light"), ObjectKind::Behavior)
        .unwrap();
    assert_eq!(light.fields.len(), 1);
}

#[test]
fn positional_types_are_flagged() {
    let schema = TypeSchema::behavior("Transform").positional();
    assert!(schema.positional);
    assert!(!TypeSchema::behavior("Light").positional);
}
