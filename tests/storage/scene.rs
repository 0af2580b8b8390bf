//! Integration tests for the in-memory scene

use std::sync::Arc;

use graft_foundation::{ErrorKind, FieldSchema, FieldType, Name, Value};
use graft_storage::{FieldAccessor, ObjectKind, OwnershipGraph, Scene, SceneHost, TypeRegistry, TypeSchema};

fn scene() -> Scene {
    let registry = TypeRegistry::new()
        .with(TypeSchema::entity("Room"))
        .and_then(|r| {
            r.with(
                TypeSchema::behavior("Lamp")
                    .with_field(FieldSchema::new("lux", FieldType::Float).with_default(Value::Float(300.0)))
                    .with_field(FieldSchema::new("switch", FieldType::Reference)),
            )
        })
        .unwrap();
    Scene::new(Arc::new(registry))
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn behaviors_are_listed_before_children() {
    let mut scene = scene();
    let room = scene.spawn("Room", None).unwrap();
    let closet = scene.spawn("Room", Some(room)).unwrap();
    let lamp = scene.attach("Lamp", room).unwrap();

    assert_eq!(scene.owned(room), vec![lamp, closet]);
    assert_eq!(scene.kind(lamp), Some(ObjectKind::Behavior));
    assert_eq!(scene.owner(closet), Some(room));
    assert_eq!(scene.roots(), &[room]);
}

#[test]
fn entities_cannot_live_under_behaviors() {
    let mut scene = scene();
    let room = scene.spawn("Room", None).unwrap();
    let lamp = scene.attach("Lamp", room).unwrap();
    let err = scene.spawn("Room", Some(lamp)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidRoot(_)));
}

#[test]
fn reparenting_refuses_cycles() {
    let mut scene = scene();
    let house = scene.spawn("Room", None).unwrap();
    let hall = scene.spawn("Room", Some(house)).unwrap();
    let err = scene.reparent(house, Some(hall)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::StructuralCycle(_)));

    let shed = scene.spawn("Room", None).unwrap();
    scene.reparent(hall, Some(shed)).unwrap();
    assert_eq!(scene.children(shed), &[hall]);
    assert!(scene.children(house).is_empty());
}

#[test]
fn destroy_takes_the_subtree_and_invalidates_handles() {
    let mut scene = scene();
    let room = scene.spawn("Room", None).unwrap();
    let lamp = scene.attach("Lamp", room).unwrap();
    let closet = scene.spawn("Room", Some(room)).unwrap();

    scene.destroy(room).unwrap();
    assert!(!scene.exists(room));
    assert!(!scene.exists(lamp));
    assert!(!scene.exists(closet));
    assert!(scene.is_empty());

    let fresh = scene.spawn("Room", None).unwrap();
    assert_ne!(fresh, room);
    assert!(scene.destroy(room).is_err());
}

// =============================================================================
// Fields
// =============================================================================

#[test]
fn fields_start_at_their_defaults() {
    let mut scene = scene();
    let room = scene.spawn("Room", None).unwrap();
    let lamp = scene.attach("Lamp", room).unwrap();
    assert_eq!(scene.field(lamp, "lux"), Some(&Value::Float(300.0)));
    assert_eq!(scene.get(lamp, "switch"), Some(Value::Nil));
}

#[test]
fn set_checks_declared_type() {
    let mut scene = scene();
    let room = scene.spawn("Room", None).unwrap();
    let lamp = scene.attach("Lamp", room).unwrap();

    let err = scene.set_field(lamp, "lux", "bright").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    let err = scene.set(lamp, &Name::from("hue"), Value::Int(1)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::FieldNotFound { .. }));

    scene.set_field(lamp, "switch", Value::object(room)).unwrap();
    assert_eq!(scene.field(lamp, "switch"), Some(&Value::object(room)));
}

#[test]
fn labels_find_children() {
    let mut scene = scene();
    let room = scene.spawn("Room", None).unwrap();
    let attic = scene.spawn("Room", Some(room)).unwrap();
    scene.set_label(attic, Some("Attic".into())).unwrap();

    assert_eq!(scene.child_labeled(room, "Attic"), Some(attic));
    assert_eq!(scene.label(attic).as_deref(), Some("Attic"));
    assert!(scene.child_labeled(room, "Cellar").is_none());
}

#[test]
fn scratch_shares_resources_only() {
    let mut scene = scene();
    scene.register_resource("tex/wallpaper");
    scene.spawn("Room", None).unwrap();

    let scratch = scene.scratch();
    assert!(scratch.is_empty());
    assert!(scratch.resolve_resource(&"tex/wallpaper".into()));
    assert!(!scratch.resolve_resource(&"tex/carpet".into()));
}
