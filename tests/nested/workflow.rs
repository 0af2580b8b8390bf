//! Tests for editing instances and picking up asset changes

use graft_foundation::{ErrorKind, Value};
use graft_storage::SceneHost;

use crate::common::{Author, engine, place, scene, text};

// =============================================================================
// Overrides and refresh
// =============================================================================

#[test]
fn asset_changes_reach_every_instance_except_overridden_fields() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    let mut level = scene();
    let a = place(&mut engine, &mut level, None);
    let b = place(&mut engine, &mut level, None);
    let lamp_a = level.behavior_of_type(a, "Lamp").unwrap();
    engine
        .begin_session(&mut level, lamp_a)
        .unwrap()
        .set_override(lamp_a, "color", "crimson".into())
        .unwrap();

    let lamp = author.lamp();
    author.scene.set_field(lamp, "color", "white").unwrap();
    author.scene.set_field(lamp, "lux", 500).unwrap();
    let glass = author.scene.attach("Glass", author.root).unwrap();
    author.scene.set_field(glass, "tint", "clear").unwrap();
    author.publish(&mut engine);

    let mut stale = engine.stale_instances();
    stale.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(stale, expected);

    let reports = engine.refresh(&mut level, true).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.changed && r.added.len() == 1));
    assert!(engine.stale_instances().is_empty());

    let lamp_a = level.behavior_of_type(a, "Lamp").unwrap();
    let lamp_b = level.behavior_of_type(b, "Lamp").unwrap();
    assert_eq!(text(&level, lamp_a, "color").as_deref(), Some("crimson"));
    assert_eq!(text(&level, lamp_b, "color").as_deref(), Some("white"));
    assert_eq!(level.field(lamp_a, "lux"), Some(&Value::Int(500)));
    assert_eq!(level.field(lamp_b, "lux"), Some(&Value::Int(500)));
    for root in [a, b] {
        let glass = level.behavior_of_type(root, "Glass").unwrap();
        assert_eq!(text(&level, glass, "tint").as_deref(), Some("clear"));
    }
    assert!(engine.record(a).unwrap().overrides.contains(lamp_a, "color"));
}

#[test]
fn revert_drops_the_override_and_restores_the_asset_value() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    let mut level = scene();
    let root = place(&mut engine, &mut level, None);
    let lamp = level.behavior_of_type(root, "Lamp").unwrap();

    let mut session = engine.begin_session(&mut level, root).unwrap();
    session.set_override(lamp, "lux", Value::Int(9000)).unwrap();
    let diagnostics = session.revert(lamp, ["lux"]).unwrap();
    assert!(diagnostics.is_empty());
    assert!(session.overrides().unwrap().is_empty());

    assert_eq!(level.field(lamp, "lux"), Some(&Value::Int(400)));
}

#[test]
fn applied_override_becomes_the_asset_value_for_everyone() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    let mut level = scene();
    let a = place(&mut engine, &mut level, None);
    let b = place(&mut engine, &mut level, None);
    let lamp_a = level.behavior_of_type(a, "Lamp").unwrap();

    let mut session = engine.begin_session(&mut level, a).unwrap();
    session.set_override(lamp_a, "color", "teal".into()).unwrap();
    session.apply_all().unwrap();
    assert!(session.overrides().unwrap().is_empty());

    assert_eq!(engine.stale_instances(), vec![b]);
    engine.refresh(&mut level, false).unwrap();
    let lamp_b = level.behavior_of_type(b, "Lamp").unwrap();
    assert_eq!(text(&level, lamp_b, "color").as_deref(), Some("teal"));
}

#[test]
fn placing_under_a_parent_keeps_the_instance_there_through_refresh() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    let mut level = scene();
    let shelf = level.spawn("Entity", None).unwrap();
    let root = place(&mut engine, &mut level, Some(shelf));

    let lamp = author.lamp();
    author.scene.set_field(lamp, "lux", 1).unwrap();
    author.publish(&mut engine);
    let report = engine.begin_session(&mut level, root).unwrap().reconcile().unwrap();

    let root = report.root.unwrap();
    assert_eq!(level.owner(root), Some(shelf));
    let lamp = level.behavior_of_type(root, "Lamp").unwrap();
    assert_eq!(level.field(lamp, "lux"), Some(&Value::Int(1)));
}

// =============================================================================
// Instance lifetime
// =============================================================================

#[test]
fn unpacked_instances_are_plain_objects() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    let mut level = scene();
    let root = place(&mut engine, &mut level, None);

    let record = engine.unpack(root).unwrap();
    assert_eq!(record.root, root);
    assert!(level.exists(root));
    assert!(engine.instance_of(root).is_none());
    let err = engine.begin_session(&mut level, root).err().unwrap();
    assert_eq!(err.kind, ErrorKind::NotNested(root));
}

#[test]
fn removed_instances_take_their_objects_with_them() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    let mut level = scene();
    let keep = place(&mut engine, &mut level, None);
    let drop = place(&mut engine, &mut level, None);

    engine.remove(&mut level, drop).unwrap();
    assert!(!level.exists(drop));
    assert!(engine.record(drop).is_none());
    assert!(engine.record(keep).is_some());
    assert_eq!(engine.records().count(), 1);
}
