//! Tests for assets that embed other assets

use graft_foundation::{ErrorKind, ResourcePath, Value};
use graft_nested::{OverrideEngine, fingerprint};
use graft_serializer::{IdentityMap, LoadOptions};
use graft_storage::SceneHost;

use crate::common::{Author, LANTERN, engine, place, scene, text};

const LEVEL: &str = "levels/cellar";

/// A level with two lanterns, the first one recolored.
fn build_level(engine: &mut OverrideEngine) {
    let mut level = scene();
    let root = level.spawn("Entity", None).unwrap();
    let a = place(engine, &mut level, Some(root));
    let b = place(engine, &mut level, Some(root));
    level.set_label(a, Some("Door".into())).unwrap();
    level.set_label(b, Some("Stairs".into())).unwrap();
    let lamp = level.behavior_of_type(a, "Lamp").unwrap();
    engine
        .begin_session(&mut level, a)
        .unwrap()
        .set_override(lamp, "color", "violet".into())
        .unwrap();

    engine
        .save_asset(&level, root, &ResourcePath::from(LEVEL), &mut IdentityMap::new())
        .unwrap();
}

#[test]
fn saved_level_records_what_it_embeds() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    build_level(&mut engine);

    let stored = engine.library().require(&ResourcePath::from(LEVEL)).unwrap();
    assert_eq!(stored.embeds, vec![ResourcePath::from(LANTERN)]);
    assert!(
        engine
            .library()
            .embeds_transitively(&ResourcePath::from(LEVEL), &ResourcePath::from(LANTERN))
    );
}

#[test]
fn embedding_a_level_restores_its_instances_and_overrides() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    build_level(&mut engine);

    let mut fresh = OverrideEngine::new(engine.library().clone());
    let mut world = scene();
    let level = fresh
        .embed(&mut world, &ResourcePath::from(LEVEL), &LoadOptions::new(), None)
        .unwrap();

    let door = world.child_labeled(level, "Door").unwrap();
    let stairs = world.child_labeled(level, "Stairs").unwrap();
    let door_lamp = world.behavior_of_type(door, "Lamp").unwrap();
    assert_eq!(text(&world, door_lamp, "color").as_deref(), Some("violet"));

    assert_eq!(fresh.instance_of(door_lamp), Some(door));
    assert_eq!(fresh.instance_of(stairs), Some(stairs));
    assert_eq!(fresh.instance_of(level), Some(level));
    assert!(fresh.record(door).unwrap().overrides.contains(door_lamp, "color"));
    assert!(fresh.record(stairs).unwrap().overrides.is_empty());
    assert!(fresh.stale_instances().is_empty());
}

#[test]
fn lantern_changes_make_the_level_stale_too() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    build_level(&mut engine);
    let before = fingerprint(engine.library(), &ResourcePath::from(LEVEL)).unwrap();

    let mut fresh = OverrideEngine::new(engine.library().clone());
    let mut world = scene();
    let level = fresh
        .embed(&mut world, &ResourcePath::from(LEVEL), &LoadOptions::new(), None)
        .unwrap();

    let lamp = author.lamp();
    author.scene.set_field(lamp, "lux", 75).unwrap();
    author.publish(&mut fresh);
    assert_ne!(before, fingerprint(fresh.library(), &ResourcePath::from(LEVEL)).unwrap());

    let stale = fresh.stale_instances();
    assert!(stale.contains(&level));
    assert_eq!(stale.len(), 3);

    let stairs = world.child_labeled(level, "Stairs").unwrap();
    fresh.begin_session(&mut world, stairs).unwrap().reconcile().unwrap();
    let stairs_lamp = world.behavior_of_type(stairs, "Lamp").unwrap();
    assert_eq!(world.field(stairs_lamp, "lux"), Some(&Value::Int(75)));
}

#[test]
fn a_level_cannot_be_embedded_into_a_lantern() {
    let mut author = Author::lantern();
    let mut engine = engine(&mut author);
    build_level(&mut engine);

    let mut workshop = scene();
    let err = engine
        .embed(
            &mut workshop,
            &ResourcePath::from(LEVEL),
            &LoadOptions::new(),
            Some(&ResourcePath::from(LANTERN)),
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NestedCycle(ResourcePath::from(LEVEL)));
    assert!(workshop.is_empty());
}
