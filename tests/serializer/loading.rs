//! Tests for load options

use graft_foundation::{ErrorKind, GuidGenerator, Value};
use graft_serializer::{IdentityMap, LoadOptions, Serializer, SerializerConfig, decode_payload};
use graft_storage::{FieldAccessor, SceneHost};

use crate::common::{save, scene};

#[test]
fn load_under_a_parent_attaches_the_root() {
    let mut source = scene();
    let root = source.spawn("Crate", None).unwrap();
    source.set_field(root, "sealed", true).unwrap();
    let payload = save(&source, root);

    let mut target = scene();
    let shelf = target.spawn("Entity", None).unwrap();
    let outcome = Serializer::default()
        .deserialize(&mut target, &payload, &LoadOptions::under(shelf))
        .unwrap();

    assert_eq!(target.owner(outcome.root), Some(shelf));
    assert_eq!(target.children(shelf), &[outcome.root]);
    assert_eq!(target.field(outcome.root, "sealed"), Some(&Value::Bool(true)));
}

#[test]
fn type_substitution_loads_the_replacement_type() {
    let mut source = scene();
    let root = source.spawn("Crate", None).unwrap();
    let stats = source.attach("Legacy", root).unwrap();
    source.set_field(stats, "hp", 4).unwrap();
    let payload = save(&source, root);

    let mut target = scene();
    let options = LoadOptions::new().replace_type("Legacy", "Stats");
    let outcome = Serializer::default().deserialize(&mut target, &payload, &options).unwrap();

    assert!(target.behavior_of_type(outcome.root, "Legacy").is_none());
    let loaded = target.behavior_of_type(outcome.root, "Stats").unwrap();
    assert_eq!(target.field(loaded, "hp"), Some(&Value::Int(4)));
}

#[test]
fn labels_survive_a_round_trip() {
    let mut source = scene();
    let root = source.spawn("Crate", None).unwrap();
    source.set_label(root, Some("Supply".into())).unwrap();
    let lid = source.spawn("Entity", Some(root)).unwrap();
    source.set_label(lid, Some("Lid".into())).unwrap();

    let payload = save(&source, root);
    let manifest = decode_payload(&payload).unwrap();
    assert_eq!(manifest.objects[0].label.as_deref(), Some("Supply"));

    let mut target = scene();
    let outcome = Serializer::default()
        .deserialize(&mut target, &payload, &LoadOptions::new())
        .unwrap();
    assert_eq!(target.label(outcome.root).as_deref(), Some("Supply"));
    assert!(target.child_labeled(outcome.root, "Lid").is_some());
}

#[test]
fn engine_stamp_is_written_to_the_header() {
    let mut source = scene();
    let root = source.spawn("Crate", None).unwrap();
    let serializer = Serializer::new(SerializerConfig::new().with_engine_stamp("editor 7.1"));
    let payload = serializer
        .serialize(&source, root, &mut IdentityMap::new(), &mut GuidGenerator::seeded(1))
        .unwrap();
    assert_eq!(decode_payload(&payload).unwrap().stamp, "editor 7.1");
}

#[test]
fn truncated_payload_is_corrupt_and_creates_nothing() {
    let mut source = scene();
    let root = source.spawn("Crate", None).unwrap();
    source.attach("Stats", root).unwrap();
    let mut payload = save(&source, root);
    payload.truncate(payload.len() / 2);

    let mut target = scene();
    let err = Serializer::default()
        .deserialize(&mut target, &payload, &LoadOptions::new())
        .unwrap_err();
    assert!(!matches!(err.kind, ErrorKind::UnsupportedVersion(_)));
    assert!(target.is_empty());
}

#[test]
fn references_between_behaviors_resolve_after_load() {
    let mut source = scene();
    let root = source.spawn("Crate", None).unwrap();
    let stats = source.attach("Stats", root).unwrap();
    let link = source.attach("Link", root).unwrap();
    source.set_field(link, "target", Value::object(stats)).unwrap();

    let mut target = scene();
    let outcome = Serializer::default()
        .deserialize(&mut target, &save(&source, root), &LoadOptions::new())
        .unwrap();
    let loaded_stats = target.behavior_of_type(outcome.root, "Stats").unwrap();
    let loaded_link = target.behavior_of_type(outcome.root, "Link").unwrap();
    assert_eq!(target.get(loaded_link, "target"), Some(Value::object(loaded_stats)));
}
