//! Tests for GUID identity across saves and reloads

use graft_foundation::{GuidGenerator, Value};
use graft_serializer::{IdentityMap, LoadOptions, Serializer, decode_payload, discover};
use graft_storage::SceneHost;

use crate::common::scene;

#[test]
fn payload_order_follows_discovery() {
    let mut host = scene();
    let root = host.spawn("Crate", None).unwrap();
    let child = host.spawn("Entity", Some(root)).unwrap();
    let stats = host.attach("Stats", root).unwrap();
    let link = host.attach("Link", child).unwrap();

    let order = discover(&host, root).unwrap();
    assert_eq!(order, vec![root, stats, child, link]);

    let mut identity = IdentityMap::new();
    let payload = Serializer::default()
        .serialize(&host, root, &mut identity, &mut GuidGenerator::seeded(5))
        .unwrap();
    let manifest = decode_payload(&payload).unwrap();
    let expected: Vec<_> = order.iter().map(|o| identity.guid_of(*o).unwrap()).collect();
    assert_eq!(manifest.guids().collect::<Vec<_>>(), expected);
}

#[test]
fn loaded_objects_are_bound_to_their_saved_guids() {
    let mut source = scene();
    let root = source.spawn("Crate", None).unwrap();
    let stats = source.attach("Stats", root).unwrap();
    let mut saved = IdentityMap::new();
    let payload = Serializer::default()
        .serialize(&source, root, &mut saved, &mut GuidGenerator::seeded(5))
        .unwrap();

    let mut target = scene();
    let outcome = Serializer::default()
        .deserialize(&mut target, &payload, &LoadOptions::new())
        .unwrap();
    let loaded_stats = target.behavior_of_type(outcome.root, "Stats").unwrap();
    assert_eq!(outcome.identity.guid_of(outcome.root), saved.guid_of(root));
    assert_eq!(outcome.identity.guid_of(loaded_stats), saved.guid_of(stats));
}

#[test]
fn reuse_recreates_objects_that_are_gone() {
    let mut host = scene();
    let root = host.spawn("Crate", None).unwrap();
    let stats = host.attach("Stats", root).unwrap();
    host.set_field(stats, "hp", 8).unwrap();
    let link = host.attach("Link", root).unwrap();

    let serializer = Serializer::default();
    let mut identity = IdentityMap::new();
    let payload = serializer
        .serialize(&host, root, &mut identity, &mut GuidGenerator::seeded(9))
        .unwrap();
    host.destroy(stats).unwrap();

    let outcome = serializer
        .deserialize(&mut host, &payload, &LoadOptions::new().reusing(identity))
        .unwrap();
    assert_eq!(outcome.root, root);
    assert_eq!(outcome.reused, vec![root, link]);
    assert_eq!(outcome.created.len(), 1);
    let restored = host.behavior_of_type(root, "Stats").unwrap();
    assert_eq!(host.field(restored, "hp"), Some(&Value::Int(8)));
}

#[test]
fn pruning_forgets_destroyed_objects() {
    let mut host = scene();
    let root = host.spawn("Crate", None).unwrap();
    let stats = host.attach("Stats", root).unwrap();
    let mut identity = IdentityMap::new();
    Serializer::default()
        .serialize(&host, root, &mut identity, &mut GuidGenerator::seeded(2))
        .unwrap();
    let guid = identity.guid_of(stats).unwrap();

    host.destroy(stats).unwrap();
    assert_eq!(identity.prune(&host), 1);
    assert!(!identity.contains_guid(guid));
    assert!(identity.contains_object(root));
}
