//! Tests for payloads written by older format versions

use graft_codec::ByteWriter;
use graft_foundation::{ErrorKind, Guid, GuidGenerator, ResourcePath, TypeName, Value};
use graft_serializer::header::Header;
use graft_serializer::versions::v2::{BaselineBody, BaselineObject};
use graft_serializer::versions::v5::{LabeledBody, LabeledRecord};
use graft_serializer::versions::v7::{NestedBody, NestedInstanceRecord, NestedObjectRecord};
use graft_serializer::{CURRENT_VERSION, LoadOptions, Serializer, peek_version};
use graft_storage::{ObjectKind, SceneHost};
use serde::Serialize;

use crate::common::scene;

fn payload<T: Serialize>(version: u16, body: &T) -> Vec<u8> {
    let body = rmp_serde::to_vec_named(body).unwrap();
    Header::new(version, "legacy editor").encode(&body).unwrap()
}

/// Field buffer for a `Stats` behavior.
fn stats_buffer(hp: i64, color: &str) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_i64(hp);
    w.write_str(color).unwrap();
    w.into_inner()
}

// =============================================================================
// Version 2
// =============================================================================

fn baseline() -> BaselineBody {
    let data = stats_buffer(12, "red");
    BaselineBody {
        types: vec![TypeName::from("Stats")],
        guids: vec![Guid::from_u128(1), Guid::from_u128(2)],
        objects: vec![
            BaselineObject {
                behavior_type: None,
                parent: None,
            },
            BaselineObject {
                behavior_type: Some(0),
                parent: Some(0),
            },
        ],
        data,
        offsets: vec![0, 0],
        ..BaselineBody::default()
    }
}

#[test]
fn baseline_payload_loads() {
    let mut target = scene();
    let outcome = Serializer::default()
        .deserialize(&mut target, &payload(2, &baseline()), &LoadOptions::new())
        .unwrap();

    assert_eq!(outcome.version, 2);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(target.type_name(outcome.root), Some(TypeName::from("Entity")));
    let stats = target.behavior_of_type(outcome.root, "Stats").unwrap();
    assert_eq!(target.field(stats, "hp"), Some(&Value::Int(12)));
    assert_eq!(target.field(stats, "color").and_then(Value::as_str), Some("red"));
}

#[test]
fn resaving_migrates_to_the_current_version() {
    let serializer = Serializer::default();
    let mut host = scene();
    let mut outcome = serializer
        .deserialize(&mut host, &payload(2, &baseline()), &LoadOptions::new())
        .unwrap();

    let resaved = serializer
        .serialize(&host, outcome.root, &mut outcome.identity, &mut GuidGenerator::seeded(1))
        .unwrap();
    assert_eq!(peek_version(&resaved).unwrap(), CURRENT_VERSION);

    let manifest = graft_serializer::decode_payload(&resaved).unwrap();
    let guids: Vec<Guid> = manifest.guids().collect();
    assert_eq!(guids, vec![Guid::from_u128(1), Guid::from_u128(2)]);
}

#[test]
fn baseline_type_index_out_of_range_is_corrupt() {
    let mut body = baseline();
    body.objects[1].behavior_type = Some(4);
    let mut target = scene();
    let err = Serializer::default()
        .deserialize(&mut target, &payload(2, &body), &LoadOptions::new())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CorruptPayload(_)));
    assert!(target.is_empty());
}

// =============================================================================
// Version 5
// =============================================================================

#[test]
fn labeled_payload_keeps_labels() {
    let body = LabeledBody {
        types: vec![TypeName::from("Stats")],
        guids: vec![Guid::from_u128(10), Guid::from_u128(11)],
        objects: vec![
            LabeledRecord {
                label: Some("Barrel".into()),
                ..LabeledRecord::default()
            },
            LabeledRecord {
                behavior_type: Some(0),
                owner: Some(0),
                label: None,
                buffer: stats_buffer(3, "green"),
            },
        ],
        ..LabeledBody::default()
    };

    let mut target = scene();
    let outcome = Serializer::default()
        .deserialize(&mut target, &payload(5, &body), &LoadOptions::new())
        .unwrap();
    assert_eq!(outcome.version, 5);
    assert_eq!(target.label(outcome.root).as_deref(), Some("Barrel"));
    let stats = target.behavior_of_type(outcome.root, "Stats").unwrap();
    assert_eq!(target.field(stats, "hp"), Some(&Value::Int(3)));
}

// =============================================================================
// Version 7
// =============================================================================

#[test]
fn nested_table_comes_back_as_live_links() {
    let body = NestedBody {
        types: vec![TypeName::from("Crate"), TypeName::from("Entity")],
        guids: vec![Guid::from_u128(20), Guid::from_u128(21)],
        objects: vec![
            NestedObjectRecord {
                kind: ObjectKind::Entity.code(),
                type_index: 0,
                ..NestedObjectRecord::default()
            },
            NestedObjectRecord {
                kind: ObjectKind::Entity.code(),
                type_index: 1,
                owner: Some(0),
                ..NestedObjectRecord::default()
            },
        ],
        nested: vec![NestedInstanceRecord {
            asset: ResourcePath::from("props/crate"),
            root: Guid::from_u128(21),
            members: vec![(Guid::from_u128(21), Guid::from_u128(900))],
        }],
        ..NestedBody::default()
    };

    let mut target = scene();
    let outcome = Serializer::default()
        .deserialize(&mut target, &payload(7, &body), &LoadOptions::new())
        .unwrap();
    assert_eq!(outcome.nested.len(), 1);
    let link = &outcome.nested[0];
    let inner = target.children(outcome.root)[0];
    assert_eq!(link.asset, ResourcePath::from("props/crate"));
    assert_eq!(link.root, inner);
    assert_eq!(link.members, vec![(inner, Guid::from_u128(900))]);
    assert!(link.overrides.is_empty());
    assert_eq!(link.fingerprint, None);
}
