//! Integration tests for Value and FieldType

use graft_foundation::{FieldSchema, FieldType, Name, ObjectId, RecordSchema, Reference, Value};

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn conversions_pick_matching_variants() {
    assert_eq!(Value::from(true).as_bool(), Some(true));
    assert_eq!(Value::from(7).as_int(), Some(7));
    assert_eq!(Value::from(2.5).as_float(), Some(2.5));
    assert_eq!(Value::from("moss").as_str(), Some("moss"));
    assert!(Value::Nil.is_nil());
}

#[test]
fn object_and_resource_references() {
    let id = ObjectId::new(3, 1);
    assert_eq!(Value::object(id).as_object(), Some(id));
    assert!(matches!(
        Value::resource("tex/bark"),
        Value::Ref(Reference::Resource(ref p)) if p.as_str() == "tex/bark"
    ));
}

#[test]
fn for_each_object_walks_aggregates() {
    let a = ObjectId::new(1, 1);
    let b = ObjectId::new(2, 1);
    let value = Value::record([
        ("first", Value::object(a)),
        ("rest", Value::from(vec![Value::object(b), Value::resource("x")])),
    ]);
    let mut seen = Vec::new();
    value.for_each_object(&mut |o| seen.push(o));
    seen.sort();
    assert_eq!(seen, vec![a, b]);
}

// =============================================================================
// Field Types
// =============================================================================

#[test]
fn references_accept_nil() {
    assert!(FieldType::Reference.accepts(&Value::Nil));
    assert!(!FieldType::Int.accepts(&Value::Nil));
    assert!(FieldType::list(FieldType::Int).accepts(&Value::from(vec![1, 2])));
}

#[test]
fn record_defaults_cover_every_field() {
    let schema = RecordSchema::new("Color")
        .with_field(FieldSchema::new("r", FieldType::Float))
        .with_field(FieldSchema::new("a", FieldType::Float).with_default(Value::Float(1.0)));
    let value = FieldType::record(schema).default_value();
    let record = value.as_record().unwrap();
    assert_eq!(record.get(&Name::from("r")), Some(&Value::Float(0.0)));
    assert_eq!(record.get(&Name::from("a")), Some(&Value::Float(1.0)));
}

#[test]
fn explicit_default_wins() {
    let field = FieldSchema::new("scale", FieldType::Float).with_default(Value::Float(1.0));
    assert_eq!(field.default_value(), Value::Float(1.0));
    assert_eq!(FieldSchema::new("hp", FieldType::Int).default_value(), Value::Int(0));
}

#[test]
fn runtime_only_flags() {
    assert!(FieldSchema::new("cache", FieldType::Int).transient().is_runtime_only());
    assert!(FieldSchema::new("on_hit", FieldType::Reference).delegate().is_runtime_only());
    let inline = FieldSchema::new("gem", FieldType::Reference).instanced();
    assert!(inline.flags.instanced);
    assert!(!inline.is_runtime_only());
}
