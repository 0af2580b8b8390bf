//! Tests for field streams

use std::collections::HashMap;

use graft_codec::{
    FieldRead, ObjectEncoding, ReferenceDecoder, ReferenceEncoder, ReferenceTag, StandardSkip, ValueReader,
    ValueWriter,
};
use graft_foundation::{
    FieldSchema, FieldType, Guid, Name, ObjectId, Reference, ReferenceTables, ResourcePath, TypeName, Value,
};

/// GUIDs for objects in the payload; everything else is dropped.
#[derive(Default)]
struct Payload {
    guids: HashMap<ObjectId, Guid>,
    objects: HashMap<Guid, ObjectId>,
}

impl Payload {
    fn with(mut self, id: ObjectId, guid: Guid) -> Self {
        self.guids.insert(id, guid);
        self.objects.insert(guid, id);
        self
    }
}

impl ReferenceEncoder for Payload {
    fn encode_object(&mut self, object: ObjectId) -> ObjectEncoding {
        self.guids
            .get(&object)
            .copied()
            .map_or(ObjectEncoding::None, ObjectEncoding::Guid)
    }
}

impl ReferenceDecoder for Payload {
    fn decode_guid(&mut self, guid: Guid) -> Option<ObjectId> {
        self.objects.get(&guid).copied()
    }
}

fn owner() -> TypeName {
    TypeName::from("Chest")
}

fn write(fields: &[(FieldSchema, Option<Value>)], refs: &mut Payload) -> (Vec<u8>, ReferenceTables) {
    let mut tables = ReferenceTables::new();
    let skip = StandardSkip::new();
    let mut writer = ValueWriter::new(&mut tables, refs, &skip);
    for (field, value) in fields {
        writer.write_field(&owner(), field, value.as_ref()).unwrap();
    }
    (writer.into_bytes(), tables)
}

// =============================================================================
// Scalars and interning
// =============================================================================

#[test]
fn mixed_fields_read_back_in_schema_order() {
    let fields = vec![
        (FieldSchema::new("open", FieldType::Bool), Some(Value::Bool(true))),
        (FieldSchema::new("gold", FieldType::Int), Some(Value::Int(250))),
        (FieldSchema::new("weight", FieldType::Float), Some(Value::Float(12.5))),
        (FieldSchema::new("owner", FieldType::String), Some(Value::from("Mira"))),
        (FieldSchema::new("kind", FieldType::Name), Some(Value::Name("oak".into()))),
    ];
    let mut refs = Payload::default();
    let (bytes, tables) = write(&fields, &mut refs);
    assert_eq!(tables.names(), &[Name::from("oak")]);

    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&bytes, &tables, &mut refs, &skip);
    for (field, value) in &fields {
        let expected = value.clone().unwrap();
        assert_eq!(reader.read_field(&owner(), field).unwrap(), FieldRead::Value(expected));
    }
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn missing_value_writes_the_field_default() {
    let field = FieldSchema::new("gold", FieldType::Int).with_default(Value::Int(5));
    let mut refs = Payload::default();
    let (bytes, tables) = write(&[(field.clone(), None)], &mut refs);

    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&bytes, &tables, &mut refs, &skip);
    assert_eq!(reader.read_field(&owner(), &field).unwrap(), FieldRead::Value(Value::Int(5)));
}

#[test]
fn mismatched_value_is_written_as_type_default() {
    let field = FieldSchema::new("gold", FieldType::Int);
    let mut refs = Payload::default();
    let (bytes, tables) = write(&[(field.clone(), Some(Value::from("lots")))], &mut refs);

    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&bytes, &tables, &mut refs, &skip);
    assert_eq!(reader.read_field(&owner(), &field).unwrap(), FieldRead::Value(Value::Int(0)));
}

#[test]
fn interned_names_share_one_table_entry() {
    let tags = FieldSchema::new("tags", FieldType::list(FieldType::Name));
    let value = Value::from(vec![
        Value::Name("heavy".into()),
        Value::Name("heavy".into()),
        Value::Name("locked".into()),
    ]);
    let mut refs = Payload::default();
    let (bytes, tables) = write(&[(tags.clone(), Some(value.clone()))], &mut refs);
    assert_eq!(tables.names().len(), 2);

    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&bytes, &tables, &mut refs, &skip);
    assert_eq!(reader.read_field(&owner(), &tags).unwrap(), FieldRead::Value(value));
}

// =============================================================================
// References
// =============================================================================

#[test]
fn resource_type_and_member_references_use_tables() {
    let fields = vec![
        (FieldSchema::new("icon", FieldType::Reference), Some(Value::resource("ui/chest.png"))),
        (FieldSchema::new("spawns", FieldType::Reference), Some(Value::type_ref("Goblin"))),
        (
            FieldSchema::new("handler", FieldType::Reference),
            Some(Value::Ref(Reference::Member {
                owner: "Chest".into(),
                member: "on_open".into(),
            })),
        ),
    ];
    let mut refs = Payload::default();
    let (bytes, tables) = write(&fields, &mut refs);
    assert_eq!(bytes[0], ReferenceTag::ExternalResource.byte());
    assert_eq!(tables.resources(), &[ResourcePath::from("ui/chest.png")]);
    assert!(tables.types().contains(&TypeName::from("Goblin")));
    assert!(tables.types().contains(&TypeName::from("Chest")));

    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&bytes, &tables, &mut refs, &skip);
    for (field, value) in &fields {
        let expected = value.clone().unwrap();
        assert_eq!(reader.read_field(&owner(), field).unwrap(), FieldRead::Value(expected));
    }
}

#[test]
fn object_references_are_written_as_guids() {
    let key = ObjectId::new(3, 1);
    let guid = Guid::from_u128(0x5eed);
    let field = FieldSchema::new("key", FieldType::Reference);
    let mut refs = Payload::default().with(key, guid);
    let (bytes, _) = write(&[(field, Some(Value::object(key)))], &mut refs);

    assert_eq!(bytes[0], ReferenceTag::ObjectReference.byte());
    assert_eq!(&bytes[1..17], &guid.to_le_bytes());
}

#[test]
fn references_outside_the_payload_are_dropped() {
    let stranger = ObjectId::new(90, 2);
    let field = FieldSchema::new("key", FieldType::Reference);
    let mut refs = Payload::default();
    let (bytes, tables) = write(&[(field.clone(), Some(Value::object(stranger)))], &mut refs);
    assert_eq!(bytes, vec![ReferenceTag::None.byte()]);

    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&bytes, &tables, &mut refs, &skip);
    assert_eq!(reader.read_field(&owner(), &field).unwrap(), FieldRead::Value(Value::Nil));
}

#[test]
fn foreign_handles_are_rejected_by_default() {
    let field = FieldSchema::new("key", FieldType::Reference);
    let mut raw = vec![ReferenceTag::ForeignOpaque.byte()];
    raw.extend_from_slice(&ObjectId::new(1, 1).to_le_bytes());

    let tables = ReferenceTables::new();
    let mut refs = Payload::default();
    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&raw, &tables, &mut refs, &skip);
    assert_eq!(reader.read_field(&owner(), &field).unwrap(), FieldRead::Value(Value::Nil));
}

// =============================================================================
// Schema drift and corruption
// =============================================================================

#[test]
fn fields_added_after_the_buffer_was_written_are_absent() {
    let gold = FieldSchema::new("gold", FieldType::Int);
    let mut refs = Payload::default();
    let (bytes, tables) = write(&[(gold.clone(), Some(Value::Int(3)))], &mut refs);

    let trapped = FieldSchema::new("trapped", FieldType::Bool);
    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&bytes, &tables, &mut refs, &skip);
    assert_eq!(reader.read_field(&owner(), &gold).unwrap(), FieldRead::Value(Value::Int(3)));
    assert_eq!(reader.read_field(&owner(), &trapped).unwrap(), FieldRead::Absent);
}

#[test]
fn transient_fields_take_no_space() {
    let scratch = FieldSchema::new("scratch", FieldType::Int).transient();
    let gold = FieldSchema::new("gold", FieldType::Int);
    let mut refs = Payload::default();
    let (bytes, tables) = write(
        &[(scratch.clone(), Some(Value::Int(99))), (gold.clone(), Some(Value::Int(1)))],
        &mut refs,
    );
    assert_eq!(bytes.len(), 8);

    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&bytes, &tables, &mut refs, &skip);
    assert_eq!(reader.read_field(&owner(), &scratch).unwrap(), FieldRead::Skipped);
    assert_eq!(reader.read_field(&owner(), &gold).unwrap(), FieldRead::Value(Value::Int(1)));
}

#[test]
fn table_index_out_of_range_is_corrupt() {
    let field = FieldSchema::new("kind", FieldType::Name);
    let raw = 7u32.to_le_bytes();
    let tables = ReferenceTables::new();
    let mut refs = Payload::default();
    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&raw, &tables, &mut refs, &skip);
    assert!(reader.read_field(&owner(), &field).is_err());
}

#[test]
fn unknown_reference_tag_is_corrupt() {
    let field = FieldSchema::new("key", FieldType::Reference);
    let tables = ReferenceTables::new();
    let mut refs = Payload::default();
    let skip = StandardSkip::new();
    let mut reader = ValueReader::new(&[42], &tables, &mut refs, &skip);
    assert!(reader.read_field(&owner(), &field).is_err());
}
