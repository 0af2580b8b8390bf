//! Tests for byte primitives and reference tags

use graft_codec::{ByteReader, ByteWriter, ReferenceTag};
use graft_foundation::{ErrorKind, Guid, ObjectId};

// =============================================================================
// Bytes
// =============================================================================

#[test]
fn primitives_read_back_in_order() {
    let guid: Guid = "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0".parse().unwrap();
    let handle = ObjectId::new(12, 4);

    let mut w = ByteWriter::new();
    w.write_u8(7);
    w.write_bool(true);
    w.write_u16(0xbeef);
    w.write_u32(70_000);
    w.write_i64(-42);
    w.write_f64(2.5);
    w.write_str("lantern").unwrap();
    w.write_guid(guid);
    w.write_object_id(handle);
    let bytes = w.into_inner();

    let mut r = ByteReader::new(&bytes);
    assert_eq!(r.read_u8().unwrap(), 7);
    assert!(r.read_bool().unwrap());
    assert_eq!(r.read_u16().unwrap(), 0xbeef);
    assert_eq!(r.read_u32().unwrap(), 70_000);
    assert_eq!(r.read_i64().unwrap(), -42);
    assert_eq!(r.read_f64().unwrap(), 2.5);
    assert_eq!(r.read_str().unwrap(), "lantern");
    assert_eq!(r.read_guid().unwrap(), guid);
    assert_eq!(r.read_object_id().unwrap(), handle);
    assert!(r.is_at_end());
    assert_eq!(r.position(), bytes.len());
}

#[test]
fn integers_are_little_endian() {
    let mut w = ByteWriter::new();
    w.write_u32(0x0102_0304);
    assert_eq!(w.into_inner(), vec![4, 3, 2, 1]);
}

#[test]
fn strings_are_length_prefixed() {
    let mut w = ByteWriter::new();
    w.write_str("ab").unwrap();
    assert_eq!(w.into_inner(), vec![2, 0, 0, 0, b'a', b'b']);
}

#[test]
fn reading_past_the_end_is_corrupt() {
    let mut r = ByteReader::new(&[1, 2]);
    let err = r.read_u32().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CorruptPayload(_)));
}

#[test]
fn bool_rejects_other_bytes() {
    let mut r = ByteReader::new(&[2]);
    assert!(r.read_bool().is_err());
}

// =============================================================================
// Tags
// =============================================================================

#[test]
fn tag_bytes_are_fixed() {
    assert_eq!(ReferenceTag::None.byte(), 0);
    assert_eq!(ReferenceTag::ExternalResource.byte(), 1);
    assert_eq!(ReferenceTag::TypeDescriptor.byte(), 2);
    assert_eq!(ReferenceTag::ObjectReference.byte(), 3);
    assert_eq!(ReferenceTag::NamedMember.byte(), 4);
    assert_eq!(ReferenceTag::ForeignOpaque.byte(), 5);
}

#[test]
fn every_tag_decodes_from_its_byte() {
    for tag in ReferenceTag::ALL {
        assert_eq!(ReferenceTag::from_byte(tag.byte()).unwrap(), tag);
    }
}

#[test]
fn unknown_tag_is_corrupt() {
    let err = ReferenceTag::from_byte(9).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CorruptPayload(_)));
}
