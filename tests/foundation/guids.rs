//! Integration tests for GUIDs and the generator

use graft_foundation::{Guid, GuidGenerator};
use std::collections::HashSet;

#[test]
fn display_is_hyphenated_hex() {
    let guid = Guid::from_u128(0x0123_4567_89ab_cdef_0011_2233_4455_6677);
    assert_eq!(guid.to_string(), "01234567-89ab-cdef-0011-223344556677");
}

#[test]
fn parse_accepts_display_output() {
    let guid = Guid::from_u128(0xfeed_beef);
    let parsed: Guid = guid.to_string().parse().unwrap();
    assert_eq!(parsed, guid);
}

#[test]
fn parse_rejects_short_input() {
    assert!("1234-5678".parse::<Guid>().is_err());
}

#[test]
fn seeded_generators_agree() {
    let mut a = GuidGenerator::seeded(99);
    let mut b = GuidGenerator::seeded(99);
    for _ in 0..16 {
        assert_eq!(a.next_guid(), b.next_guid());
    }
}

#[test]
fn generated_guids_are_distinct_and_not_nil() {
    let mut generator = GuidGenerator::seeded(1);
    let guids: HashSet<Guid> = (0..1000).map(|_| generator.next_guid()).collect();
    assert_eq!(guids.len(), 1000);
    assert!(guids.iter().all(|g| !g.is_nil()));
}

#[test]
fn byte_form_round_trips() {
    let guid = Guid::from_u128(u128::MAX - 17);
    assert_eq!(Guid::from_le_bytes(guid.to_le_bytes()), guid);
}
