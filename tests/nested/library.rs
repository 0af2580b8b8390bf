//! Tests for the asset library and fingerprints

use graft_foundation::{ErrorKind, ResourcePath};
use graft_nested::{AssetLibrary, fingerprint};

use crate::common::{Author, LANTERN, engine};

fn lantern_payload() -> Vec<u8> {
    let mut author = Author::lantern();
    let engine = engine(&mut author);
    engine.library().require(&ResourcePath::from(LANTERN)).unwrap().payload.clone()
}

#[test]
fn revisions_get_strictly_increasing_timestamps() {
    let payload = lantern_payload();
    let mut library = AssetLibrary::new();
    let mut last = library.store("a", payload.clone()).unwrap();
    for _ in 0..20 {
        let next = library.store("a", payload.clone()).unwrap();
        assert!(next > last);
        last = next;
    }
    assert_eq!(library.len(), 1);
    assert_eq!(library.created_at(&ResourcePath::from("a")), Some(last));
}

#[test]
fn storing_garbage_is_refused() {
    let mut library = AssetLibrary::new();
    assert!(library.store("bad", b"not a payload".to_vec()).is_err());
    assert!(library.is_empty());
}

#[test]
fn fingerprints_are_sha256_hex() {
    let mut library = AssetLibrary::new();
    library.store("a", lantern_payload()).unwrap();
    let digest = fingerprint(&library, &ResourcePath::from("a")).unwrap();
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn missing_asset_has_no_fingerprint() {
    let library = AssetLibrary::new();
    let err = fingerprint(&library, &ResourcePath::from("nowhere")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::AssetNotFound(ResourcePath::from("nowhere")));
}

#[test]
fn paths_are_listed_in_order() {
    let payload = lantern_payload();
    let mut library = AssetLibrary::new();
    library.store("b", payload.clone()).unwrap();
    library.store("a", payload).unwrap();
    let paths: Vec<&str> = library.paths().map(ResourcePath::as_str).collect();
    assert_eq!(paths, vec!["a", "b"]);

    assert!(library.remove(&ResourcePath::from("a")).is_some());
    assert!(!library.contains(&ResourcePath::from("a")));
}
