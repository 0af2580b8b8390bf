//! Integration tests for errors and diagnostics

use graft_foundation::{Diagnostic, Error, ErrorContext, ErrorKind, Guid, Name, ResourcePath};

#[test]
fn constructors_set_kind() {
    assert!(matches!(Error::invalid_root("gone").kind, ErrorKind::InvalidRoot(_)));
    assert!(matches!(Error::corrupt("short").kind, ErrorKind::CorruptPayload(_)));
    assert!(matches!(Error::unsupported_version(1).kind, ErrorKind::UnsupportedVersion(1)));
}

#[test]
fn display_uses_kind() {
    let err = Error::new(ErrorKind::AssetNotFound(ResourcePath::from("props/crate")));
    assert_eq!(err.to_string(), "asset not found: props/crate");
}

#[test]
fn context_is_attached() {
    let err = Error::corrupt("bad tag").with_context(
        ErrorContext::new()
            .with_asset(ResourcePath::from("level"))
            .with_field(Name::from("target")),
    );
    let context = err.context.unwrap();
    assert_eq!(context.to_string(), "in level field target");
}

#[test]
fn diagnostics_name_object_and_field() {
    let guid = Guid::from_u128(5);
    let diagnostic = Diagnostic::new(ErrorKind::UnresolvedReference(guid))
        .at(Some(guid))
        .on_field(Name::from("target"));
    let text = diagnostic.to_string();
    assert!(text.starts_with("unresolved object reference"));
    assert!(text.contains("field target"));
}

#[test]
fn only_some_kinds_are_actionable() {
    assert!(ErrorKind::MissingExternalResource(ResourcePath::from("x")).is_actionable());
    assert!(!ErrorKind::Internal("x".into()).is_actionable());
}
