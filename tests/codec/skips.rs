//! Tests for skip predicates

use graft_codec::{OverrideFilter, SkipContext, SkipPredicate, StandardSkip};
use graft_foundation::{FieldSchema, FieldType, Name, TypeName};

fn ctx<'a>(field: &'a FieldSchema, owner: &'a TypeName, top_level: bool) -> SkipContext<'a> {
    SkipContext {
        field,
        owner,
        top_level,
    }
}

#[test]
fn standard_skip_keeps_ordinary_fields() {
    let owner = TypeName::from("Door");
    let field = FieldSchema::new("locked", FieldType::Bool);
    assert!(!StandardSkip::new().skip(&ctx(&field, &owner, true)));
}

#[test]
fn transient_fields_are_always_skipped() {
    let owner = TypeName::from("Door");
    let field = FieldSchema::new("cache", FieldType::Int).transient();
    assert!(StandardSkip::new().skip(&ctx(&field, &owner, true)));
    assert!(StandardSkip::new().skip(&ctx(&field, &owner, false)));
    assert!(OverrideFilter::new(["cache"]).skip(&ctx(&field, &owner, true)));
}

#[test]
fn exclusions_only_apply_at_top_level() {
    let owner = TypeName::from("Transform");
    let field = FieldSchema::new("position", FieldType::Float);
    let skip = StandardSkip::excluding(["position"]);

    assert!(skip.skip(&ctx(&field, &owner, true)));
    assert!(!skip.skip(&ctx(&field, &owner, false)));
    assert!(skip.excluded().contains(&Name::from("position")));
}

#[test]
fn override_filter_allows_only_listed_top_level_fields() {
    let owner = TypeName::from("Light");
    let color = FieldSchema::new("color", FieldType::String);
    let range = FieldSchema::new("range", FieldType::Float);
    let filter = OverrideFilter::new(["color"]);

    assert!(!filter.skip(&ctx(&color, &owner, true)));
    assert!(filter.skip(&ctx(&range, &owner, true)));
    // members of an allowed record stream in full
    assert!(!filter.skip(&ctx(&range, &owner, false)));
    assert_eq!(filter.allowed().len(), 1);
}

#[test]
fn closures_are_predicates() {
    let owner = TypeName::from("Light");
    let field = FieldSchema::new("range", FieldType::Float);
    let never = |_: &SkipContext<'_>| false;
    let by_owner = |c: &SkipContext<'_>| c.owner.as_str() == "Light";

    assert!(!never.skip(&ctx(&field, &owner, true)));
    assert!(by_owner.skip(&ctx(&field, &owner, true)));
}
