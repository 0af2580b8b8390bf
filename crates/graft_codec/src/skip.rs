//! Skip predicates.
//!
//! A skip predicate decides, per field, whether the field is present in the
//! stream at all. Writer and reader must be given equivalent predicates.

use std::collections::BTreeSet;

use graft_foundation::{FieldSchema, Name, TypeName};

/// What a predicate gets to look at.
#[derive(Clone, Copy, Debug)]
pub struct SkipContext<'a> {
    /// The field being considered.
    pub field: &'a FieldSchema,
    /// Type declaring the field: the object's type at top level, the record
    /// type below it.
    pub owner: &'a TypeName,
    /// True for the object's own fields, false inside nested records.
    pub top_level: bool,
}

/// Field selection strategy.
pub trait SkipPredicate {
    /// Returns true if the field is left out of the stream.
    fn skip(&self, ctx: &SkipContext<'_>) -> bool;
}

impl<F> SkipPredicate for F
where
    F: Fn(&SkipContext<'_>) -> bool,
{
    fn skip(&self, ctx: &SkipContext<'_>) -> bool {
        self(ctx)
    }
}

/// Drops runtime-only fields, plus an optional set of top-level names.
///
/// With an empty exclusion set this is the predicate for ordinary objects.
/// The root's positional behavior uses the positional field names as its
/// exclusion set so that a loaded root lands where its new parent puts it.
#[derive(Clone, Debug, Default)]
pub struct StandardSkip {
    excluded: BTreeSet<Name>,
}

impl StandardSkip {
    /// Skips runtime-only fields only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Additionally skips the given top-level field names.
    #[must_use]
    pub fn excluding<N: Into<Name>>(names: impl IntoIterator<Item = N>) -> Self {
        Self {
            excluded: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The excluded top-level names.
    #[must_use]
    pub fn excluded(&self) -> &BTreeSet<Name> {
        &self.excluded
    }
}

impl SkipPredicate for StandardSkip {
    fn skip(&self, ctx: &SkipContext<'_>) -> bool {
        ctx.field.is_runtime_only() || (ctx.top_level && self.excluded.contains(&ctx.field.name))
    }
}

/// Keeps only an allow-list of top-level fields.
///
/// Nested records below an allowed field are streamed in full, minus
/// runtime-only members.
#[derive(Clone, Debug, Default)]
pub struct OverrideFilter {
    allow: BTreeSet<Name>,
}

impl OverrideFilter {
    /// Creates a filter allowing exactly `names` at top level.
    #[must_use]
    pub fn new<N: Into<Name>>(names: impl IntoIterator<Item = N>) -> Self {
        Self {
            allow: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The allowed top-level names.
    #[must_use]
    pub fn allowed(&self) -> &BTreeSet<Name> {
        &self.allow
    }
}

impl SkipPredicate for OverrideFilter {
    fn skip(&self, ctx: &SkipContext<'_>) -> bool {
        ctx.field.is_runtime_only() || (ctx.top_level && !self.allow.contains(&ctx.field.name))
    }
}
