//! Override sets: which fields of which objects the owner has changed.

use std::collections::{BTreeMap, BTreeSet};

use graft_foundation::{Name, ObjectId};

/// Object → overridden field names.
///
/// An object is present only while at least one of its fields is
/// overridden.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverrideSet {
    entries: BTreeMap<ObjectId, BTreeSet<Name>>,
}

impl OverrideSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `field` of `object` as overridden.
    ///
    /// Returns false if it already was.
    pub fn record(&mut self, object: ObjectId, field: Name) -> bool {
        self.entries.entry(object).or_default().insert(field)
    }

    /// Unmarks `field` of `object`.
    ///
    /// Returns false if it was not marked.
    pub fn clear(&mut self, object: ObjectId, field: &Name) -> bool {
        let Some(fields) = self.entries.get_mut(&object) else {
            return false;
        };
        let removed = fields.remove(field);
        if fields.is_empty() {
            self.entries.remove(&object);
        }
        removed
    }

    /// Drops every override of `object`.
    pub fn clear_object(&mut self, object: ObjectId) -> Option<BTreeSet<Name>> {
        self.entries.remove(&object)
    }

    /// Returns true if `field` of `object` is overridden.
    #[must_use]
    pub fn contains(&self, object: ObjectId, field: &str) -> bool {
        self.fields(object)
            .is_some_and(|fields| fields.iter().any(|f| f.as_str() == field))
    }

    /// The overridden fields of `object`.
    #[must_use]
    pub fn fields(&self, object: ObjectId) -> Option<&BTreeSet<Name>> {
        self.entries.get(&object)
    }

    /// Every entry.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &BTreeSet<Name>)> {
        self.entries.iter().map(|(o, f)| (*o, f))
    }

    /// Number of objects with overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of overridden fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Keeps only the (object, field) pairs for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(ObjectId, &Name) -> bool) {
        for (object, fields) in &mut self.entries {
            fields.retain(|f| keep(*object, f));
        }
        self.entries.retain(|_, fields| !fields.is_empty());
    }
}

impl FromIterator<(ObjectId, Name)> for OverrideSet {
    fn from_iter<T: IntoIterator<Item = (ObjectId, Name)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (object, field) in iter {
            set.record(object, field);
        }
        set
    }
}
