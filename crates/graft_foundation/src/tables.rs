//! Per-session reference tables.
//!
//! External resources, type descriptors, and names are written to the wire
//! as small integer indices into these tables. Tables are append-only for
//! the life of one serialization session and are never shared between
//! sessions.

use std::collections::HashMap;
use std::hash::Hash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::name::{Name, ResourcePath, TypeName};

/// One append-only interned list.
#[derive(Clone, Debug)]
struct InternTable<T> {
    entries: Vec<T>,
    index: HashMap<T, u32>,
}

impl<T> Default for InternTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> InternTable<T> {
    fn from_entries(entries: Vec<T>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            // First occurrence wins so that lookups agree with find_or_add.
            index
                .entry(entry.clone())
                .or_insert(u32::try_from(i).unwrap_or(u32::MAX));
        }
        Self { entries, index }
    }

    fn find_or_add(&mut self, value: &T) -> Result<u32> {
        if let Some(&idx) = self.index.get(value) {
            return Ok(idx);
        }
        let idx = u32::try_from(self.entries.len())
            .map_err(|_| Error::new(ErrorKind::Internal("reference table overflow".into())))?;
        self.entries.push(value.clone());
        self.index.insert(value.clone(), idx);
        Ok(idx)
    }

    fn find(&self, value: &T) -> Option<u32> {
        self.index.get(value).copied()
    }

    fn get(&self, idx: u32) -> Option<&T> {
        self.entries.get(idx as usize)
    }

    fn replace(&mut self, from: &T, to: &T) -> bool {
        let mut changed = false;
        for entry in &mut self.entries {
            if entry == from {
                *entry = to.clone();
                changed = true;
            }
        }
        if changed {
            *self = Self::from_entries(std::mem::take(&mut self.entries));
        }
        changed
    }
}

/// The three interned lists of one serialization session.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "TablesRepr", into = "TablesRepr"))]
pub struct ReferenceTables {
    resources: InternTable<ResourcePath>,
    types: InternTable<TypeName>,
    names: InternTable<Name>,
}

impl ReferenceTables {
    /// Creates empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds tables from their stored entry lists.
    #[must_use]
    pub fn from_parts(resources: Vec<ResourcePath>, types: Vec<TypeName>, names: Vec<Name>) -> Self {
        Self {
            resources: InternTable::from_entries(resources),
            types: InternTable::from_entries(types),
            names: InternTable::from_entries(names),
        }
    }

    /// Interns a resource path.
    ///
    /// # Errors
    ///
    /// Returns an error if the table already holds `u32::MAX` entries.
    pub fn find_or_add_resource(&mut self, path: &ResourcePath) -> Result<u32> {
        self.resources.find_or_add(path)
    }

    /// Interns a type descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the table already holds `u32::MAX` entries.
    pub fn find_or_add_type(&mut self, name: &TypeName) -> Result<u32> {
        self.types.find_or_add(name)
    }

    /// Interns a name.
    ///
    /// # Errors
    ///
    /// Returns an error if the table already holds `u32::MAX` entries.
    pub fn find_or_add_name(&mut self, name: &Name) -> Result<u32> {
        self.names.find_or_add(name)
    }

    /// Looks up a resource index without interning.
    #[must_use]
    pub fn find_resource(&self, path: &ResourcePath) -> Option<u32> {
        self.resources.find(path)
    }

    /// Resolves a resource index.
    #[must_use]
    pub fn resource(&self, idx: u32) -> Option<&ResourcePath> {
        self.resources.get(idx)
    }

    /// Resolves a type index.
    #[must_use]
    pub fn type_name(&self, idx: u32) -> Option<&TypeName> {
        self.types.get(idx)
    }

    /// Resolves a name index.
    #[must_use]
    pub fn name(&self, idx: u32) -> Option<&Name> {
        self.names.get(idx)
    }

    /// All interned resources, in index order.
    #[must_use]
    pub fn resources(&self) -> &[ResourcePath] {
        &self.resources.entries
    }

    /// All interned types, in index order.
    #[must_use]
    pub fn types(&self) -> &[TypeName] {
        &self.types.entries
    }

    /// All interned names, in index order.
    #[must_use]
    pub fn names(&self) -> &[Name] {
        &self.names.entries
    }

    /// Swaps every occurrence of a resource for another, keeping indices.
    ///
    /// Returns true if anything was replaced.
    pub fn replace_resource(&mut self, from: &ResourcePath, to: &ResourcePath) -> bool {
        self.resources.replace(from, to)
    }

    /// Swaps every occurrence of a type for another, keeping indices.
    ///
    /// Returns true if anything was replaced.
    pub fn replace_type(&mut self, from: &TypeName, to: &TypeName) -> bool {
        self.types.replace(from, to)
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct TablesRepr {
    resources: Vec<ResourcePath>,
    types: Vec<TypeName>,
    names: Vec<Name>,
}

#[cfg(feature = "serde")]
impl From<TablesRepr> for ReferenceTables {
    fn from(repr: TablesRepr) -> Self {
        Self::from_parts(repr.resources, repr.types, repr.names)
    }
}

#[cfg(feature = "serde")]
impl From<ReferenceTables> for TablesRepr {
    fn from(tables: ReferenceTables) -> Self {
        Self {
            resources: tables.resources.entries,
            types: tables.types.entries,
            names: tables.names.entries,
        }
    }
}
