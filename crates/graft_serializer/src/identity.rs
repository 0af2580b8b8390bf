//! GUID ↔ live object correspondence.
//!
//! The map holds generation-checked handles, so an entry for a destroyed
//! object is detectably stale. Stale entries are dropped lazily when they are
//! looked up through [`IdentityMap::resolve`] or swept by
//! [`IdentityMap::prune`].

use std::collections::HashMap;

use graft_foundation::{Guid, GuidGenerator, ObjectId};
use graft_storage::SceneHost;

/// Bidirectional GUID ↔ object map.
///
/// Every GUID maps to exactly one object and every object to exactly one
/// GUID. Inserting a pair evicts whatever either side was paired with before.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityMap {
    by_guid: HashMap<Guid, ObjectId>,
    by_object: HashMap<ObjectId, Guid>,
}

impl IdentityMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `guid` ↔ `object`.
    pub fn insert(&mut self, guid: Guid, object: ObjectId) {
        if let Some(old) = self.by_guid.insert(guid, object) {
            self.by_object.remove(&old);
        }
        if let Some(old) = self.by_object.insert(object, guid) {
            if old != guid {
                self.by_guid.remove(&old);
            }
        }
    }

    /// Returns the object's GUID, assigning a fresh one if it has none.
    pub fn assign(&mut self, object: ObjectId, generator: &mut GuidGenerator) -> Guid {
        if let Some(guid) = self.by_object.get(&object) {
            return *guid;
        }
        let mut guid = generator.next_guid();
        while self.by_guid.contains_key(&guid) {
            guid = generator.next_guid();
        }
        self.insert(guid, object);
        guid
    }

    /// GUID recorded for an object.
    #[must_use]
    pub fn guid_of(&self, object: ObjectId) -> Option<Guid> {
        self.by_object.get(&object).copied()
    }

    /// Object recorded under a GUID, without a liveness check.
    #[must_use]
    pub fn object_of(&self, guid: Guid) -> Option<ObjectId> {
        self.by_guid.get(&guid).copied()
    }

    /// Object recorded under a GUID, dropping the entry if the object is gone.
    pub fn resolve<H: SceneHost + ?Sized>(&mut self, guid: Guid, host: &H) -> Option<ObjectId> {
        let object = self.object_of(guid)?;
        if host.exists(object) {
            Some(object)
        } else {
            self.remove_guid(guid);
            None
        }
    }

    /// Removes an entry by GUID.
    pub fn remove_guid(&mut self, guid: Guid) -> Option<ObjectId> {
        let object = self.by_guid.remove(&guid)?;
        self.by_object.remove(&object);
        Some(object)
    }

    /// Removes an entry by object.
    pub fn remove_object(&mut self, object: ObjectId) -> Option<Guid> {
        let guid = self.by_object.remove(&object)?;
        self.by_guid.remove(&guid);
        Some(guid)
    }

    /// Drops every entry whose object is gone. Returns how many were dropped.
    pub fn prune<H: SceneHost + ?Sized>(&mut self, host: &H) -> usize {
        let dead: Vec<Guid> = self
            .by_guid
            .iter()
            .filter(|(_, object)| !host.exists(**object))
            .map(|(guid, _)| *guid)
            .collect();
        for guid in &dead {
            self.remove_guid(*guid);
        }
        dead.len()
    }

    /// Checks if a GUID is recorded.
    #[must_use]
    pub fn contains_guid(&self, guid: Guid) -> bool {
        self.by_guid.contains_key(&guid)
    }

    /// Checks if an object is recorded.
    #[must_use]
    pub fn contains_object(&self, object: ObjectId) -> bool {
        self.by_object.contains_key(&object)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_guid.len()
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_guid.is_empty()
    }

    /// Iterates over `(guid, object)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Guid, ObjectId)> + '_ {
        self.by_guid.iter().map(|(g, o)| (*g, *o))
    }
}

impl FromIterator<(Guid, ObjectId)> for IdentityMap {
    fn from_iter<I: IntoIterator<Item = (Guid, ObjectId)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (guid, object) in iter {
            map.insert(guid, object);
        }
        map
    }
}
