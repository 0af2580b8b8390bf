//! Object slots with generational indices.
//!
//! The `ObjectArena` owns the data of every live object and tracks
//! generations so that handles to destroyed objects are detectably stale.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use graft_foundation::{Error, ObjectId, Result};

/// Generational slot storage.
///
/// Slots are reused from a free list when available. Even generations are
/// free, odd generations are alive.
#[derive(Debug, Clone)]
pub struct ObjectArena<T> {
    generations: Vec<u32>,
    slots: Vec<Option<T>>,
    free_list: Vec<u64>,
    live_count: usize,
}

impl<T> Default for ObjectArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObjectArena<T> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            slots: Vec::new(),
            free_list: Vec::new(),
            live_count: 0,
        }
    }

    /// Stores a value and returns its handle.
    pub fn insert(&mut self, value: T) -> ObjectId {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            // was even/free, now odd/alive
            self.generations[idx] += 1;
            self.slots[idx] = Some(value);
            ObjectId::new(index, self.generations[idx])
        } else {
            let index = self.generations.len() as u64;
            self.generations.push(1);
            self.slots.push(Some(value));
            ObjectId::new(index, 1)
        }
    }

    /// Removes a value, freeing its slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never issued.
    pub fn remove(&mut self, id: ObjectId) -> Result<T> {
        self.validate(id)?;

        let idx = id.index as usize;
        self.generations[idx] += 1;
        self.free_list.push(id.index);
        self.live_count -= 1;
        self.slots[idx]
            .take()
            .ok_or_else(|| Error::object_not_found(id))
    }

    /// Checks if a handle refers to a live object.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        let idx = id.index as usize;
        idx < self.generations.len()
            && self.generations[idx] == id.generation
            && id.generation % 2 == 1
    }

    /// Validates that a handle is live.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never issued.
    pub fn validate(&self, id: ObjectId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(Error::object_not_found(id))
        }
    }

    /// Borrows a live object's data.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&T> {
        if self.contains(id) {
            self.slots[id.index as usize].as_ref()
        } else {
            None
        }
    }

    /// Mutably borrows a live object's data.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        if self.contains(id) {
            self.slots[id.index as usize].as_mut()
        } else {
            None
        }
    }

    /// Returns the number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over all live handles in slot order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.generations
            .iter()
            .enumerate()
            .filter(|(_, generation)| *generation % 2 == 1)
            .map(|(idx, generation)| ObjectId::new(idx as u64, *generation))
    }
}
