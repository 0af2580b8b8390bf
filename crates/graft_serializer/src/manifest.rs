//! Version-independent view of a payload.
//!
//! Every version handler decodes its frozen container into a [`Manifest`].
//! Loading works only from the manifest, so shared load logic never needs
//! to know which version it is looking at.

use graft_foundation::{Guid, Name, ObjectId, ReferenceTables, ResourcePath, TypeName};
use graft_storage::ObjectKind;

/// One object of a payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestObject {
    /// Stable identity.
    pub guid: Guid,
    /// Entity or behavior.
    pub kind: ObjectKind,
    /// Type to instantiate.
    pub type_name: TypeName,
    /// Index of the owning object. `None` only for the root.
    pub owner: Option<usize>,
    /// Display label.
    pub label: Option<String>,
    /// Encoded fields.
    pub buffer: Vec<u8>,
}

/// A nested instance as stored: everything keyed by GUID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestedEntry {
    /// Asset embedded at `root`.
    pub asset: ResourcePath,
    /// GUID of the embedding entity in this payload.
    pub root: Guid,
    /// `(payload GUID, asset GUID)` for every object of the instance.
    pub members: Vec<(Guid, Guid)>,
    /// `(payload GUID, overridden field names)`.
    pub overrides: Vec<(Guid, Vec<Name>)>,
    /// Asset fingerprint at last sync.
    pub fingerprint: Option<String>,
    /// Reconcile automatically when the asset changes.
    pub auto_update: bool,
}

/// A nested instance as seen live: everything keyed by object handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestedLink {
    /// Asset embedded at `root`.
    pub asset: ResourcePath,
    /// The embedding entity.
    pub root: ObjectId,
    /// `(live object, asset GUID)` for every object of the instance.
    pub members: Vec<(ObjectId, Guid)>,
    /// `(live object, overridden field names)`.
    pub overrides: Vec<(ObjectId, Vec<Name>)>,
    /// Asset fingerprint at last sync.
    pub fingerprint: Option<String>,
    /// Reconcile automatically when the asset changes.
    pub auto_update: bool,
}

/// A decoded payload.
#[derive(Clone, Debug)]
pub struct Manifest {
    /// Version the payload was written with.
    pub version: u16,
    /// Engine stamp from the header.
    pub stamp: String,
    /// Reference tables the buffers index into.
    pub tables: ReferenceTables,
    /// Top-level fields left out of the root's positional objects.
    pub root_exclusions: Vec<Name>,
    /// Objects in creation order. The root is first.
    pub objects: Vec<ManifestObject>,
    /// Nested instances embedded in this payload.
    pub nested: Vec<NestedEntry>,
}

impl Manifest {
    /// The root object.
    #[must_use]
    pub fn root(&self) -> Option<&ManifestObject> {
        self.objects.first()
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the payload holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// GUIDs in creation order.
    pub fn guids(&self) -> impl Iterator<Item = Guid> + '_ {
        self.objects.iter().map(|o| o.guid)
    }
}
