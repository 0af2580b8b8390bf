//! Nested-instance records.

use std::collections::BTreeMap;

use graft_foundation::{Guid, ObjectId, ResourcePath};
use graft_serializer::{IdentityMap, NestedLink};

use crate::overrides::OverrideSet;

/// A live instance of an asset embedded in a scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestedInstanceRecord {
    /// The embedded asset.
    pub asset: ResourcePath,
    /// The embedding entity: the instance's copy of the asset root.
    pub root: ObjectId,
    /// Live object → the asset object it was instantiated from.
    pub sub_map: BTreeMap<ObjectId, Guid>,
    /// Fields the owner has changed.
    pub overrides: OverrideSet,
    /// Asset fingerprint when the instance was last synchronized.
    pub fingerprint: String,
    /// Reconcile during [`crate::OverrideEngine::refresh`] with `auto_only`.
    pub auto_update: bool,
}

impl NestedInstanceRecord {
    /// Creates a record with no overrides.
    #[must_use]
    pub fn new(asset: ResourcePath, root: ObjectId, fingerprint: String) -> Self {
        Self {
            asset,
            root,
            sub_map: BTreeMap::new(),
            overrides: OverrideSet::new(),
            fingerprint,
            auto_update: true,
        }
    }

    /// Builds the sub-map from a load's identity map.
    #[must_use]
    pub fn with_members(mut self, identity: &IdentityMap) -> Self {
        self.sub_map = identity.iter().map(|(g, o)| (o, g)).collect();
        self
    }

    /// Returns true if `object` belongs to this instance.
    #[must_use]
    pub fn contains(&self, object: ObjectId) -> bool {
        self.sub_map.contains_key(&object)
    }

    /// The asset object `object` was instantiated from.
    #[must_use]
    pub fn asset_guid(&self, object: ObjectId) -> Option<Guid> {
        self.sub_map.get(&object).copied()
    }

    /// The live counterpart of an asset object.
    #[must_use]
    pub fn live_object(&self, guid: Guid) -> Option<ObjectId> {
        self.sub_map.iter().find(|(_, g)| **g == guid).map(|(o, _)| *o)
    }

    /// Asset GUID ↔ live object, as an identity map.
    #[must_use]
    pub fn asset_identity(&self) -> IdentityMap {
        self.sub_map.iter().map(|(o, g)| (*g, *o)).collect()
    }

    /// The record as the serializer stores it.
    #[must_use]
    pub fn to_link(&self) -> NestedLink {
        NestedLink {
            asset: self.asset.clone(),
            root: self.root,
            members: self.sub_map.iter().map(|(o, g)| (*o, *g)).collect(),
            overrides: self
                .overrides
                .iter()
                .map(|(o, fields)| (o, fields.iter().cloned().collect()))
                .collect(),
            fingerprint: Some(self.fingerprint.clone()),
            auto_update: self.auto_update,
        }
    }

    /// Rebuilds a record from a loaded link.
    ///
    /// A link without a fingerprint gets an empty one, so the first
    /// staleness check reconciles it.
    #[must_use]
    pub fn from_link(link: &NestedLink) -> Self {
        Self {
            asset: link.asset.clone(),
            root: link.root,
            sub_map: link.members.iter().copied().collect(),
            overrides: link
                .overrides
                .iter()
                .flat_map(|(o, fields)| fields.iter().map(move |f| (*o, f.clone())))
                .collect(),
            fingerprint: link.fingerprint.clone().unwrap_or_default(),
            auto_update: link.auto_update,
        }
    }
}
