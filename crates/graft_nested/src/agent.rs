//! Working copies of assets.
//!
//! Reading and writing an asset's field values goes through an agent: the
//! asset loaded into a scratch scene that shares the live scene's types and
//! resources. Agents are cached per asset and rebuilt whenever the library
//! holds a newer revision.

use chrono::{DateTime, Utc};
use graft_foundation::{GuidGenerator, ObjectId, Result};
use graft_serializer::{IdentityMap, LoadOptions, NestedLink, Serializer};
use graft_storage::Scene;
use tracing::debug;

use crate::library::Asset;

#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub scene: Scene,
    pub root: ObjectId,
    /// Asset GUID ↔ agent object.
    pub identity: IdentityMap,
    /// Instances the asset itself embeds.
    pub nested: Vec<NestedLink>,
    /// Revision this agent reflects.
    pub created: DateTime<Utc>,
}

impl Agent {
    pub(crate) fn load(template: &Scene, asset: &Asset, serializer: &Serializer) -> Result<Self> {
        let mut scene = template.scratch();
        let outcome = serializer.deserialize(&mut scene, &asset.payload, &LoadOptions::new())?;
        debug!(asset = %asset.path, objects = outcome.identity.len(), "loaded agent");
        Ok(Self {
            scene,
            root: outcome.root,
            identity: outcome.identity,
            nested: outcome.nested,
            created: asset.created,
        })
    }

    /// Encodes the agent back into a payload, keeping every asset GUID.
    pub(crate) fn encode(&mut self, serializer: &Serializer, generator: &mut GuidGenerator) -> Result<Vec<u8>> {
        serializer.serialize_with_nested(&self.scene, self.root, &mut self.identity, generator, &self.nested)
    }
}
