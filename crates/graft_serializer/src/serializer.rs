//! The serializer entry points.

use graft_foundation::{Error, GuidGenerator, ObjectId, Result};
use graft_storage::{ObjectKind, SceneHost};
use tracing::info;

use crate::config::SerializerConfig;
use crate::duplicate::DuplicateSession;
use crate::identity::IdentityMap;
use crate::load::{LoadOptions, LoadOutcome, materialize};
use crate::manifest::{Manifest, NestedLink};
use crate::save::{OutsideRefs, build_manifest, nested_entries};
use crate::versions::{decode_payload, encode_payload};

/// Saves, loads, and duplicates object hierarchies.
#[derive(Clone, Debug, Default)]
pub struct Serializer {
    config: SerializerConfig,
}

impl Serializer {
    /// Creates a serializer.
    #[must_use]
    pub fn new(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Encodes the hierarchy under `root` as a payload.
    ///
    /// Objects that already have a GUID in `identity` keep it. Others get a
    /// fresh one from `generator` and are recorded in `identity`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRoot` if the root is gone or is not an entity, and
    /// `StructuralCycle` if ownership is not a tree. Nothing is written in
    /// either case.
    pub fn serialize<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        root: ObjectId,
        identity: &mut IdentityMap,
        generator: &mut GuidGenerator,
    ) -> Result<Vec<u8>> {
        self.serialize_with_nested(host, root, identity, generator, &[])
    }

    /// Like [`Serializer::serialize`], also recording nested instances
    /// rooted inside the hierarchy.
    ///
    /// # Errors
    ///
    /// See [`Serializer::serialize`].
    pub fn serialize_with_nested<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        root: ObjectId,
        identity: &mut IdentityMap,
        generator: &mut GuidGenerator,
        nested: &[NestedLink],
    ) -> Result<Vec<u8>> {
        let manifest = self.manifest(host, root, identity, generator, nested)?;
        let payload = encode_payload(&manifest, &self.config.engine_stamp)?;
        info!(
            root = %root,
            objects = manifest.len(),
            nested = manifest.nested.len(),
            bytes = payload.len(),
            "serialized"
        );
        Ok(payload)
    }

    /// Encodes the hierarchy under `root` without producing bytes.
    ///
    /// # Errors
    ///
    /// See [`Serializer::serialize`].
    pub fn manifest<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        root: ObjectId,
        identity: &mut IdentityMap,
        generator: &mut GuidGenerator,
        nested: &[NestedLink],
    ) -> Result<Manifest> {
        if host.exists(root) && host.kind(root) != Some(ObjectKind::Entity) {
            return Err(Error::invalid_root(format!("{root} is not an entity")));
        }
        let (mut manifest, order) =
            build_manifest(host, root, identity, generator, &self.config, OutsideRefs::Drop)?;
        manifest.nested = nested_entries(nested, identity, &order);
        Ok(manifest)
    }

    /// Decodes a payload of any supported version and materializes it.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` for an unknown version (nothing is
    /// created), `InvalidRoot` if the root cannot be created, or a corrupt
    /// payload error for malformed containers. Per-field problems are
    /// reported in [`LoadOutcome::diagnostics`].
    pub fn deserialize<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        payload: &[u8],
        options: &LoadOptions,
    ) -> Result<LoadOutcome> {
        let manifest = decode_payload(payload)?;
        self.load_manifest(host, &manifest, options)
    }

    /// Materializes an already decoded manifest.
    ///
    /// # Errors
    ///
    /// See [`Serializer::deserialize`].
    pub fn load_manifest<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        manifest: &Manifest,
        options: &LoadOptions,
    ) -> Result<LoadOutcome> {
        materialize(host, manifest, options, &self.config, false)
    }

    /// Prepares `root` for repeated duplication within the same host.
    ///
    /// References to objects outside the subtree are kept as-is in every
    /// copy. `root` may be an entity or a behavior.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRoot` if the root is gone and `StructuralCycle` if
    /// ownership is not a tree.
    pub fn prepare<H: SceneHost + ?Sized>(&self, host: &H, root: ObjectId) -> Result<DuplicateSession> {
        let mut identity = IdentityMap::new();
        let mut generator = GuidGenerator::default();
        let (manifest, _) = build_manifest(
            host,
            root,
            &mut identity,
            &mut generator,
            &self.config,
            OutsideRefs::Foreign,
        )?;
        Ok(DuplicateSession::new(root, manifest, identity, self.config.clone(), true))
    }

    /// Prepares `root` for duplication into a different host.
    ///
    /// Objects keep the GUIDs recorded in `identity`. References to objects
    /// outside the subtree are written by GUID when `identity` knows them and
    /// dropped otherwise; pass [`LoadOptions::external`] to resolve them on
    /// the other side.
    ///
    /// # Errors
    ///
    /// See [`Serializer::prepare`].
    pub fn prepare_portable<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        root: ObjectId,
        identity: &IdentityMap,
    ) -> Result<DuplicateSession> {
        let mut identity = identity.clone();
        let mut generator = GuidGenerator::default();
        let (manifest, _) = build_manifest(
            host,
            root,
            &mut identity,
            &mut generator,
            &self.config,
            OutsideRefs::Known,
        )?;
        Ok(DuplicateSession::new(root, manifest, identity, self.config.clone(), false))
    }

    /// Copies the hierarchy under `root` to `parent`.
    ///
    /// # Errors
    ///
    /// See [`Serializer::prepare`] and [`DuplicateSession::instantiate`].
    pub fn duplicate<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        root: ObjectId,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        let mut session = self.prepare(&*host, root)?;
        let outcome = session.instantiate(host, &LoadOptions::new().with_parent(parent))?;
        Ok(outcome.root)
    }
}
