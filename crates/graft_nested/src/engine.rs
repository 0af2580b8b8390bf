//! The override engine: nested-instance bookkeeping for one scene.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use graft_foundation::{Error, ErrorKind, GuidGenerator, ObjectId, ResourcePath, Result};
use graft_serializer::{IdentityMap, LoadOptions, NestedLink, Serializer, decode_payload, discover};
use graft_storage::{Scene, SceneHost};
use tracing::{info, warn};

use crate::agent::Agent;
use crate::fingerprint::fingerprint;
use crate::library::AssetLibrary;
use crate::record::NestedInstanceRecord;
use crate::session::{OverrideSession, ReconcileReport};

/// Tracks the nested instances of a scene and the assets they come from.
#[derive(Debug)]
pub struct OverrideEngine {
    pub(crate) library: AssetLibrary,
    pub(crate) serializer: Serializer,
    pub(crate) records: BTreeMap<ObjectId, NestedInstanceRecord>,
    pub(crate) agents: HashMap<ResourcePath, Agent>,
    pub(crate) generator: GuidGenerator,
}

impl OverrideEngine {
    /// Creates an engine over a library.
    #[must_use]
    pub fn new(library: AssetLibrary) -> Self {
        Self {
            library,
            serializer: Serializer::default(),
            records: BTreeMap::new(),
            agents: HashMap::new(),
            generator: GuidGenerator::default(),
        }
    }

    /// Uses `serializer` for every load and save.
    #[must_use]
    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    /// Uses `generator` for GUIDs of objects added to assets.
    #[must_use]
    pub fn with_generator(mut self, generator: GuidGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// The asset library.
    #[must_use]
    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    /// The asset library, for storing assets directly.
    pub fn library_mut(&mut self) -> &mut AssetLibrary {
        &mut self.library
    }

    /// The serializer in use.
    #[must_use]
    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    /// Every record, by root.
    pub fn records(&self) -> impl Iterator<Item = &NestedInstanceRecord> {
        self.records.values()
    }

    /// The record rooted at `root`.
    #[must_use]
    pub fn record(&self, root: ObjectId) -> Option<&NestedInstanceRecord> {
        self.records.get(&root)
    }

    /// Root of the innermost instance containing `object`.
    #[must_use]
    pub fn instance_of(&self, object: ObjectId) -> Option<ObjectId> {
        if self.records.contains_key(&object) {
            return Some(object);
        }
        self.records
            .values()
            .filter(|r| r.contains(object))
            .min_by_key(|r| r.sub_map.len())
            .map(|r| r.root)
    }

    /// Turns automatic reconciliation on or off for one instance.
    ///
    /// # Errors
    ///
    /// Returns `NotNested` if `root` is not an instance root.
    pub fn set_auto_update(&mut self, root: ObjectId, enabled: bool) -> Result<()> {
        let record = self
            .records
            .get_mut(&root)
            .ok_or_else(|| Error::new(ErrorKind::NotNested(root)))?;
        record.auto_update = enabled;
        Ok(())
    }

    /// Instantiates `asset` into `scene`.
    ///
    /// `context` is the asset being edited, if any; embedding an asset that
    /// already contains it is refused. Instances the asset itself embeds are
    /// registered too.
    ///
    /// # Errors
    ///
    /// Returns `NestedCycle`, `AssetNotFound`, or any load error.
    pub fn embed(
        &mut self,
        scene: &mut Scene,
        asset: &ResourcePath,
        options: &LoadOptions,
        context: Option<&ResourcePath>,
    ) -> Result<ObjectId> {
        if let Some(owner) = context {
            if self.library.embeds_transitively(asset, owner) {
                return Err(Error::new(ErrorKind::NestedCycle(asset.clone())));
            }
        }
        let stored = self.library.require(asset)?;
        let manifest = decode_payload(&stored.payload)?;
        let fingerprint = fingerprint(&self.library, asset)?;
        let outcome = self.serializer.load_manifest(scene, &manifest, options)?;

        for link in &outcome.nested {
            self.records
                .insert(link.root, NestedInstanceRecord::from_link(link));
        }
        let record =
            NestedInstanceRecord::new(asset.clone(), outcome.root, fingerprint).with_members(&outcome.identity);
        info!(asset = %asset, root = %outcome.root, objects = record.sub_map.len(), "embedded asset");
        self.records.insert(outcome.root, record);
        Ok(outcome.root)
    }

    /// Saves the hierarchy under `root` as the asset `path`, together with
    /// the instances nested inside it.
    ///
    /// # Errors
    ///
    /// Returns `NestedCycle` if an instance under `root` already contains
    /// `path`, or any save error.
    pub fn save_asset(
        &mut self,
        scene: &Scene,
        root: ObjectId,
        path: &ResourcePath,
        identity: &mut IdentityMap,
    ) -> Result<DateTime<Utc>> {
        let links = self.links_under(scene, root)?;
        if let Some(cycle) = links
            .iter()
            .find(|l| self.library.embeds_transitively(&l.asset, path))
        {
            warn!(asset = %path, nested = %cycle.asset, "refusing to save a nesting cycle");
            return Err(Error::new(ErrorKind::NestedCycle(cycle.asset.clone())));
        }
        let payload = self
            .serializer
            .serialize_with_nested(scene, root, identity, &mut self.generator, &links)?;
        self.library.store(path.clone(), payload)
    }

    /// Links for every instance rooted in the hierarchy under `root`.
    ///
    /// # Errors
    ///
    /// Returns `StructuralCycle` if the hierarchy is not a tree.
    pub fn links_under(&self, scene: &Scene, root: ObjectId) -> Result<Vec<NestedLink>> {
        let walked = discover(scene, root)?;
        Ok(walked
            .iter()
            .filter_map(|o| self.records.get(o))
            .map(NestedInstanceRecord::to_link)
            .collect())
    }

    /// Registers instances recorded in a loaded payload.
    pub fn adopt(&mut self, links: &[NestedLink]) {
        for link in links {
            self.records.insert(link.root, NestedInstanceRecord::from_link(link));
        }
    }

    /// Opens an override session on the instance containing `object`.
    ///
    /// # Errors
    ///
    /// Returns `NotNested` if `object` is not part of any instance.
    pub fn begin_session<'a>(&'a mut self, scene: &'a mut Scene, object: ObjectId) -> Result<OverrideSession<'a>> {
        let root = self
            .instance_of(object)
            .ok_or_else(|| Error::new(ErrorKind::NotNested(object)))?;
        Ok(OverrideSession::new(self, scene, root))
    }

    /// Dissolves an instance, leaving its objects in place as a plain
    /// subtree.
    ///
    /// # Errors
    ///
    /// Returns `NotNested` if `root` is not an instance root.
    pub fn unpack(&mut self, root: ObjectId) -> Result<NestedInstanceRecord> {
        let record = self
            .records
            .remove(&root)
            .ok_or_else(|| Error::new(ErrorKind::NotNested(root)))?;
        info!(asset = %record.asset, root = %root, "unpacked instance");
        Ok(record)
    }

    /// Deletes an instance and its objects.
    ///
    /// # Errors
    ///
    /// Returns `NotNested` if `root` is not an instance root.
    pub fn remove(&mut self, scene: &mut Scene, root: ObjectId) -> Result<()> {
        if !self.records.contains_key(&root) {
            return Err(Error::new(ErrorKind::NotNested(root)));
        }
        if scene.exists(root) {
            scene.destroy(root)?;
        }
        self.records.remove(&root);
        self.prune(scene);
        Ok(())
    }

    /// Drops records whose root is gone and forgets dead members.
    ///
    /// Returns the number of records dropped.
    pub fn prune(&mut self, scene: &Scene) -> usize {
        let before = self.records.len();
        self.records.retain(|root, _| scene.exists(*root));
        for record in self.records.values_mut() {
            let dead: Vec<ObjectId> = record.sub_map.keys().copied().filter(|o| !scene.exists(*o)).collect();
            for object in dead {
                record.sub_map.remove(&object);
                record.overrides.clear_object(object);
            }
        }
        before - self.records.len()
    }

    /// Roots of instances whose asset changed since their last sync.
    #[must_use]
    pub fn stale_instances(&self) -> Vec<ObjectId> {
        self.records.keys().copied().filter(|root| self.is_stale(*root)).collect()
    }

    /// Returns true if the instance rooted at `root` is behind its asset.
    #[must_use]
    pub fn is_stale(&self, root: ObjectId) -> bool {
        let Some(record) = self.records.get(&root) else {
            return false;
        };
        match fingerprint(&self.library, &record.asset) {
            Ok(current) => current != record.fingerprint,
            Err(e) => {
                warn!(asset = %record.asset, error = %e, "cannot fingerprint asset");
                false
            }
        }
    }

    /// Reconciles stale instances.
    ///
    /// With `auto_only`, instances with auto-update turned off are left
    /// alone.
    ///
    /// # Errors
    ///
    /// Stops at the first instance that fails to reconcile.
    pub fn refresh(&mut self, scene: &mut Scene, auto_only: bool) -> Result<Vec<ReconcileReport>> {
        let mut reports = Vec::new();
        for root in self.stale_instances() {
            let auto = self.records.get(&root).is_some_and(|r| r.auto_update);
            if auto_only && !auto {
                continue;
            }
            // An outer reconcile may already have brought it up to date.
            if !scene.exists(root) || !self.is_stale(root) {
                continue;
            }
            reports.push(self.begin_session(scene, root)?.reconcile()?);
        }
        Ok(reports)
    }

    /// The agent for `asset`, rebuilt if the library has moved on.
    pub(crate) fn take_agent(&mut self, template: &Scene, asset: &ResourcePath) -> Result<Agent> {
        let current = self.library.require(asset)?;
        match self.agents.remove(asset) {
            Some(agent) if agent.created == current.created => Ok(agent),
            _ => Agent::load(template, current, &self.serializer),
        }
    }

    pub(crate) fn return_agent(&mut self, asset: ResourcePath, agent: Agent) {
        self.agents.insert(asset, agent);
    }
}
