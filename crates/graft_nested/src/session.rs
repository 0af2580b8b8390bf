//! Override sessions: edits on one nested instance.
//!
//! Reverting copies the asset's current values onto the live instance;
//! applying copies live values into the asset and stores it. Both run the
//! codec over exactly the requested fields and translate object references
//! through the instance's GUID sub-map. A sub-object held inline by an
//! `instanced` field is created on the receiving side when it has no
//! counterpart there yet. Applying a field that refers outside the instance
//! leaves it overridden and reports it.

use std::collections::{BTreeSet, HashSet};

use graft_foundation::{Diagnostic, Error, ErrorKind, Guid, Name, ObjectId, Result, Value};
use graft_serializer::{IdentityMap, LoadOptions, NestedLink, decode_payload, discover};
use graft_storage::{FieldAccessor, ObjectKind, Scene, SceneHost};
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::engine::OverrideEngine;
use crate::fingerprint::fingerprint;
use crate::overrides::OverrideSet;
use crate::record::NestedInstanceRecord;
use crate::transfer::{ByIdentity, Snapshot, copy_fields, declared, restore, snapshot};

/// What [`OverrideSession::reconcile`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcileReport {
    /// Instance root after reconciling.
    pub root: Option<ObjectId>,
    /// False if the instance was already up to date.
    pub changed: bool,
    /// Objects created for asset objects new to this instance.
    pub added: Vec<ObjectId>,
    /// Asset objects whose live counterparts were deleted.
    pub removed: Vec<Guid>,
    /// Overrides that could not be carried over.
    pub dropped: Vec<Diagnostic>,
    /// Other load diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// Reports for nested instances that were out of date after the reload.
    pub nested: Vec<ReconcileReport>,
}

/// Edits on one nested instance.
///
/// Obtained from [`OverrideEngine::begin_session`].
pub struct OverrideSession<'a> {
    engine: &'a mut OverrideEngine,
    scene: &'a mut Scene,
    root: ObjectId,
}

fn collect_fields<N: Into<Name>>(fields: impl IntoIterator<Item = N>) -> BTreeSet<Name> {
    fields.into_iter().map(Into::into).collect()
}

fn stale(object: ObjectId, field: Name) -> Diagnostic {
    Diagnostic::new(ErrorKind::StaleOverrideTarget { object, field })
}

impl<'a> OverrideSession<'a> {
    pub(crate) fn new(engine: &'a mut OverrideEngine, scene: &'a mut Scene, root: ObjectId) -> Self {
        Self { engine, scene, root }
    }

    /// Root of the instance being edited.
    #[must_use]
    pub fn root(&self) -> ObjectId {
        self.root
    }

    /// The instance's record.
    ///
    /// # Errors
    ///
    /// Returns `NotNested` if the instance was removed meanwhile.
    pub fn record(&self) -> Result<&NestedInstanceRecord> {
        self.engine
            .records
            .get(&self.root)
            .ok_or_else(|| Error::new(ErrorKind::NotNested(self.root)))
    }

    fn record_mut(&mut self) -> Result<&mut NestedInstanceRecord> {
        self.engine
            .records
            .get_mut(&self.root)
            .ok_or_else(|| Error::new(ErrorKind::NotNested(self.root)))
    }

    /// The instance's overrides.
    ///
    /// # Errors
    ///
    /// See [`OverrideSession::record`].
    pub fn overrides(&self) -> Result<&OverrideSet> {
        self.record().map(|r| &r.overrides)
    }

    /// The live scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Marks `field` of `object` as overridden.
    ///
    /// Returns false if it already was.
    ///
    /// # Errors
    ///
    /// Returns `NotNested` if `object` is not part of this instance and
    /// `FieldNotFound` if its type does not declare `field`.
    pub fn record_override(&mut self, object: ObjectId, field: impl Into<Name>) -> Result<bool> {
        let field = field.into();
        if !self.record()?.contains(object) {
            return Err(Error::new(ErrorKind::NotNested(object)));
        }
        declared(&*self.scene, object, &BTreeSet::from([field.clone()]))?;
        debug!(object = %object, field = %field, "recorded override");
        Ok(self.record_mut()?.overrides.record(object, field))
    }

    /// Unmarks `field` of `object` without touching its value.
    ///
    /// Returns false if it was not marked.
    ///
    /// # Errors
    ///
    /// Returns `NotNested` if `object` is not part of this instance.
    pub fn clear_override(&mut self, object: ObjectId, field: impl Into<Name>) -> Result<bool> {
        let field = field.into();
        let record = self.record_mut()?;
        if !record.contains(object) {
            return Err(Error::new(ErrorKind::NotNested(object)));
        }
        Ok(record.overrides.clear(object, &field))
    }

    /// Sets a field on an instance object and records the override.
    ///
    /// # Errors
    ///
    /// See [`OverrideSession::record_override`], plus any error from the
    /// host setting the value.
    pub fn set_override(&mut self, object: ObjectId, field: impl Into<Name>, value: Value) -> Result<()> {
        let field = field.into();
        if !self.record()?.contains(object) {
            return Err(Error::new(ErrorKind::NotNested(object)));
        }
        self.scene.set(object, &field, value)?;
        self.record_mut()?.overrides.record(object, field);
        Ok(())
    }

    /// Drops overrides whose object is gone or whose field its type no
    /// longer declares.
    ///
    /// # Errors
    ///
    /// See [`OverrideSession::record`].
    pub fn check_parameters(&mut self) -> Result<Vec<Diagnostic>> {
        let scene = &*self.scene;
        let record = self
            .engine
            .records
            .get_mut(&self.root)
            .ok_or_else(|| Error::new(ErrorKind::NotNested(self.root)))?;
        let members = record.sub_map.keys().copied().collect::<HashSet<_>>();
        let mut dropped = Vec::new();
        record.overrides.retain(|object, field| {
            let valid = members.contains(&object)
                && scene
                    .schema_of(object)
                    .is_some_and(|s| s.field(field.as_str()).is_some());
            if !valid {
                warn!(object = %object, field = %field, "dropping stale override");
                dropped.push(stale(object, field.clone()));
            }
            valid
        });
        Ok(dropped)
    }

    /// Copies the asset's current values of `fields` onto `object` and
    /// clears those overrides.
    ///
    /// # Errors
    ///
    /// Returns `NotNested` if `object` is not part of this instance,
    /// `FieldNotFound` for undeclared fields, and `StaleOverrideTarget` if
    /// the asset no longer has the object.
    pub fn revert<N: Into<Name>>(&mut self, object: ObjectId, fields: impl IntoIterator<Item = N>) -> Result<Vec<Diagnostic>> {
        let fields = collect_fields(fields);
        let asset = self.record()?.asset.clone();
        let mut agent = self.engine.take_agent(&*self.scene, &asset)?;
        let result = self.revert_with(&mut agent, object, &fields);
        self.engine.return_agent(asset, agent);
        result
    }

    /// Reverts every override of the instance.
    ///
    /// # Errors
    ///
    /// See [`OverrideSession::revert`].
    pub fn revert_all(&mut self) -> Result<Vec<Diagnostic>> {
        let entries = self.pending()?;
        let asset = self.record()?.asset.clone();
        let mut agent = self.engine.take_agent(&*self.scene, &asset)?;
        let mut diagnostics = Vec::new();
        let mut result = Ok(());
        for (object, fields) in entries {
            match self.revert_with(&mut agent, object, &fields) {
                Ok(d) => diagnostics.extend(d),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.engine.return_agent(asset, agent);
        result.map(|()| diagnostics)
    }

    /// Copies live values of `fields` from `object` into the asset, stores
    /// the asset, and clears those overrides.
    ///
    /// # Errors
    ///
    /// See [`OverrideSession::revert`], plus any error storing the asset.
    pub fn apply<N: Into<Name>>(&mut self, object: ObjectId, fields: impl IntoIterator<Item = N>) -> Result<Vec<Diagnostic>> {
        let fields = collect_fields(fields);
        let asset = self.record()?.asset.clone();
        let mut agent = self.engine.take_agent(&*self.scene, &asset)?;
        let result = self.apply_with(&mut agent, object, &fields).and_then(|(d, copied)| {
            if copied {
                self.commit(&mut agent)?;
            }
            Ok(d)
        });
        self.engine.return_agent(asset, agent);
        result
    }

    /// Applies every override of the instance and stores the asset once.
    ///
    /// # Errors
    ///
    /// See [`OverrideSession::apply`].
    pub fn apply_all(&mut self) -> Result<Vec<Diagnostic>> {
        let entries = self.pending()?;
        let asset = self.record()?.asset.clone();
        let mut agent = self.engine.take_agent(&*self.scene, &asset)?;
        let mut diagnostics = Vec::new();
        let mut copied = false;
        let mut result = Ok(());
        for (object, fields) in entries {
            match self.apply_with(&mut agent, object, &fields) {
                Ok((d, any)) => {
                    diagnostics.extend(d);
                    copied |= any;
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        if result.is_ok() && copied {
            result = self.commit(&mut agent);
        }
        self.engine.return_agent(asset, agent);
        result.map(|()| diagnostics)
    }

    fn pending(&self) -> Result<Vec<(ObjectId, BTreeSet<Name>)>> {
        Ok(self
            .record()?
            .overrides
            .iter()
            .map(|(o, f)| (o, f.clone()))
            .collect())
    }

    fn revert_with(&mut self, agent: &mut Agent, object: ObjectId, fields: &BTreeSet<Name>) -> Result<Vec<Diagnostic>> {
        let guid = self
            .record()?
            .asset_guid(object)
            .ok_or_else(|| Error::new(ErrorKind::NotNested(object)))?;
        declared(&*self.scene, object, fields)?;
        let source = agent
            .identity
            .object_of(guid)
            .filter(|o| agent.scene.exists(*o))
            .ok_or_else(|| missing_in_asset(object, fields))?;

        let mut diagnostics = self.create_missing_live(agent, source, object, fields)?;
        let target_ids = self.record()?.asset_identity();
        let restored = copy_fields(
            &agent.scene,
            source,
            &agent.identity,
            &mut *self.scene,
            object,
            &target_ids,
            fields,
            Some(guid),
        )?;
        diagnostics.extend(restored.diagnostics);

        let record = self.record_mut()?;
        for field in fields {
            record.overrides.clear(object, field);
        }
        debug!(object = %object, fields = fields.len(), "reverted");
        Ok(diagnostics)
    }

    /// Returns the diagnostics and whether any field reached the agent.
    ///
    /// Fields referring to objects outside the instance have no asset
    /// counterpart to point at; they stay overridden and are reported.
    fn apply_with(
        &mut self,
        agent: &mut Agent,
        object: ObjectId,
        fields: &BTreeSet<Name>,
    ) -> Result<(Vec<Diagnostic>, bool)> {
        let guid = self
            .record()?
            .asset_guid(object)
            .ok_or_else(|| Error::new(ErrorKind::NotNested(object)))?;
        declared(&*self.scene, object, fields)?;
        let target = agent
            .identity
            .object_of(guid)
            .filter(|o| agent.scene.exists(*o))
            .ok_or_else(|| missing_in_asset(object, fields))?;

        let mut diagnostics = self.create_missing_in_agent(agent, target, object, fields)?;
        let source_ids = self.record()?.asset_identity();
        let outside = outside_references(&*self.scene, object, fields, &source_ids);
        for field in &outside {
            warn!(object = %object, field = %field, "field refers outside the instance, keeping override");
            diagnostics.push(stale(object, field.clone()));
        }
        let copied: BTreeSet<Name> = fields.difference(&outside).cloned().collect();
        if copied.is_empty() {
            return Ok((diagnostics, false));
        }

        let restored = copy_fields(
            &*self.scene,
            object,
            &source_ids,
            &mut agent.scene,
            target,
            &agent.identity,
            &copied,
            Some(guid),
        )?;
        diagnostics.extend(restored.diagnostics);

        let record = self.record_mut()?;
        for field in &copied {
            record.overrides.clear(object, field);
        }
        debug!(object = %object, fields = copied.len(), "applied");
        Ok((diagnostics, true))
    }

    /// Stores the agent as the asset's new revision and marks this instance
    /// as in sync with it.
    fn commit(&mut self, agent: &mut Agent) -> Result<()> {
        let engine = &mut *self.engine;
        let record = engine
            .records
            .get(&self.root)
            .ok_or_else(|| Error::new(ErrorKind::NotNested(self.root)))?;
        let asset = record.asset.clone();
        let payload = agent.encode(&engine.serializer, &mut engine.generator)?;
        agent.created = engine.library.store(asset.clone(), payload)?;
        let current = fingerprint(&engine.library, &asset)?;
        if let Some(record) = engine.records.get_mut(&self.root) {
            record.fingerprint = current;
        }
        info!(asset = %asset, root = %self.root, "stored applied overrides");
        Ok(())
    }

    /// Sub-objects held inline by `fields` of the asset object that the
    /// live instance has no counterpart for.
    fn create_missing_live(
        &mut self,
        agent: &Agent,
        source: ObjectId,
        object: ObjectId,
        fields: &BTreeSet<Name>,
    ) -> Result<Vec<Diagnostic>> {
        let record = self.record()?;
        let missing: Vec<ObjectId> = inline_targets(&agent.scene, source, fields)
            .into_iter()
            .filter(|sub| {
                agent
                    .identity
                    .guid_of(*sub)
                    .and_then(|g| record.live_object(g))
                    .is_none_or(|live| !self.scene.exists(live))
            })
            .collect();

        let mut diagnostics = Vec::new();
        for sub in missing {
            let external = self.record()?.asset_identity();
            let mut session = self
                .engine
                .serializer
                .prepare_portable(&agent.scene, sub, &agent.identity)?;
            let outcome = session.instantiate(
                &mut *self.scene,
                &LoadOptions::under(object).with_external(external),
            )?;
            debug!(object = %object, created = outcome.created.len(), "created inline sub-object");
            let record = self.record_mut()?;
            for (guid, live) in outcome.identity.iter() {
                record.sub_map.retain(|_, g| *g != guid);
                record.sub_map.insert(live, guid);
            }
            diagnostics.extend(outcome.diagnostics);
        }
        Ok(diagnostics)
    }

    /// Sub-objects held inline by `fields` of the live object that the
    /// asset has no counterpart for.
    fn create_missing_in_agent(
        &mut self,
        agent: &mut Agent,
        target: ObjectId,
        object: ObjectId,
        fields: &BTreeSet<Name>,
    ) -> Result<Vec<Diagnostic>> {
        let record = self.record()?;
        let missing: Vec<ObjectId> = inline_targets(&*self.scene, object, fields)
            .into_iter()
            .filter(|sub| {
                record
                    .asset_guid(*sub)
                    .and_then(|g| agent.identity.object_of(g))
                    .is_none_or(|o| !agent.scene.exists(o))
            })
            .collect();

        let mut diagnostics = Vec::new();
        for sub in missing {
            let seed = self.record()?.asset_identity();
            let mut session = self
                .engine
                .serializer
                .prepare_portable(&*self.scene, sub, &seed)?;
            let outcome = session.instantiate(
                &mut agent.scene,
                &LoadOptions::under(target).with_external(agent.identity.clone()),
            )?;
            debug!(object = %object, created = outcome.created.len(), "added inline sub-object to asset");
            let sources = session.source_identity().clone();
            let record = self.record_mut()?;
            for (guid, created) in outcome.identity.iter() {
                agent.identity.insert(guid, created);
                if let Some(live) = sources.object_of(guid) {
                    record.sub_map.insert(live, guid);
                }
            }
            diagnostics.extend(outcome.diagnostics);
        }
        Ok(diagnostics)
    }

    /// Re-synchronizes the instance with its asset if the asset changed.
    ///
    /// Objects the asset gained are created, objects it lost are deleted,
    /// every other object is updated in place. Overrides are carried over
    /// unless their object or field no longer exists. Instances nested
    /// inside keep their own overrides and are brought up to date with
    /// their own assets afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound` if the asset is gone, or any load error.
    pub fn reconcile(&mut self) -> Result<ReconcileReport> {
        let record = self.record()?.clone();
        let current = fingerprint(&self.engine.library, &record.asset)?;
        let mut report = ReconcileReport {
            root: Some(self.root),
            ..ReconcileReport::default()
        };
        if current == record.fingerprint {
            debug!(asset = %record.asset, root = %self.root, "instance is up to date");
            return Ok(report);
        }
        report.changed = true;
        report.dropped = self.check_parameters()?;
        let record = self.record()?.clone();
        let inner: Vec<NestedInstanceRecord> = self
            .engine
            .records
            .values()
            .filter(|r| r.root != self.root && record.contains(r.root))
            .cloned()
            .collect();

        let captured = self.capture_overrides(&record, &record.overrides, &mut report.dropped)?;
        let mut captured_inner = Vec::new();
        for nested in &inner {
            captured_inner.extend(self.capture_overrides(&record, &nested.overrides, &mut report.dropped)?);
        }

        let stored = self.engine.library.require(&record.asset)?;
        let manifest = decode_payload(&stored.payload)?;
        let root_kept = manifest
            .root()
            .is_some_and(|r| record.asset_guid(record.root) == Some(r.guid));
        let reuse = if root_kept {
            record.asset_identity()
        } else {
            IdentityMap::new()
        };
        let options = LoadOptions::new()
            .with_parent(self.scene.owner(record.root))
            .reusing(reuse);
        let outcome = self
            .engine
            .serializer
            .load_manifest(&mut *self.scene, &manifest, &options)?;
        report.diagnostics.extend(outcome.diagnostics.iter().cloned());
        report.added.clone_from(&outcome.created);

        let kept: HashSet<ObjectId> = outcome.identity.iter().map(|(_, o)| o).collect();
        for (object, guid) in &record.sub_map {
            if kept.contains(object) {
                continue;
            }
            report.removed.push(*guid);
            if !self.scene.exists(*object) {
                continue;
            }
            let subtree = discover(&*self.scene, *object)?;
            if subtree.iter().any(|o| kept.contains(o)) {
                warn!(object = %object, "keeping removed object that still owns synchronized objects");
            } else {
                self.scene.destroy(*object)?;
            }
        }

        let nested_roots = self.install_nested(&inner, &outcome.nested);
        for (guid, old, snap) in captured_inner {
            let live = outcome.identity.object_of(guid).filter(|o| self.scene.exists(*o));
            let owner = live.and_then(|o| self.engine.instance_of(o)).filter(|r| nested_roots.contains(r));
            let (Some(live), Some(owner)) = (live, owner) else {
                report.dropped.extend(snap.fields.iter().map(|f| stale(old, f.clone())));
                continue;
            };
            let restored = restore(&mut *self.scene, live, &snap, &outcome.identity, true, Some(guid))?;
            if let Some(nested) = self.engine.records.get_mut(&owner) {
                carry_over(&mut nested.overrides, live, &snap, &restored.fields, &mut report.dropped);
            }
            report.diagnostics.extend(restored.diagnostics);
        }
        for root in nested_roots {
            if self.scene.exists(root) && self.engine.is_stale(root) {
                let nested = OverrideSession::new(&mut *self.engine, &mut *self.scene, root).reconcile()?;
                report.nested.push(nested);
            }
        }

        let mut next = NestedInstanceRecord::new(record.asset.clone(), outcome.root, current)
            .with_members(&outcome.identity);
        next.auto_update = record.auto_update;
        for (guid, old, snap) in captured {
            let Some(live) = outcome.identity.object_of(guid).filter(|o| self.scene.exists(*o)) else {
                report.dropped.extend(snap.fields.iter().map(|f| stale(old, f.clone())));
                continue;
            };
            let restored = restore(&mut *self.scene, live, &snap, &outcome.identity, true, Some(guid))?;
            carry_over(&mut next.overrides, live, &snap, &restored.fields, &mut report.dropped);
            report.diagnostics.extend(restored.diagnostics);
        }
        next.sub_map.retain(|o, _| self.scene.exists(*o));

        self.engine.records.remove(&self.root);
        self.root = next.root;
        report.root = Some(next.root);
        info!(
            asset = %next.asset,
            root = %next.root,
            added = report.added.len(),
            removed = report.removed.len(),
            dropped = report.dropped.len(),
            nested = report.nested.len(),
            "reconciled instance"
        );
        self.engine.records.insert(next.root, next);
        Ok(report)
    }

    /// Replaces the records of instances nested inside this one with the
    /// ones the asset was saved with, which describe what was just loaded.
    ///
    /// Returns the roots of the new records.
    fn install_nested(&mut self, previous: &[NestedInstanceRecord], links: &[NestedLink]) -> Vec<ObjectId> {
        for nested in previous {
            self.engine.records.remove(&nested.root);
        }
        links
            .iter()
            .map(|link| {
                let mut nested = NestedInstanceRecord::from_link(link);
                if let Some(old) = previous.iter().find(|r| r.root == link.root) {
                    nested.auto_update = old.auto_update;
                }
                self.engine.records.insert(link.root, nested);
                link.root
            })
            .collect()
    }

    /// Encodes `overrides` by the asset GUIDs of `record`, so they survive
    /// the reload.
    fn capture_overrides(
        &self,
        record: &NestedInstanceRecord,
        overrides: &OverrideSet,
        dropped: &mut Vec<Diagnostic>,
    ) -> Result<Vec<(Guid, ObjectId, Snapshot)>> {
        let identity = record.asset_identity();
        let mut captured = Vec::new();
        for (object, fields) in overrides.iter() {
            let Some(guid) = record.asset_guid(object).filter(|_| self.scene.exists(object)) else {
                dropped.extend(fields.iter().map(|f| stale(object, f.clone())));
                continue;
            };
            let mut refs = ByIdentity {
                identity: &identity,
                foreign: true,
            };
            captured.push((guid, object, snapshot(&*self.scene, object, fields, &mut refs)?));
        }
        Ok(captured)
    }
}

/// Records the restored fields of a snapshot as overrides of `live` and
/// reports the rest.
fn carry_over(
    overrides: &mut OverrideSet,
    live: ObjectId,
    snap: &Snapshot,
    restored: &[Name],
    dropped: &mut Vec<Diagnostic>,
) {
    for field in &snap.fields {
        if restored.contains(field) {
            overrides.record(live, field.clone());
        } else {
            dropped.push(stale(live, field.clone()));
        }
    }
}

fn missing_in_asset(object: ObjectId, fields: &BTreeSet<Name>) -> Error {
    let field = fields.iter().next().cloned().unwrap_or_else(|| Name::from(""));
    Error::new(ErrorKind::StaleOverrideTarget { object, field })
}

/// Behaviors owned by `object` and referenced from its `instanced` fields
/// among `fields`.
fn inline_targets<H: SceneHost + ?Sized>(host: &H, object: ObjectId, fields: &BTreeSet<Name>) -> Vec<ObjectId> {
    let Some(schema) = host.schema_of(object) else {
        return Vec::new();
    };
    let mut targets = Vec::new();
    for field in schema.fields.iter().filter(|f| f.flags.instanced && fields.contains(&f.name)) {
        if let Some(value) = host.get(object, field.name.as_str()) {
            value.for_each_object(&mut |sub| {
                if host.owner(sub) == Some(object)
                    && host.kind(sub) == Some(ObjectKind::Behavior)
                    && !targets.contains(&sub)
                {
                    targets.push(sub);
                }
            });
        }
    }
    targets
}

/// Fields among `fields` whose value refers to an object `identity` does
/// not know.
fn outside_references<H: SceneHost + ?Sized>(
    host: &H,
    object: ObjectId,
    fields: &BTreeSet<Name>,
    identity: &IdentityMap,
) -> BTreeSet<Name> {
    fields
        .iter()
        .filter(|field| {
            let mut outside = false;
            if let Some(value) = host.get(object, field.as_str()) {
                value.for_each_object(&mut |o| outside |= !identity.contains_object(o));
            }
            outside
        })
        .cloned()
        .collect()
}
