//! Materializing a manifest into a host.
//!
//! Loading runs in phases: every object is created (or reused) first so that
//! object references can resolve regardless of order, then fields are
//! streamed, then the root is placed, then entities are notified root to
//! leaf.

use std::collections::HashMap;
use std::time::Instant;

use graft_codec::{FieldRead, ReferenceDecoder, StandardSkip, ValueReader};
use graft_foundation::{
    Diagnostic, Error, ErrorKind, FieldSchema, Guid, Name, ObjectId, ReferenceTables, ResourcePath, Result,
    TypeName, Value,
};
use graft_storage::{ObjectKind, SceneHost};
use tracing::{debug, info, warn};

use crate::config::SerializerConfig;
use crate::identity::IdentityMap;
use crate::manifest::{Manifest, ManifestObject, NestedLink};
use crate::save::is_root_positional;

/// Where the loaded root ends up.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Placement {
    /// Root positional fields keep their type defaults.
    #[default]
    Keep,
    /// Root positional fields are set to these values.
    Fields(Vec<(Name, Value)>),
}

impl Placement {
    /// Places the root by setting `fields`.
    #[must_use]
    pub fn fields<N: Into<Name>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Self::Fields(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }
}

/// Options for [`crate::Serializer::deserialize`] and
/// [`crate::DuplicateSession::instantiate`].
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Entity (or, for behavior roots, owner) the root is attached to.
    pub parent: Option<ObjectId>,
    /// Root placement.
    pub placement: Placement,
    /// Resources to substitute before decoding.
    pub replace_resources: HashMap<ResourcePath, ResourcePath>,
    /// Types to substitute before decoding.
    pub replace_types: HashMap<TypeName, TypeName>,
    /// Existing objects to reuse, by GUID.
    pub reuse: IdentityMap,
    /// Objects outside the payload that GUID references may resolve to.
    pub external: IdentityMap,
}

impl LoadOptions {
    /// Loads at top level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads under `parent`.
    #[must_use]
    pub fn under(parent: ObjectId) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Sets the parent.
    #[must_use]
    pub fn with_parent(mut self, parent: Option<ObjectId>) -> Self {
        self.parent = parent;
        self
    }

    /// Sets the placement.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Substitutes one resource for another.
    #[must_use]
    pub fn replace_resource(mut self, from: impl Into<ResourcePath>, to: impl Into<ResourcePath>) -> Self {
        self.replace_resources.insert(from.into(), to.into());
        self
    }

    /// Substitutes one type for another.
    #[must_use]
    pub fn replace_type(mut self, from: impl Into<TypeName>, to: impl Into<TypeName>) -> Self {
        self.replace_types.insert(from.into(), to.into());
        self
    }

    /// Reuses live objects recorded in `identity` instead of creating them.
    #[must_use]
    pub fn reusing(mut self, identity: IdentityMap) -> Self {
        self.reuse = identity;
        self
    }

    /// Lets references resolve to objects outside the payload.
    #[must_use]
    pub fn with_external(mut self, identity: IdentityMap) -> Self {
        self.external = identity;
        self
    }
}

/// Result of a load.
#[derive(Clone, Debug)]
pub struct LoadOutcome {
    /// The loaded root.
    pub root: ObjectId,
    /// Payload GUID → live object, for every materialized object.
    pub identity: IdentityMap,
    /// Objects created by this load, in creation order.
    pub created: Vec<ObjectId>,
    /// Objects reused from [`LoadOptions::reuse`].
    pub reused: Vec<ObjectId>,
    /// Non-fatal conditions.
    pub diagnostics: Vec<Diagnostic>,
    /// Nested instances embedded in the payload, resolved to live objects.
    pub nested: Vec<NestedLink>,
    /// Version the payload was written with.
    pub version: u16,
}

struct LoadRefs<'a, H: ?Sized> {
    identity: &'a IdentityMap,
    external: &'a IdentityMap,
    host: &'a H,
    allow_foreign: bool,
}

impl<H: SceneHost + ?Sized> ReferenceDecoder for LoadRefs<'_, H> {
    fn decode_guid(&mut self, guid: Guid) -> Option<ObjectId> {
        self.identity.object_of(guid).or_else(|| {
            self.external
                .object_of(guid)
                .filter(|o| self.host.exists(*o))
        })
    }

    fn decode_foreign(&mut self, handle: ObjectId) -> Option<ObjectId> {
        (self.allow_foreign && self.host.exists(handle)).then_some(handle)
    }

    fn resolve_resource(&self, path: &ResourcePath) -> bool {
        self.host.resolve_resource(path)
    }
}

fn replaced_tables(manifest: &Manifest, options: &LoadOptions) -> ReferenceTables {
    let mut tables = manifest.tables.clone();
    for (from, to) in &options.replace_resources {
        if tables.replace_resource(from, to) {
            debug!(from = %from, to = %to, "replaced resource");
        }
    }
    for (from, to) in &options.replace_types {
        if tables.replace_type(from, to) {
            debug!(from = %from, to = %to, "replaced type");
        }
    }
    tables
}

fn type_for<'a>(object: &'a ManifestObject, options: &'a LoadOptions) -> &'a TypeName {
    options
        .replace_types
        .get(&object.type_name)
        .unwrap_or(&object.type_name)
}

/// Checks everything that must hold before the host is touched.
fn check_root<H: SceneHost + ?Sized>(host: &H, manifest: &Manifest, options: &LoadOptions) -> Result<()> {
    let root = manifest
        .root()
        .ok_or_else(|| Error::invalid_root("payload holds no objects"))?;
    if let Some(parent) = options.parent {
        if !host.exists(parent) {
            return Err(Error::invalid_root(format!("parent {parent} does not exist")));
        }
    }
    if root.kind == ObjectKind::Behavior && options.parent.is_none() {
        return Err(Error::invalid_root("a behavior root needs an owner"));
    }
    let type_name = type_for(root, options);
    let reusable = options
        .reuse
        .object_of(root.guid)
        .is_some_and(|o| host.exists(o));
    match host.type_schema(type_name) {
        _ if reusable => Ok(()),
        Some(schema) if schema.kind == root.kind => Ok(()),
        _ => Err(Error::invalid_root(format!(
            "root type {type_name} cannot be instantiated"
        ))),
    }
}

/// Creates, streams, places, and notifies.
pub(crate) fn materialize<H: SceneHost + ?Sized>(
    host: &mut H,
    manifest: &Manifest,
    options: &LoadOptions,
    config: &SerializerConfig,
    allow_foreign: bool,
) -> Result<LoadOutcome> {
    let started = Instant::now();
    check_root(host, manifest, options)?;
    let tables = replaced_tables(manifest, options);

    let mut identity = IdentityMap::new();
    let mut slots: Vec<Option<ObjectId>> = Vec::with_capacity(manifest.len());
    let mut created = Vec::new();
    let mut reused = Vec::new();
    let mut diagnostics = Vec::new();

    for (i, object) in manifest.objects.iter().enumerate() {
        let owner = match object.owner {
            None => options.parent,
            Some(o) => match slots.get(o).copied().flatten() {
                Some(live) => Some(live),
                None => {
                    // owner was skipped, so is everything it owns
                    slots.push(None);
                    continue;
                }
            },
        };
        let type_name = type_for(object, options);

        let existing = options
            .reuse
            .object_of(object.guid)
            .filter(|o| host.exists(*o) && host.type_name(*o).as_ref() == Some(type_name));
        let live = if let Some(o) = existing {
            reused.push(o);
            o
        } else {
            match host.type_schema(type_name) {
                Some(schema) if schema.kind == object.kind => {}
                _ if i == 0 => {
                    return Err(Error::invalid_root(format!(
                        "root type {type_name} cannot be instantiated"
                    )));
                }
                _ => {
                    warn!(guid = %object.guid, type_name = %type_name, "skipping object of unknown type");
                    diagnostics.push(
                        Diagnostic::new(ErrorKind::UnknownType(type_name.clone())).at(Some(object.guid)),
                    );
                    slots.push(None);
                    continue;
                }
            }
            let o = match object.kind {
                ObjectKind::Entity => host.spawn_entity(type_name, owner)?,
                ObjectKind::Behavior => {
                    let owner = owner.ok_or_else(|| Error::invalid_root("a behavior root needs an owner"))?;
                    host.attach_behavior(type_name, owner)?
                }
            };
            created.push(o);
            o
        };
        if object.label.is_some() || existing.is_some() {
            host.set_label(live, object.label.clone())?;
        }
        identity.insert(object.guid, live);
        slots.push(Some(live));
    }

    let root = slots
        .first()
        .copied()
        .flatten()
        .ok_or_else(|| Error::internal("root was not materialized"))?;

    for (i, object) in manifest.objects.iter().enumerate() {
        let Some(live) = slots[i] else { continue };
        let reads = read_fields(
            &*host,
            manifest,
            i,
            live,
            &tables,
            &identity,
            options,
            allow_foreign,
            &mut diagnostics,
        );
        for (field, read) in reads {
            match read {
                FieldRead::Value(value) => {
                    if let Err(e) = host.set(live, &field, value) {
                        warn!(guid = %object.guid, field = %field, error = %e, "could not set field");
                        diagnostics.push(Diagnostic::new(e.kind).at(Some(object.guid)).on_field(field));
                    }
                }
                FieldRead::Unresolved => {
                    if let Some(default) = host
                        .schema_of(live)
                        .and_then(|s| s.field(field.as_str()).map(FieldSchema::default_value))
                    {
                        if let Err(e) = host.set(live, &field, default) {
                            warn!(guid = %object.guid, field = %field, error = %e, "could not reset unresolved field");
                            diagnostics.push(Diagnostic::new(e.kind).at(Some(object.guid)).on_field(field));
                        }
                    }
                }
                FieldRead::Skipped | FieldRead::Absent => {}
            }
        }
    }

    if let Placement::Fields(fields) = &options.placement {
        let target = positional_target(&*host, root);
        for (name, value) in fields {
            host.set(target, name, value.clone())?;
        }
    }

    for (i, object) in manifest.objects.iter().enumerate() {
        if let (Some(live), ObjectKind::Entity) = (slots[i], object.kind) {
            host.post_construct(live);
        }
    }

    let nested = resolve_nested(manifest, &identity, &mut diagnostics);

    info!(
        root = %root,
        version = manifest.version,
        created = created.len(),
        reused = reused.len(),
        diagnostics = diagnostics.len(),
        "loaded payload"
    );
    if config.log_load_time {
        info!(elapsed_us = started.elapsed().as_micros(), objects = manifest.len(), "load time");
    }

    Ok(LoadOutcome {
        root,
        identity,
        created,
        reused,
        diagnostics,
        nested,
        version: manifest.version,
    })
}

#[allow(clippy::too_many_arguments)]
fn read_fields<H: SceneHost + ?Sized>(
    host: &H,
    manifest: &Manifest,
    index: usize,
    live: ObjectId,
    tables: &ReferenceTables,
    identity: &IdentityMap,
    options: &LoadOptions,
    allow_foreign: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<(Name, FieldRead)> {
    let object = &manifest.objects[index];
    let Some(schema) = host.schema_of(live) else {
        return Vec::new();
    };
    let skip = if is_root_positional(index, object.owner, object.kind, &schema) {
        StandardSkip::excluding(manifest.root_exclusions.iter().cloned())
    } else {
        StandardSkip::new()
    };
    let mut refs = LoadRefs {
        identity,
        external: &options.external,
        host,
        allow_foreign,
    };
    let mut reader = ValueReader::new(&object.buffer, tables, &mut refs, &skip).at_object(object.guid);
    let mut reads = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match reader.read_field(&schema.name, field) {
            Ok(read) => reads.push((field.name.clone(), read)),
            Err(e) => {
                warn!(guid = %object.guid, field = %field.name, error = %e, "corrupt object buffer");
                diagnostics.push(Diagnostic::new(e.kind).at(Some(object.guid)).on_field(field.name.clone()));
                break;
            }
        }
    }
    diagnostics.extend(reader.into_diagnostics());
    reads
}

/// The root's first positional behavior, or the root itself.
fn positional_target<H: SceneHost + ?Sized>(host: &H, root: ObjectId) -> ObjectId {
    host.owned(root)
        .into_iter()
        .find(|o| {
            host.kind(*o) == Some(ObjectKind::Behavior)
                && host.schema_of(*o).is_some_and(|s| s.positional)
        })
        .unwrap_or(root)
}

fn resolve_nested(
    manifest: &Manifest,
    identity: &IdentityMap,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<NestedLink> {
    let mut links = Vec::with_capacity(manifest.nested.len());
    for entry in &manifest.nested {
        let Some(root) = identity.object_of(entry.root) else {
            warn!(asset = %entry.asset, guid = %entry.root, "nested instance root was not loaded");
            diagnostics.push(Diagnostic::new(ErrorKind::UnresolvedReference(entry.root)));
            continue;
        };
        links.push(NestedLink {
            asset: entry.asset.clone(),
            root,
            members: entry
                .members
                .iter()
                .filter_map(|(g, asset_guid)| Some((identity.object_of(*g)?, *asset_guid)))
                .collect(),
            overrides: entry
                .overrides
                .iter()
                .filter_map(|(g, fields)| Some((identity.object_of(*g)?, fields.clone())))
                .collect(),
            fingerprint: entry.fingerprint.clone(),
            auto_update: entry.auto_update,
        });
    }
    links
}
