//! Encoding a live hierarchy into a manifest.

use std::collections::{HashMap, HashSet};

use graft_codec::{ObjectEncoding, ReferenceEncoder, StandardSkip, ValueWriter};
use graft_foundation::{Error, GuidGenerator, ObjectId, ReferenceTables, Result};
use graft_storage::{ObjectKind, SceneHost, TypeSchema};

use crate::config::SerializerConfig;
use crate::identity::IdentityMap;
use crate::manifest::{Manifest, ManifestObject, NestedEntry, NestedLink};
use crate::versions::CURRENT_VERSION;
use crate::walker::discover;

/// How references to objects outside the payload are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutsideRefs {
    /// Dropped. Used for storage.
    Drop,
    /// Written as raw handles. Only valid when loading into the same host.
    Foreign,
    /// Written by GUID when the identity map knows the object.
    Known,
}

struct PayloadRefs<'a> {
    identity: &'a IdentityMap,
    members: &'a HashMap<ObjectId, usize>,
    outside: OutsideRefs,
}

impl ReferenceEncoder for PayloadRefs<'_> {
    fn encode_object(&mut self, object: ObjectId) -> ObjectEncoding {
        if self.members.contains_key(&object) {
            return self
                .identity
                .guid_of(object)
                .map_or(ObjectEncoding::None, ObjectEncoding::Guid);
        }
        match self.outside {
            OutsideRefs::Drop => ObjectEncoding::None,
            OutsideRefs::Foreign => ObjectEncoding::Foreign,
            OutsideRefs::Known => self
                .identity
                .guid_of(object)
                .map_or(ObjectEncoding::None, ObjectEncoding::Guid),
        }
    }
}

/// Whether an object's fields are filtered by the root exclusion set.
///
/// That is the root itself and the positional behaviors attached directly
/// to it.
pub(crate) fn is_root_positional(
    index: usize,
    owner: Option<usize>,
    kind: ObjectKind,
    schema: &TypeSchema,
) -> bool {
    index == 0 || (owner == Some(0) && kind == ObjectKind::Behavior && schema.positional)
}

/// Walks `root`, assigns GUIDs, and encodes every owned object.
///
/// Returns the manifest and the walked objects in manifest order.
pub(crate) fn build_manifest<H: SceneHost + ?Sized>(
    host: &H,
    root: ObjectId,
    identity: &mut IdentityMap,
    generator: &mut GuidGenerator,
    config: &SerializerConfig,
    outside: OutsideRefs,
) -> Result<(Manifest, Vec<ObjectId>)> {
    if !host.exists(root) {
        return Err(Error::invalid_root(format!("{root} does not exist")));
    }
    let order = discover(host, root)?;
    let positions: HashMap<ObjectId, usize> = order.iter().enumerate().map(|(i, o)| (*o, i)).collect();
    let mut described = Vec::with_capacity(order.len());
    for object in &order {
        let schema = host
            .schema_of(*object)
            .ok_or_else(|| Error::invalid_root(format!("{object} has no schema")))?;
        let kind = host
            .kind(*object)
            .ok_or_else(|| Error::object_not_found(*object))?;
        described.push((schema, kind));
    }
    for object in &order {
        identity.assign(*object, generator);
    }

    let mut tables = ReferenceTables::new();
    let mut objects = Vec::with_capacity(order.len());
    let plain = StandardSkip::new();
    let positional = StandardSkip::excluding(config.positional_fields.iter().cloned());

    for (i, (object, (schema, kind))) in order.iter().zip(described).enumerate() {
        let owner = if i == 0 {
            None
        } else {
            host.owner(*object).and_then(|o| positions.get(&o).copied())
        };
        let guid = identity
            .guid_of(*object)
            .ok_or_else(|| Error::internal("walked object has no guid"))?;

        let skip = if is_root_positional(i, owner, kind, &schema) {
            &positional
        } else {
            &plain
        };
        let mut refs = PayloadRefs {
            identity,
            members: &positions,
            outside,
        };
        let mut writer = ValueWriter::new(&mut tables, &mut refs, skip);
        for field in &schema.fields {
            let value = host.get(*object, field.name.as_str());
            writer.write_field(&schema.name, field, value.as_ref())?;
        }
        objects.push(ManifestObject {
            guid,
            kind,
            type_name: schema.name.clone(),
            owner,
            label: host.label(*object),
            buffer: writer.into_bytes(),
        });
    }

    let manifest = Manifest {
        version: CURRENT_VERSION,
        stamp: config.engine_stamp.clone(),
        tables,
        root_exclusions: config.positional_fields.clone(),
        objects,
        nested: Vec::new(),
    };
    Ok((manifest, order))
}

/// Converts live nested links into stored entries, keeping only instances
/// rooted inside the payload.
pub(crate) fn nested_entries(
    links: &[NestedLink],
    identity: &IdentityMap,
    order: &[ObjectId],
) -> Vec<NestedEntry> {
    let walked: HashSet<ObjectId> = order.iter().copied().collect();
    let in_payload = |o: &ObjectId| walked.contains(o);
    links
        .iter()
        .filter(|link| in_payload(&link.root))
        .filter_map(|link| {
            let root = identity.guid_of(link.root)?;
            let members = link
                .members
                .iter()
                .filter(|(o, _)| in_payload(o))
                .filter_map(|(o, asset_guid)| Some((identity.guid_of(*o)?, *asset_guid)))
                .collect();
            let overrides = link
                .overrides
                .iter()
                .filter(|(o, _)| in_payload(o))
                .filter_map(|(o, fields)| Some((identity.guid_of(*o)?, fields.clone())))
                .collect();
            Some(NestedEntry {
                asset: link.asset.clone(),
                root,
                members,
                overrides,
                fingerprint: link.fingerprint.clone(),
                auto_update: link.auto_update,
            })
        })
        .collect()
}
