//! Version 2: the baseline format.
//!
//! All object fields share one data blob addressed by an offsets array.
//! Entities are untyped and behaviors hang directly off entities.

use graft_foundation::{Error, Guid, Name, ReferenceTables, ResourcePath, Result, TypeName};
use graft_storage::ObjectKind;
use serde::{Deserialize, Serialize};

use super::{
    VersionHandler, default_entity, expect_len, from_msgpack, legacy_exclusions, owner_index,
    type_at,
};
use crate::header::Header;
use crate::manifest::{Manifest, ManifestObject};

/// Frozen container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BaselineBody {
    /// Resource table.
    pub resources: Vec<ResourcePath>,
    /// Type table.
    pub types: Vec<TypeName>,
    /// Name table.
    pub names: Vec<Name>,
    /// GUIDs in creation order.
    pub guids: Vec<Guid>,
    /// Per-object structure, parallel to `guids`.
    pub objects: Vec<BaselineObject>,
    /// Every object's fields, concatenated.
    pub data: Vec<u8>,
    /// Start of each object's fields in `data`.
    pub offsets: Vec<u32>,
}

/// Frozen per-object record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BaselineObject {
    /// Type index for behaviors; `None` marks an entity.
    pub behavior_type: Option<u32>,
    /// Owning entity.
    pub parent: Option<u32>,
}

/// Handler for version 2.
pub struct Baseline;

impl VersionHandler for Baseline {
    fn version(&self) -> u16 {
        2
    }

    fn label(&self) -> &'static str {
        "baseline"
    }

    fn decode(&self, header: Header, body: &[u8]) -> Result<Manifest> {
        let body: BaselineBody = from_msgpack(body)?;
        expect_len("object list", body.guids.len(), body.objects.len())?;
        expect_len("offset list", body.guids.len(), body.offsets.len())?;

        let mut objects = Vec::with_capacity(body.objects.len());
        for (i, (guid, record)) in body.guids.iter().zip(&body.objects).enumerate() {
            let start = body.offsets[i] as usize;
            let end = body
                .offsets
                .get(i + 1)
                .map_or(body.data.len(), |o| *o as usize);
            let buffer = body
                .data
                .get(start..end)
                .ok_or_else(|| Error::corrupt(format!("offsets of object {i} are out of range")))?
                .to_vec();
            let (kind, type_name) = match record.behavior_type {
                Some(idx) => (ObjectKind::Behavior, type_at(&body.types, idx)?),
                None => (ObjectKind::Entity, default_entity()),
            };
            objects.push(ManifestObject {
                guid: *guid,
                kind,
                type_name,
                owner: owner_index(record.parent),
                label: None,
                buffer,
            });
        }
        behaviors_owned_by_entities(&objects)?;

        Ok(Manifest {
            version: header.version,
            stamp: header.stamp,
            tables: ReferenceTables::from_parts(body.resources, body.types, body.names),
            root_exclusions: legacy_exclusions(),
            objects,
            nested: Vec::new(),
        })
    }
}

/// Before version 4 a behavior could only be attached to an entity.
pub(super) fn behaviors_owned_by_entities(objects: &[ManifestObject]) -> Result<()> {
    for object in objects.iter().filter(|o| o.kind == ObjectKind::Behavior) {
        let owner_kind = object
            .owner
            .and_then(|o| objects.get(o))
            .map(|o| o.kind);
        if owner_kind != Some(ObjectKind::Entity) {
            return Err(Error::corrupt(format!(
                "behavior {} is not attached to an entity",
                object.guid
            )));
        }
    }
    Ok(())
}
