//! Version 4: behaviors may own sub-objects.
//!
//! The record's `parent` became `owner`, which may now name a behavior.

use graft_foundation::{Guid, Name, ReferenceTables, ResourcePath, Result, TypeName};
use graft_storage::ObjectKind;
use serde::{Deserialize, Serialize};

use super::{VersionHandler, default_entity, expect_len, from_msgpack, legacy_exclusions, owner_index, type_at};
use crate::header::Header;
use crate::manifest::{Manifest, ManifestObject};

/// Frozen container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubObjectBody {
    /// Resource table.
    pub resources: Vec<ResourcePath>,
    /// Type table.
    pub types: Vec<TypeName>,
    /// Name table.
    pub names: Vec<Name>,
    /// GUIDs in creation order.
    pub guids: Vec<Guid>,
    /// Per-object records, parallel to `guids`.
    pub objects: Vec<SubObjectRecord>,
}

/// Frozen per-object record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubObjectRecord {
    /// Type index for behaviors; `None` marks an entity.
    pub behavior_type: Option<u32>,
    /// Owning entity or behavior.
    pub owner: Option<u32>,
    /// Encoded fields.
    pub buffer: Vec<u8>,
}

/// Handler for version 4.
pub struct NestedSubObjects;

impl VersionHandler for NestedSubObjects {
    fn version(&self) -> u16 {
        4
    }

    fn label(&self) -> &'static str {
        "nested-sub-objects"
    }

    fn decode(&self, header: Header, body: &[u8]) -> Result<Manifest> {
        let body: SubObjectBody = from_msgpack(body)?;
        expect_len("object list", body.guids.len(), body.objects.len())?;

        let objects = body
            .guids
            .iter()
            .zip(body.objects)
            .map(|(guid, record)| {
                let (kind, type_name) = match record.behavior_type {
                    Some(idx) => (ObjectKind::Behavior, type_at(&body.types, idx)?),
                    None => (ObjectKind::Entity, default_entity()),
                };
                Ok(ManifestObject {
                    guid: *guid,
                    kind,
                    type_name,
                    owner: owner_index(record.owner),
                    label: None,
                    buffer: record.buffer,
                })
            })
            .collect::<Result<Vec<_>>>()?;

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
