//! Version 5: per-object display labels.

use graft_foundation::{Guid, Name, ReferenceTables, ResourcePath, Result, TypeName};
use graft_storage::ObjectKind;
use serde::{Deserialize, Serialize};

use super::{VersionHandler, default_entity, expect_len, from_msgpack, legacy_exclusions, owner_index, type_at};
use crate::header::Header;
use crate::manifest::{Manifest, ManifestObject};

/// Frozen container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LabeledBody {
    /// Resource table.
    pub resources: Vec<ResourcePath>,
    /// Type table.
    pub types: Vec<TypeName>,
    /// Name table.
    pub names: Vec<Name>,
    /// GUIDs in creation order.
    pub guids: Vec<Guid>,
    /// Per-object records, parallel to `guids`.
    pub objects: Vec<LabeledRecord>,
}

/// Frozen per-object record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LabeledRecord {
    /// Type index for behaviors; `None` marks an entity.
    pub behavior_type: Option<u32>,
    /// Owning entity or behavior.
    pub owner: Option<u32>,
    /// Display label.
    pub label: Option<String>,
    /// Encoded fields.
    pub buffer: Vec<u8>,
}

/// Handler for version 5.
pub struct ObjectLabels;

impl VersionHandler for ObjectLabels {
    fn version(&self) -> u16 {
        5
    }

    fn label(&self) -> &'static str {
        "object-labels"
    }

    fn decode(&self, header: Header, body: &[u8]) -> Result<Manifest> {
        let body: LabeledBody = from_msgpack(body)?;
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
                    label: record.label,
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
