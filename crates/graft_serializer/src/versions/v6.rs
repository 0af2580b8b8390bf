//! Version 6: typed entities.
//!
//! Every record carries an object kind and a type index, so entities may be
//! of any registered entity type.

use graft_foundation::{Guid, Name, ReferenceTables, ResourcePath, Result, TypeName};
use serde::{Deserialize, Serialize};

use super::{VersionHandler, expect_len, from_msgpack, kind_from_code, legacy_exclusions, owner_index, type_at};
use crate::header::Header;
use crate::manifest::{Manifest, ManifestObject};

/// Frozen container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TypedBody {
    /// Resource table.
    pub resources: Vec<ResourcePath>,
    /// Type table.
    pub types: Vec<TypeName>,
    /// Name table.
    pub names: Vec<Name>,
    /// GUIDs in creation order.
    pub guids: Vec<Guid>,
    /// Per-object records, parallel to `guids`.
    pub objects: Vec<TypedRecord>,
}

/// Frozen per-object record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TypedRecord {
    /// Object kind code.
    pub kind: u8,
    /// Type index.
    pub type_index: u32,
    /// Owning entity or behavior.
    pub owner: Option<u32>,
    /// Display label.
    pub label: Option<String>,
    /// Encoded fields.
    pub buffer: Vec<u8>,
}

/// Handler for version 6.
pub struct TypedEntities;

impl VersionHandler for TypedEntities {
    fn version(&self) -> u16 {
        6
    }

    fn label(&self) -> &'static str {
        "typed-entities"
    }

    fn decode(&self, header: Header, body: &[u8]) -> Result<Manifest> {
        let body: TypedBody = from_msgpack(body)?;
        expect_len("object list", body.guids.len(), body.objects.len())?;

        let objects = body
            .guids
            .iter()
            .zip(body.objects)
            .map(|(guid, record)| {
                Ok(ManifestObject {
                    guid: *guid,
                    kind: kind_from_code(record.kind)?,
                    type_name: type_at(&body.types, record.type_index)?,
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
