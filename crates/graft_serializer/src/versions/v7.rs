//! Version 7: nested-instance table.
//!
//! Payloads list the assets embedded in them, with the GUID pairs that tie
//! each embedded object to its counterpart in the asset.

use graft_foundation::{Guid, Name, ReferenceTables, ResourcePath, Result, TypeName};
use serde::{Deserialize, Serialize};

use super::{VersionHandler, expect_len, from_msgpack, kind_from_code, legacy_exclusions, owner_index, type_at};
use crate::header::Header;
use crate::manifest::{Manifest, ManifestObject, NestedEntry};

/// Frozen container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NestedBody {
    /// Resource table.
    pub resources: Vec<ResourcePath>,
    /// Type table.
    pub types: Vec<TypeName>,
    /// Name table.
    pub names: Vec<Name>,
    /// GUIDs in creation order.
    pub guids: Vec<Guid>,
    /// Per-object records, parallel to `guids`.
    pub objects: Vec<NestedObjectRecord>,
    /// Embedded assets.
    pub nested: Vec<NestedInstanceRecord>,
}

/// Frozen per-object record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NestedObjectRecord {
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

/// Frozen nested-instance record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NestedInstanceRecord {
    /// Embedded asset.
    pub asset: ResourcePath,
    /// Embedding entity.
    pub root: Guid,
    /// `(payload GUID, asset GUID)` pairs.
    pub members: Vec<(Guid, Guid)>,
}

/// Handler for version 7.
pub struct NestedInstances;

impl VersionHandler for NestedInstances {
    fn version(&self) -> u16 {
        7
    }

    fn label(&self) -> &'static str {
        "nested-instances"
    }

    fn decode(&self, header: Header, body: &[u8]) -> Result<Manifest> {
        let body: NestedBody = from_msgpack(body)?;
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

        // overrides and fingerprints were not recorded yet
        let nested = body
            .nested
            .into_iter()
            .map(|n| NestedEntry {
                asset: n.asset,
                root: n.root,
                members: n.members,
                overrides: Vec::new(),
                fingerprint: None,
                auto_update: true,
            })
            .collect();

        Ok(Manifest {
            version: header.version,
            stamp: header.stamp,
            tables: ReferenceTables::from_parts(body.resources, body.types, body.names),
            root_exclusions: legacy_exclusions(),
            objects,
            nested,
        })
    }
}
