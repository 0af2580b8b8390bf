//! Version 8: override records. The current format.
//!
//! Nested-instance entries carry their overridden fields, the asset
//! fingerprint at last sync, and an auto-update flag. The payload records
//! its own root exclusion set.

use graft_foundation::{Error, Guid, Name, ReferenceTables, ResourcePath, Result};
use serde::{Deserialize, Serialize};

use super::{VersionHandler, expect_len, from_msgpack, kind_from_code, owner_index, to_msgpack, type_at};
use crate::header::Header;
use crate::manifest::{Manifest, ManifestObject, NestedEntry};

/// Frozen container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OverrideBody {
    /// Reference tables.
    pub tables: ReferenceTables,
    /// Fields left out of the root's positional objects.
    pub root_exclusions: Vec<Name>,
    /// GUIDs in creation order.
    pub guids: Vec<Guid>,
    /// Per-object records, parallel to `guids`.
    pub objects: Vec<ObjectRecord>,
    /// Embedded assets.
    pub nested: Vec<NestedRecord>,
}

/// Frozen per-object record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ObjectRecord {
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
pub struct NestedRecord {
    /// Embedded asset.
    pub asset: ResourcePath,
    /// Embedding entity.
    pub root: Guid,
    /// `(payload GUID, asset GUID)` pairs.
    pub members: Vec<(Guid, Guid)>,
    /// Overridden fields per payload GUID.
    pub overrides: Vec<OverrideRecord>,
    /// Asset fingerprint at last sync.
    pub fingerprint: Option<String>,
    /// Reconcile automatically when the asset changes.
    pub auto_update: bool,
}

/// Frozen override record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverrideRecord {
    /// Overridden object.
    pub object: Guid,
    /// Overridden top-level fields.
    pub fields: Vec<Name>,
}

/// Handler for version 8.
pub struct OverrideRecords;

impl VersionHandler for OverrideRecords {
    fn version(&self) -> u16 {
        8
    }

    fn label(&self) -> &'static str {
        "override-records"
    }

    fn decode(&self, header: Header, body: &[u8]) -> Result<Manifest> {
        let body: OverrideBody = from_msgpack(body)?;
        expect_len("object list", body.guids.len(), body.objects.len())?;

        let types = body.tables.types();
        let objects = body
            .guids
            .iter()
            .zip(body.objects)
            .map(|(guid, record)| {
                Ok(ManifestObject {
                    guid: *guid,
                    kind: kind_from_code(record.kind)?,
                    type_name: type_at(types, record.type_index)?,
                    owner: owner_index(record.owner),
                    label: record.label,
                    buffer: record.buffer,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let nested = body
            .nested
            .into_iter()
            .map(|n| NestedEntry {
                asset: n.asset,
                root: n.root,
                members: n.members,
                overrides: n.overrides.into_iter().map(|o| (o.object, o.fields)).collect(),
                fingerprint: n.fingerprint,
                auto_update: n.auto_update,
            })
            .collect();

        Ok(Manifest {
            version: header.version,
            stamp: header.stamp,
            tables: body.tables,
            root_exclusions: body.root_exclusions,
            objects,
            nested,
        })
    }
}

/// Encodes a manifest as a version 8 body.
///
/// Object type names are interned into a copy of the manifest's tables.
///
/// # Errors
///
/// Returns an error if an index does not fit in a u32 or encoding fails.
pub fn encode(manifest: &Manifest) -> Result<Vec<u8>> {
    let mut tables = manifest.tables.clone();
    let mut objects = Vec::with_capacity(manifest.objects.len());
    for object in &manifest.objects {
        let owner = object
            .owner
            .map(u32::try_from)
            .transpose()
            .map_err(|_| Error::serialization("owner index exceeds u32"))?;
        objects.push(ObjectRecord {
            kind: object.kind.code(),
            type_index: tables.find_or_add_type(&object.type_name)?,
            owner,
            label: object.label.clone(),
            buffer: object.buffer.clone(),
        });
    }
    let nested = manifest
        .nested
        .iter()
        .map(|n| NestedRecord {
            asset: n.asset.clone(),
            root: n.root,
            members: n.members.clone(),
            overrides: n
                .overrides
                .iter()
                .map(|(object, fields)| OverrideRecord {
                    object: *object,
                    fields: fields.clone(),
                })
                .collect(),
            fingerprint: n.fingerprint.clone(),
            auto_update: n.auto_update,
        })
        .collect();

    to_msgpack(&OverrideBody {
        tables,
        root_exclusions: manifest.root_exclusions.clone(),
        guids: manifest.guids().collect(),
        objects,
        nested,
    })
}
