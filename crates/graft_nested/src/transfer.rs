//! Filtered field copies between hosts.
//!
//! Overrides move between a live instance and its asset by running the
//! codec over an allow-list of fields. Object references cross over by
//! GUID: the writer names each referenced object by its asset GUID and the
//! reader looks the GUID up on the other side.

use std::collections::BTreeSet;
use std::sync::Arc;

use graft_codec::{
    FieldRead, ObjectEncoding, OverrideFilter, ReferenceDecoder, ReferenceEncoder, ValueReader,
    ValueWriter,
};
use graft_foundation::{
    Diagnostic, Error, ErrorKind, Guid, Name, ObjectId, ReferenceTables, ResourcePath, Result,
};
use graft_serializer::IdentityMap;
use graft_storage::{SceneHost, TypeSchema};
use tracing::warn;

/// Names objects by their GUID in `identity`.
///
/// With `foreign` set, objects the map does not know are passed through as
/// raw handles instead of being dropped.
pub(crate) struct ByIdentity<'a> {
    pub identity: &'a IdentityMap,
    pub foreign: bool,
}

impl ReferenceEncoder for ByIdentity<'_> {
    fn encode_object(&mut self, object: ObjectId) -> ObjectEncoding {
        match self.identity.guid_of(object) {
            Some(guid) => ObjectEncoding::Guid(guid),
            None if self.foreign => ObjectEncoding::Foreign,
            None => ObjectEncoding::None,
        }
    }
}

/// Resolves GUIDs through `identity`, to objects alive in `host`.
pub(crate) struct IntoHost<'a, H: ?Sized> {
    pub identity: &'a IdentityMap,
    pub host: &'a H,
    pub foreign: bool,
}

impl<H: SceneHost + ?Sized> ReferenceDecoder for IntoHost<'_, H> {
    fn decode_guid(&mut self, guid: Guid) -> Option<ObjectId> {
        self.identity.object_of(guid).filter(|o| self.host.exists(*o))
    }

    fn decode_foreign(&mut self, handle: ObjectId) -> Option<ObjectId> {
        (self.foreign && self.host.exists(handle)).then_some(handle)
    }

    fn resolve_resource(&self, path: &ResourcePath) -> bool {
        self.host.resolve_resource(path)
    }
}

/// An object's allow-listed fields, encoded.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    pub schema: Arc<TypeSchema>,
    pub fields: BTreeSet<Name>,
    tables: ReferenceTables,
    bytes: Vec<u8>,
}

/// Encodes `fields` of `object`.
pub(crate) fn snapshot<H: SceneHost + ?Sized>(
    host: &H,
    object: ObjectId,
    fields: &BTreeSet<Name>,
    refs: &mut dyn ReferenceEncoder,
) -> Result<Snapshot> {
    let schema = host
        .schema_of(object)
        .ok_or_else(|| Error::object_not_found(object))?;
    let filter = OverrideFilter::new(fields.iter().cloned());
    let mut tables = ReferenceTables::new();
    let mut writer = ValueWriter::new(&mut tables, refs, &filter);
    for field in &schema.fields {
        let value = host.get(object, field.name.as_str());
        writer.write_field(&schema.name, field, value.as_ref())?;
    }
    let bytes = writer.into_bytes();
    Ok(Snapshot {
        schema,
        fields: fields.clone(),
        tables,
        bytes,
    })
}

/// Fields that were successfully restored, plus per-field diagnostics.
#[derive(Debug, Default)]
pub(crate) struct Restored {
    pub fields: Vec<Name>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decodes a snapshot onto `object`.
///
/// Fields whose references no longer resolve are reset to their default
/// and left out of [`Restored::fields`].
pub(crate) fn restore<H: SceneHost + ?Sized>(
    host: &mut H,
    object: ObjectId,
    snapshot: &Snapshot,
    identity: &IdentityMap,
    foreign: bool,
    guid: Option<Guid>,
) -> Result<Restored> {
    let filter = OverrideFilter::new(snapshot.fields.iter().cloned());
    let mut restored = Restored::default();
    let reads = {
        let mut refs = IntoHost {
            identity,
            host: &*host,
            foreign,
        };
        let mut reader = ValueReader::new(&snapshot.bytes, &snapshot.tables, &mut refs, &filter);
        if let Some(guid) = guid {
            reader = reader.at_object(guid);
        }
        let mut reads = Vec::new();
        for field in &snapshot.schema.fields {
            let read = reader.read_field(&snapshot.schema.name, field)?;
            reads.push((field, read));
        }
        restored.diagnostics.extend(reader.into_diagnostics());
        reads
    };

    for (field, read) in reads {
        match read {
            FieldRead::Value(value) => match host.set(object, &field.name, value) {
                Ok(()) => restored.fields.push(field.name.clone()),
                Err(e) => {
                    warn!(object = %object, field = %field.name, error = %e, "could not restore field");
                    restored
                        .diagnostics
                        .push(Diagnostic::new(e.kind).at(guid).on_field(field.name.clone()));
                }
            },
            FieldRead::Unresolved => {
                if let Err(e) = host.set(object, &field.name, field.default_value()) {
                    warn!(object = %object, field = %field.name, error = %e, "could not reset unresolved field");
                    restored
                        .diagnostics
                        .push(Diagnostic::new(e.kind).at(guid).on_field(field.name.clone()));
                }
            }
            FieldRead::Skipped | FieldRead::Absent => {}
        }
    }
    Ok(restored)
}

/// Copies `fields` of `from` in `source` onto `to` in `target`.
///
/// `source_ids` names source objects; `target_ids` resolves those names in
/// the target.
#[allow(clippy::too_many_arguments)]
pub(crate) fn copy_fields<S, T>(
    source: &S,
    from: ObjectId,
    source_ids: &IdentityMap,
    target: &mut T,
    to: ObjectId,
    target_ids: &IdentityMap,
    fields: &BTreeSet<Name>,
    guid: Option<Guid>,
) -> Result<Restored>
where
    S: SceneHost + ?Sized,
    T: SceneHost + ?Sized,
{
    let mut refs = ByIdentity {
        identity: source_ids,
        foreign: false,
    };
    let snap = snapshot(source, from, fields, &mut refs)?;
    restore(target, to, &snap, target_ids, false, guid)
}

/// Checks that every requested field is declared on `object`'s type.
pub(crate) fn declared<H: SceneHost + ?Sized>(
    host: &H,
    object: ObjectId,
    fields: &BTreeSet<Name>,
) -> Result<Arc<TypeSchema>> {
    let schema = host
        .schema_of(object)
        .ok_or_else(|| Error::object_not_found(object))?;
    for field in fields {
        if schema.field(field.as_str()).is_none() {
            return Err(Error::new(ErrorKind::FieldNotFound {
                type_name: schema.name.clone(),
                field: field.clone(),
            }));
        }
    }
    Ok(schema)
}
