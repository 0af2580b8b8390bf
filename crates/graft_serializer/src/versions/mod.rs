//! Version dispatch.
//!
//! Each historical format has a frozen container and a handler that decodes
//! it into a [`Manifest`]. Handlers are selected by the version number in
//! the header and never share decoding branches. Only
//! [`CURRENT_VERSION`] is ever written; older payloads migrate by being
//! loaded and saved again.

use std::collections::HashSet;

use graft_foundation::{Error, Guid, Name, Result, TypeName};
use graft_storage::{ObjectKind, TypeRegistry};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::header::{Header, peek_version};
use crate::manifest::{Manifest, ManifestObject};

pub mod v2;
pub mod v3;
pub mod v4;
pub mod v5;
pub mod v6;
pub mod v7;
pub mod v8;

/// Oldest version still loadable.
pub const OLDEST_VERSION: u16 = 2;

/// Version written by this build.
pub const CURRENT_VERSION: u16 = 8;

/// Decoder for one frozen payload version.
pub trait VersionHandler: Sync {
    /// The version this handler reads.
    fn version(&self) -> u16;

    /// Short name of the format revision.
    fn label(&self) -> &'static str;

    /// Decodes a payload body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a valid container of this
    /// version.
    fn decode(&self, header: Header, body: &[u8]) -> Result<Manifest>;
}

static HANDLERS: [&dyn VersionHandler; 7] = [
    &v2::Baseline,
    &v3::FramedBuffers,
    &v4::NestedSubObjects,
    &v5::ObjectLabels,
    &v6::TypedEntities,
    &v7::NestedInstances,
    &v8::OverrideRecords,
];

/// Looks up the handler for a stored version.
///
/// # Errors
///
/// Returns `UnsupportedVersion` outside the known range.
pub fn handler_for(version: u16) -> Result<&'static dyn VersionHandler> {
    HANDLERS
        .iter()
        .copied()
        .find(|h| h.version() == version)
        .ok_or_else(|| Error::unsupported_version(version))
}

/// Every known handler, oldest first.
#[must_use]
pub fn handlers() -> &'static [&'static dyn VersionHandler] {
    &HANDLERS
}

/// Reads the version, dispatches, and decodes.
///
/// # Errors
///
/// Returns `UnsupportedVersion` for an unknown version, or a corrupt payload
/// error if the header or body is malformed.
pub fn decode_payload(payload: &[u8]) -> Result<Manifest> {
    let version = peek_version(payload)?;
    let handler = handler_for(version)?;
    let (header, body) = Header::decode(payload)?;
    debug!(version, format = handler.label(), stamp = %header.stamp, "decoding payload");
    let manifest = handler.decode(header, body)?;
    validate_structure(&manifest)?;
    Ok(manifest)
}

/// Writes a manifest in the current format.
///
/// # Errors
///
/// Returns an error if the body cannot be encoded.
pub fn encode_payload(manifest: &Manifest, stamp: &str) -> Result<Vec<u8>> {
    let body = v8::encode(manifest)?;
    Header::new(CURRENT_VERSION, stamp).encode(&body)
}

pub(crate) fn from_msgpack<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    rmp_serde::from_slice(body).map_err(|e| Error::serialization(e.to_string()))
}

pub(crate) fn to_msgpack<T: Serialize>(body: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(body).map_err(|e| Error::serialization(e.to_string()))
}

/// Exclusion set in force before payloads recorded their own.
pub(crate) fn legacy_exclusions() -> Vec<Name> {
    ["location", "rotation", "scale"].into_iter().map(Name::from).collect()
}

pub(crate) fn default_entity() -> TypeName {
    TypeName::from(TypeRegistry::DEFAULT_ENTITY)
}

pub(crate) fn type_at(manifest_types: &[TypeName], idx: u32) -> Result<TypeName> {
    manifest_types
        .get(idx as usize)
        .cloned()
        .ok_or_else(|| Error::corrupt(format!("type index {idx} is out of range")))
}

pub(crate) fn owner_index(owner: Option<u32>) -> Option<usize> {
    owner.map(|o| o as usize)
}

pub(crate) fn kind_from_code(code: u8) -> Result<ObjectKind> {
    ObjectKind::from_code(code).ok_or_else(|| Error::corrupt(format!("unknown object kind {code}")))
}

pub(crate) fn expect_len(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::corrupt(format!(
            "{what} has {actual} entries, expected {expected}"
        )))
    }
}

/// Rejects payloads that are not a forest rooted at index 0.
fn validate_structure(manifest: &Manifest) -> Result<()> {
    let mut seen: HashSet<Guid> = HashSet::with_capacity(manifest.objects.len());
    for (i, object) in manifest.objects.iter().enumerate() {
        if !seen.insert(object.guid) {
            return Err(Error::corrupt(format!("duplicate guid {}", object.guid)));
        }
        match (i, object.owner) {
            (0, None) => {}
            (0, Some(_)) => return Err(Error::corrupt("root has an owner")),
            (_, None) => return Err(Error::corrupt(format!("object {i} has no owner"))),
            (_, Some(owner)) if owner >= i => {
                return Err(Error::corrupt(format!(
                    "object {i} is owned by later object {owner}"
                )));
            }
            (_, Some(owner)) => check_owner_kind(object, &manifest.objects[owner])?,
        }
    }
    Ok(())
}

fn check_owner_kind(object: &ManifestObject, owner: &ManifestObject) -> Result<()> {
    if object.kind == ObjectKind::Entity && owner.kind != ObjectKind::Entity {
        return Err(Error::corrupt(format!(
            "entity {} is owned by a behavior",
            object.guid
        )));
    }
    Ok(())
}
