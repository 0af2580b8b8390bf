//! Object identity at the codec seam.
//!
//! The codec knows how to write a reference but not what an object's stable
//! identity is. Callers supply that through these traits: a save session maps
//! live handles to GUIDs, a load session maps GUIDs back to freshly created
//! objects, and the override engine translates through a nested instance's
//! GUID sub-map.

use graft_foundation::{Guid, ObjectId, ResourcePath};

/// How an object reference is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectEncoding {
    /// The object is in the payload; write its GUID.
    Guid(Guid),
    /// The object lives outside the payload; write its raw handle.
    Foreign,
    /// Drop the reference.
    None,
}

/// Maps live objects to their wire form.
pub trait ReferenceEncoder {
    /// Decides how a reference to `object` is written.
    fn encode_object(&mut self, object: ObjectId) -> ObjectEncoding;
}

/// Maps wire references back to live objects.
pub trait ReferenceDecoder {
    /// Finds the live object recorded under `guid`.
    fn decode_guid(&mut self, guid: Guid) -> Option<ObjectId>;

    /// Accepts or rejects a raw handle written by a foreign reference.
    fn decode_foreign(&mut self, handle: ObjectId) -> Option<ObjectId> {
        let _ = handle;
        None
    }

    /// Checks whether an external resource can be resolved.
    fn resolve_resource(&self, path: &ResourcePath) -> bool {
        let _ = path;
        true
    }
}
