//! Object-graph serialization for Graft.
//!
//! This crate provides:
//! - [`Serializer`] - Save a hierarchy to a payload and load it back
//! - [`DuplicateSession`] - Prepare once, instantiate many copies
//! - [`IdentityMap`] - GUID ↔ live object bindings that survive reloads
//! - [`LoadOptions`] and [`LoadOutcome`] - Placement, substitution, reuse, diagnostics
//! - [`versions`] - Readers for every payload version from 2 to 8
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use graft_foundation::{FieldSchema, FieldType, GuidGenerator};
//! use graft_serializer::{IdentityMap, LoadOptions, Serializer};
//! use graft_storage::{Scene, TypeRegistry, TypeSchema};
//!
//! let registry = TypeRegistry::new()
//!     .with(TypeSchema::behavior("Health").with_field(FieldSchema::new("hp", FieldType::Int)))
//!     .unwrap();
//! let mut scene = Scene::new(Arc::new(registry));
//! let root = scene.spawn("Entity", None).unwrap();
//! let health = scene.attach("Health", root).unwrap();
//! scene.set_field(health, "hp", 7).unwrap();
//!
//! let serializer = Serializer::default();
//! let mut identity = IdentityMap::new();
//! let payload = serializer
//!     .serialize(&scene, root, &mut identity, &mut GuidGenerator::seeded(1))
//!     .unwrap();
//!
//! let loaded = serializer.deserialize(&mut scene, &payload, &LoadOptions::new()).unwrap();
//! let copy = scene.behaviors(loaded.root)[0];
//! assert_eq!(scene.field(copy, "hp").and_then(|v| v.as_int()), Some(7));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod duplicate;
pub mod header;
pub mod identity;
pub mod load;
pub mod manifest;
mod save;
pub mod serializer;
pub mod versions;
pub mod walker;

pub use config::SerializerConfig;
pub use duplicate::DuplicateSession;
pub use header::{Header, MAGIC, peek_version};
pub use identity::IdentityMap;
pub use load::{LoadOptions, LoadOutcome, Placement};
pub use manifest::{Manifest, ManifestObject, NestedEntry, NestedLink};
pub use serializer::Serializer;
pub use versions::{CURRENT_VERSION, OLDEST_VERSION, decode_payload, encode_payload};
pub use walker::discover;
