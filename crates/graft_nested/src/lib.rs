//! Nested instances for Graft.
//!
//! This crate provides:
//! - [`AssetLibrary`] - Stored payloads with creation timestamps
//! - [`fingerprint`] - Content digests that change when an asset or anything
//!   it embeds is re-saved
//! - [`NestedInstanceRecord`] and [`OverrideSet`] - Per-instance bookkeeping
//! - [`OverrideEngine`] - Embedding, unpacking, staleness, and refresh
//! - [`OverrideSession`] - Override recording, revert, apply, and reconcile
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use graft_foundation::{FieldSchema, FieldType, GuidGenerator};
//! use graft_nested::{AssetLibrary, OverrideEngine};
//! use graft_serializer::{IdentityMap, LoadOptions, Serializer};
//! use graft_storage::{Scene, TypeRegistry, TypeSchema};
//!
//! let registry = TypeRegistry::new()
//!     .with(TypeSchema::behavior("Paint").with_field(FieldSchema::new("color", FieldType::String)))
//!     .unwrap();
//! let mut source = Scene::new(Arc::new(registry));
//! let root = source.spawn("Entity", None).unwrap();
//! let paint = source.attach("Paint", root).unwrap();
//! source.set_field(paint, "color", "blue").unwrap();
//! let payload = Serializer::default()
//!     .serialize(&source, root, &mut IdentityMap::new(), &mut GuidGenerator::seeded(1))
//!     .unwrap();
//!
//! let mut library = AssetLibrary::new();
//! library.store("crate", payload).unwrap();
//! let mut engine = OverrideEngine::new(library);
//!
//! let mut scene = source.scratch();
//! let instance = engine.embed(&mut scene, &"crate".into(), &LoadOptions::new(), None).unwrap();
//! let live = scene.behavior_of_type(instance, "Paint").unwrap();
//!
//! let mut session = engine.begin_session(&mut scene, instance).unwrap();
//! session.set_override(live, "color", "red".into()).unwrap();
//! assert!(session.overrides().unwrap().contains(live, "color"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod agent;
pub mod engine;
pub mod fingerprint;
pub mod library;
pub mod overrides;
pub mod record;
pub mod session;
mod transfer;

pub use engine::OverrideEngine;
pub use fingerprint::fingerprint;
pub use library::{Asset, AssetLibrary};
pub use overrides::OverrideSet;
pub use record::NestedInstanceRecord;
pub use session::{OverrideSession, ReconcileReport};
