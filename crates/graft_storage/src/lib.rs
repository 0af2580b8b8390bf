//! Host object model for Graft.
//!
//! This crate provides:
//! - [`TypeRegistry`] and [`TypeSchema`] - Declared fields of entity and behavior types
//! - [`ObjectArena`] - Generational object allocation
//! - [`Scene`] - In-memory entities, behaviors, and their ownership tree
//! - [`OwnershipGraph`], [`FieldAccessor`], [`SceneHost`] - The capabilities
//!   the serializer consumes from any host

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod host;
pub mod scene;
pub mod schema;

pub use arena::ObjectArena;
pub use host::{FieldAccessor, OwnershipGraph, SceneHost};
pub use scene::{ConstructHook, Scene};
pub use schema::{ObjectKind, TypeRegistry, TypeSchema};
