//! Identifiers, values, field types, and reference tables for Graft.
//!
//! This crate provides:
//! - [`Guid`] and [`GuidGenerator`] - Stable object identity across save/load
//! - [`ObjectId`] - Generational handles to live objects
//! - [`Value`] and [`Reference`] - Field values as they flow through the codec
//! - [`FieldType`] and [`FieldSchema`] - Declared field types used to drive encoding
//! - [`ReferenceTables`] - Per-session interned resources, types, and names
//! - [`Error`] and [`Diagnostic`] - Fatal errors and non-fatal load diagnostics

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod guid;
pub mod id;
pub mod name;
pub mod tables;
pub mod types;
pub mod value;

pub use collections::{LtMap, LtVec};
pub use error::{Diagnostic, Error, ErrorContext, ErrorKind, Result};
pub use guid::{Guid, GuidGenerator};
pub use id::ObjectId;
pub use name::{Name, ResourcePath, TypeName};
pub use tables::ReferenceTables;
pub use types::{FieldFlags, FieldSchema, FieldType, RecordSchema};
pub use value::{Reference, Value};
