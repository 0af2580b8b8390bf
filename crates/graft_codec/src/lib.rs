//! Tagged wire codec for Graft.
//!
//! This crate provides:
//! - [`ByteWriter`] and [`ByteReader`] - Little-endian primitives
//! - [`ReferenceTag`] - The one-byte prefix of every reference value
//! - [`ValueWriter`] and [`ValueReader`] - Schema-driven field streams
//! - [`SkipPredicate`], [`StandardSkip`], [`OverrideFilter`] - Field selection
//! - [`ReferenceEncoder`] and [`ReferenceDecoder`] - Object identity at the codec seam
//!
//! Field streams carry no field names. The caller feeds fields in schema
//! order and reads them back in the same order.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bytes;
pub mod reader;
pub mod refs;
pub mod skip;
pub mod tag;
pub mod writer;

pub use bytes::{ByteReader, ByteWriter};
pub use reader::{FieldRead, ValueReader};
pub use refs::{ObjectEncoding, ReferenceDecoder, ReferenceEncoder};
pub use skip::{OverrideFilter, SkipContext, SkipPredicate, StandardSkip};
pub use tag::ReferenceTag;
pub use writer::ValueWriter;
