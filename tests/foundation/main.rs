//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Guid, Value, FieldType, ReferenceTables, and Error.

mod errors;
mod guids;
mod tables;
mod values;
