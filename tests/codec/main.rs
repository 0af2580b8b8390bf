//! Integration tests for Layer 2: Codec
//!
//! Tests for byte primitives, reference tags, skip predicates, and
//! schema-driven field streams.

mod primitives;
mod skips;
mod streams;
