//! Integration tests for Layer 4: Nested instances
//!
//! Tests for the asset library, fingerprints, and the override engine as an
//! editor drives them: authoring assets, placing instances, overriding
//! fields, and picking up asset changes.

mod common;
mod levels;
mod library;
mod workflow;
