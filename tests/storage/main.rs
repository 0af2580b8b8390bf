//! Integration tests for Layer 1: Storage
//!
//! Tests for the type registry, the in-memory scene, and the host traits.

mod hooks;
mod registry;
mod scene;
