//! Integration tests for Layer 3: Serializer
//!
//! Tests for saving and loading hierarchies, identity across reloads, and
//! reading payloads written by older format versions.

mod common;
mod identity;
mod legacy;
mod loading;
