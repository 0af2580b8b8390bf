//! Graft - Versioned object-graph serialization
//!
//! This crate re-exports all layers of the Graft system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: graft_runtime     - File I/O, configuration, logging, inspect CLI
//! Layer 4: graft_nested      - Asset library, fingerprints, override engine
//! Layer 3: graft_serializer  - Walker, identity map, versioned payloads
//! Layer 2: graft_codec       - Tagged field streams, skip predicates
//! Layer 1: graft_storage     - Type registry, scene, host traits
//! Layer 0: graft_foundation  - Core types (Guid, ObjectId, Value, Error)
//! ```

pub use graft_codec as codec;
pub use graft_foundation as foundation;
pub use graft_nested as nested;
pub use graft_runtime as runtime;
pub use graft_serializer as serializer;
pub use graft_storage as storage;
