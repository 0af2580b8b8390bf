//! Structural duplication without storage.
//!
//! A [`DuplicateSession`] holds the encoded form of a subtree. Each call to
//! [`DuplicateSession::instantiate`] materializes a fresh copy from it, so
//! repeated copies skip discovery and encoding.

use std::time::Instant;

use graft_foundation::{ObjectId, Result};
use graft_storage::SceneHost;
use tracing::info;

use crate::config::SerializerConfig;
use crate::identity::IdentityMap;
use crate::load::{LoadOptions, LoadOutcome, materialize};
use crate::manifest::Manifest;

/// A prepared subtree, ready to be instantiated any number of times.
#[derive(Clone, Debug)]
pub struct DuplicateSession {
    source_root: ObjectId,
    manifest: Manifest,
    source_identity: IdentityMap,
    config: SerializerConfig,
    allow_foreign: bool,
    instantiated: usize,
}

impl DuplicateSession {
    pub(crate) fn new(
        source_root: ObjectId,
        manifest: Manifest,
        source_identity: IdentityMap,
        config: SerializerConfig,
        allow_foreign: bool,
    ) -> Self {
        Self {
            source_root,
            manifest,
            source_identity,
            config,
            allow_foreign,
            instantiated: 0,
        }
    }

    /// The object the session was prepared from.
    #[must_use]
    pub fn source_root(&self) -> ObjectId {
        self.source_root
    }

    /// The encoded subtree.
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Session GUID ↔ source object.
    #[must_use]
    pub fn source_identity(&self) -> &IdentityMap {
        &self.source_identity
    }

    /// How many copies have been made.
    #[must_use]
    pub fn instantiated(&self) -> usize {
        self.instantiated
    }

    /// Makes a copy.
    ///
    /// The returned identity maps session GUIDs to the new objects. It is
    /// fresh for every call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRoot` if the parent is gone or the root cannot be
    /// created. Any error after creation starts leaves a partial copy.
    pub fn instantiate<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        options: &LoadOptions,
    ) -> Result<LoadOutcome> {
        let started = Instant::now();
        let outcome = materialize(host, &self.manifest, options, &self.config, self.allow_foreign)?;
        self.instantiated += 1;
        if self.config.log_load_time {
            info!(
                source = %self.source_root,
                copy = %outcome.root,
                elapsed_us = started.elapsed().as_micros(),
                "duplicate time"
            );
        }
        Ok(outcome)
    }
}
