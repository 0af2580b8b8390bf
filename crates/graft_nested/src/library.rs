//! In-memory asset store.
//!
//! Each stored payload gets a creation timestamp that is strictly later than
//! every timestamp handed out before it, even when the wall clock stalls or
//! steps backwards. Fingerprints are computed from these timestamps.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use graft_foundation::{Error, ErrorKind, ResourcePath, Result};
use graft_serializer::decode_payload;
use tracing::debug;

/// A stored payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    /// Where the asset lives.
    pub path: ResourcePath,
    /// Encoded hierarchy.
    pub payload: Vec<u8>,
    /// When this revision was stored.
    pub created: DateTime<Utc>,
    /// Assets this one embeds directly, from its nested table.
    pub embeds: Vec<ResourcePath>,
}

/// Assets by path.
#[derive(Clone, Debug, Default)]
pub struct AssetLibrary {
    assets: BTreeMap<ResourcePath, Asset>,
    last_stamp: Option<DateTime<Utc>>,
}

impl AssetLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a payload, replacing any previous revision at `path`.
    ///
    /// Returns the creation timestamp of the new revision.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be decoded.
    pub fn store(&mut self, path: impl Into<ResourcePath>, payload: Vec<u8>) -> Result<DateTime<Utc>> {
        let path = path.into();
        let manifest = decode_payload(&payload)?;
        let mut embeds: Vec<ResourcePath> = manifest.nested.iter().map(|n| n.asset.clone()).collect();
        embeds.sort();
        embeds.dedup();

        let created = self.next_stamp();
        debug!(asset = %path, embeds = embeds.len(), created = %created, "stored asset");
        self.assets.insert(
            path.clone(),
            Asset {
                path,
                payload,
                created,
                embeds,
            },
        );
        Ok(created)
    }

    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    /// Looks up an asset.
    #[must_use]
    pub fn get(&self, path: &ResourcePath) -> Option<&Asset> {
        self.assets.get(path)
    }

    /// Looks up an asset.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound` if nothing is stored at `path`.
    pub fn require(&self, path: &ResourcePath) -> Result<&Asset> {
        self.get(path)
            .ok_or_else(|| Error::new(ErrorKind::AssetNotFound(path.clone())))
    }

    /// Returns true if an asset is stored at `path`.
    #[must_use]
    pub fn contains(&self, path: &ResourcePath) -> bool {
        self.assets.contains_key(path)
    }

    /// Creation time of the current revision.
    #[must_use]
    pub fn created_at(&self, path: &ResourcePath) -> Option<DateTime<Utc>> {
        self.assets.get(path).map(|a| a.created)
    }

    /// Removes an asset.
    pub fn remove(&mut self, path: &ResourcePath) -> Option<Asset> {
        self.assets.remove(path)
    }

    /// Stored paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &ResourcePath> {
        self.assets.keys()
    }

    /// Number of stored assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// `path` and every asset it embeds, transitively, each once.
    ///
    /// Embedded paths that are not stored are left out.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound` if `path` itself is not stored.
    pub fn closure(&self, path: &ResourcePath) -> Result<Vec<&Asset>> {
        let root = self.require(path)?;
        let mut seen = vec![root];
        let mut stack: Vec<&ResourcePath> = root.embeds.iter().rev().collect();
        while let Some(next) = stack.pop() {
            if seen.iter().any(|a| &a.path == next) {
                continue;
            }
            match self.get(next) {
                Some(asset) => {
                    stack.extend(asset.embeds.iter().rev());
                    seen.push(asset);
                }
                None => debug!(asset = %next, "embedded asset is not stored"),
            }
        }
        Ok(seen)
    }

    /// Returns true if `from` is `target` or embeds it, transitively.
    #[must_use]
    pub fn embeds_transitively(&self, from: &ResourcePath, target: &ResourcePath) -> bool {
        from == target
            || self
                .closure(from)
                .is_ok_and(|assets| assets.iter().any(|a| &a.path == target))
    }
}
