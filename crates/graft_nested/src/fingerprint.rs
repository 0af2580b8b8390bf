//! Content fingerprints.
//!
//! A fingerprint digests the creation timestamps of an asset and of every
//! asset it embeds, transitively. Re-saving any of them changes the
//! fingerprint of everything that embeds it.

use chrono::SecondsFormat;
use graft_foundation::{ResourcePath, Result};
use sha2::{Digest, Sha256};

use crate::library::AssetLibrary;

/// Computes the fingerprint of `asset`.
///
/// Timestamps are sorted newest first and concatenated in RFC 3339 form
/// before hashing with SHA-256. The result is lowercase hex.
///
/// # Errors
///
/// Returns `AssetNotFound` if `asset` is not stored.
pub fn fingerprint(library: &AssetLibrary, asset: &ResourcePath) -> Result<String> {
    let mut stamps: Vec<_> = library.closure(asset)?.iter().map(|a| a.created).collect();
    stamps.sort_unstable_by(|a, b| b.cmp(a));

    let mut hasher = Sha256::new();
    for stamp in stamps {
        hasher.update(stamp.to_rfc3339_opts(SecondsFormat::Micros, true).as_bytes());
    }
    Ok(hex::encode(hasher.finalize()))
}
