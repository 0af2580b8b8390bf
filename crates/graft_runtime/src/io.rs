//! Payload files.
//!
//! Payloads are written and read as raw bytes; reading checks the header so
//! that a stray file fails here rather than deep inside a load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use graft_foundation::{Error, ErrorKind, GuidGenerator, ObjectId, Result};
use graft_serializer::{IdentityMap, LoadOptions, LoadOutcome, Serializer, peek_version};
use graft_storage::SceneHost;
use tracing::info;

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> Error {
    Error::new(ErrorKind::Io(format!(
        "failed to {action} '{}': {e}",
        path.display()
    )))
}

/// Writes a payload to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an `Io` error if the file cannot be created or written.
pub fn save_to_file<P: AsRef<Path>>(payload: &[u8], path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| io_error("create file", path, &e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(payload)
        .map_err(|e| io_error("write to file", path, &e))?;
    writer.flush().map_err(|e| io_error("flush file", path, &e))?;
    Ok(())
}

/// Reads a payload from `path`.
///
/// # Errors
///
/// Returns an `Io` error if the file cannot be read, or `CorruptPayload` /
/// `UnsupportedVersion` if it does not start with a valid header.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error("open file", path, &e))?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| io_error("read file", path, &e))?;
    peek_version(&bytes)?;
    Ok(bytes)
}

/// Serializes the hierarchy under `root` straight to `path`.
///
/// # Errors
///
/// Returns any save error, or an `Io` error.
pub fn save_scene<H: SceneHost + ?Sized, P: AsRef<Path>>(
    serializer: &Serializer,
    host: &H,
    root: ObjectId,
    identity: &mut IdentityMap,
    generator: &mut GuidGenerator,
    path: P,
) -> Result<()> {
    let payload = serializer.serialize(host, root, identity, generator)?;
    save_to_file(&payload, path.as_ref())?;
    info!(path = %path.as_ref().display(), bytes = payload.len(), "saved payload file");
    Ok(())
}

/// Deserializes the payload at `path` into `host`.
///
/// # Errors
///
/// Returns an `Io` error, or any load error.
pub fn load_scene<H: SceneHost + ?Sized, P: AsRef<Path>>(
    serializer: &Serializer,
    host: &mut H,
    path: P,
    options: &LoadOptions,
) -> Result<LoadOutcome> {
    let payload = load_from_file(path.as_ref())?;
    serializer.deserialize(host, &payload, options)
}
