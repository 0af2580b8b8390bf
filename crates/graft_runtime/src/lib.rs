//! Process-level plumbing for Graft.
//!
//! This crate provides:
//! - [`RuntimeConfig`] - Serializer settings, log filter, and GUID seed, with
//!   environment overrides
//! - [`logging`] - `tracing` subscriber installation
//! - [`io`] - Payload files
//! - [`inspect`] - Host-free payload summaries, as printed by `graft inspect`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod inspect;
pub mod io;
pub mod logging;

pub use config::RuntimeConfig;
pub use inspect::{PayloadSummary, inspect};
pub use io::{load_from_file, load_scene, save_scene, save_to_file};
