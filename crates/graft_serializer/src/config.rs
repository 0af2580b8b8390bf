//! Serializer configuration.

use graft_foundation::Name;

/// Settings shared by save, load, and duplicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Fields left out of the root's positional behaviors.
    pub positional_fields: Vec<Name>,
    /// Opaque stamp written after the version in the header.
    pub engine_stamp: String,
    /// Report load and duplicate durations at info level.
    pub log_load_time: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            positional_fields: vec![
                Name::from("location"),
                Name::from("rotation"),
                Name::from("scale"),
            ],
            engine_stamp: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            log_load_time: false,
        }
    }
}

impl SerializerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the root positional field names.
    #[must_use]
    pub fn with_positional_fields<N: Into<Name>>(mut self, names: impl IntoIterator<Item = N>) -> Self {
        self.positional_fields = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the header stamp.
    #[must_use]
    pub fn with_engine_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.engine_stamp = stamp.into();
        self
    }

    /// Enables or disables load timing.
    #[must_use]
    pub fn with_load_time_logging(mut self, enabled: bool) -> Self {
        self.log_load_time = enabled;
        self
    }
}
