//! Runtime configuration.

use graft_foundation::{Error, ErrorKind, GuidGenerator, Result};
use graft_serializer::{Serializer, SerializerConfig};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "GRAFT_LOG";
/// Environment variable enabling load timing (`1`, `true`, `on`).
pub const LOAD_TIME_ENV: &str = "GRAFT_LOG_LOAD_TIME";
/// Environment variable seeding GUID generation.
pub const GUID_SEED_ENV: &str = "GRAFT_GUID_SEED";

/// Settings for a process using Graft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Serializer settings.
    pub serializer: SerializerConfig,
    /// `tracing` filter directives used when `GRAFT_LOG` is unset.
    pub log_filter: String,
    /// Seed for deterministic GUIDs; entropy when `None`.
    pub guid_seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            serializer: SerializerConfig::default(),
            log_filter: "warn".to_string(),
            guid_seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to something unparseable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, starting from the defaults.
    ///
    /// # Errors
    ///
    /// See [`RuntimeConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(filter) = lookup(LOG_ENV).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }
        if let Some(flag) = lookup(LOAD_TIME_ENV) {
            config.serializer.log_load_time = parse_flag(LOAD_TIME_ENV, &flag)?;
        }
        if let Some(seed) = lookup(GUID_SEED_ENV) {
            let seed = seed.trim().parse().map_err(|_| {
                Error::new(ErrorKind::Internal(format!(
                    "{GUID_SEED_ENV} must be an unsigned integer, got '{seed}'"
                )))
            })?;
            config.guid_seed = Some(seed);
        }
        Ok(config)
    }

    /// Builder method to set the serializer settings.
    #[must_use]
    pub fn with_serializer(mut self, serializer: SerializerConfig) -> Self {
        self.serializer = serializer;
        self
    }

    /// Builder method to set the default log filter.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Builder method to seed GUID generation.
    #[must_use]
    pub fn with_guid_seed(mut self, seed: u64) -> Self {
        self.guid_seed = Some(seed);
        self
    }

    /// A serializer using these settings.
    #[must_use]
    pub fn build_serializer(&self) -> Serializer {
        Serializer::new(self.serializer.clone())
    }

    /// A GUID generator, seeded if configured.
    #[must_use]
    pub fn guid_generator(&self) -> GuidGenerator {
        self.guid_seed
            .map_or_else(GuidGenerator::default, GuidGenerator::seeded)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" | "" => Ok(false),
        other => Err(Error::new(ErrorKind::Internal(format!(
            "{key} must be a boolean, got '{other}'"
        )))),
    }
}
