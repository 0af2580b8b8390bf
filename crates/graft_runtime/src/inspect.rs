//! Raw payload inspection.
//!
//! Summarizes a payload without a host: nothing is instantiated, so
//! payloads naming types the current process does not know can still be
//! examined.

use std::collections::BTreeMap;
use std::fmt;

use graft_foundation::{Name, ResourcePath, Result, TypeName};
use graft_serializer::{NestedEntry, decode_payload};
use graft_storage::ObjectKind;

/// What a payload holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadSummary {
    /// Format version from the header.
    pub version: u16,
    /// Header stamp.
    pub stamp: String,
    /// Resource table.
    pub resources: Vec<ResourcePath>,
    /// Type table.
    pub types: Vec<TypeName>,
    /// Name table.
    pub names: Vec<Name>,
    /// Number of entities.
    pub entities: usize,
    /// Number of behaviors.
    pub behaviors: usize,
    /// Object count per type.
    pub by_type: BTreeMap<TypeName, usize>,
    /// Labels in payload order.
    pub labels: Vec<String>,
    /// Nested-instance table.
    pub nested: Vec<NestedEntry>,
}

impl PayloadSummary {
    /// Total number of objects.
    #[must_use]
    pub fn objects(&self) -> usize {
        self.entities + self.behaviors
    }
}

/// Decodes `payload` far enough to summarize it.
///
/// # Errors
///
/// Returns the same errors as a load would for a malformed payload.
pub fn inspect(payload: &[u8]) -> Result<PayloadSummary> {
    let manifest = decode_payload(payload)?;
    let mut by_type = BTreeMap::new();
    let mut entities = 0;
    let mut behaviors = 0;
    for object in &manifest.objects {
        *by_type.entry(object.type_name.clone()).or_insert(0) += 1;
        match object.kind {
            ObjectKind::Entity => entities += 1,
            ObjectKind::Behavior => behaviors += 1,
        }
    }
    Ok(PayloadSummary {
        version: manifest.version,
        stamp: manifest.stamp.clone(),
        resources: manifest.tables.resources().to_vec(),
        types: manifest.tables.types().to_vec(),
        names: manifest.tables.names().to_vec(),
        entities,
        behaviors,
        by_type,
        labels: manifest.objects.iter().filter_map(|o| o.label.clone()).collect(),
        nested: manifest.nested,
    })
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, title: &str, items: &[T]) -> fmt::Result {
    writeln!(f, "{title} ({}):", items.len())?;
    for (i, item) in items.iter().enumerate() {
        writeln!(f, "  [{i}] {item}")?;
    }
    Ok(())
}

impl fmt::Display for PayloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "stamp: {}", self.stamp)?;
        write_list(f, "resources", &self.resources)?;
        write_list(f, "types", &self.types)?;
        write_list(f, "names", &self.names)?;
        writeln!(
            f,
            "objects: {} ({} entities, {} behaviors)",
            self.objects(),
            self.entities,
            self.behaviors
        )?;
        for (type_name, count) in &self.by_type {
            writeln!(f, "  {type_name}: {count}")?;
        }
        if !self.labels.is_empty() {
            writeln!(f, "labels: {}", self.labels.join(", "))?;
        }
        writeln!(f, "nested ({}):", self.nested.len())?;
        for entry in &self.nested {
            let overrides: usize = entry.overrides.iter().map(|(_, fields)| fields.len()).sum();
            writeln!(
                f,
                "  {} at {}: {} members, {} overrides, auto-update {}, fingerprint {}",
                entry.asset,
                entry.root,
                entry.members.len(),
                overrides,
                if entry.auto_update { "on" } else { "off" },
                entry.fingerprint.as_deref().unwrap_or("-"),
            )?;
        }
        Ok(())
    }
}
