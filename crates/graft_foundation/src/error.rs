//! Error types for Graft.
//!
//! Fatal conditions are returned as [`Error`]. Conditions that are isolated
//! to a single field or override entry are reported as [`Diagnostic`]s so
//! that the surrounding load can continue.

use std::fmt;

use thiserror::Error;

use crate::guid::Guid;
use crate::id::ObjectId;
use crate::name::{Name, ResourcePath, TypeName};

/// Result alias used throughout Graft.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Graft operations.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an invalid root error.
    #[must_use]
    pub fn invalid_root(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRoot(reason.into()))
    }

    /// Creates a structural cycle error.
    #[must_use]
    pub fn structural_cycle(object: ObjectId) -> Self {
        Self::new(ErrorKind::StructuralCycle(object))
    }

    /// Creates an unsupported version error.
    #[must_use]
    pub fn unsupported_version(version: u16) -> Self {
        Self::new(ErrorKind::UnsupportedVersion(version))
    }

    /// Creates an object not found error.
    #[must_use]
    pub fn object_not_found(id: ObjectId) -> Self {
        Self::new(ErrorKind::ObjectNotFound(id))
    }

    /// Creates an unknown type error.
    #[must_use]
    pub fn unknown_type(name: TypeName) -> Self {
        Self::new(ErrorKind::UnknownType(name))
    }

    /// Creates a field not found error.
    #[must_use]
    pub fn field_not_found(type_name: TypeName, field: Name) -> Self {
        Self::new(ErrorKind::FieldNotFound { type_name, field })
    }

    /// Creates a corrupt payload error.
    #[must_use]
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::CorruptPayload(reason.into()))
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(reason.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(reason.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Root is missing or cannot be serialized from.
    #[error("invalid root: {0}")]
    InvalidRoot(String),

    /// Ownership is not a forest.
    #[error("ownership cycle through {0:?}")]
    StructuralCycle(ObjectId),

    /// An object reference names a GUID with no created object.
    #[error("unresolved object reference {0}")]
    UnresolvedReference(Guid),

    /// Stored format version is outside the known dispatch range.
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u16),

    /// An external resource could not be resolved by the host.
    #[error("missing external resource: {0}")]
    MissingExternalResource(ResourcePath),

    /// An override names an object or field that no longer exists.
    #[error("stale override target {object:?}.{field}")]
    StaleOverrideTarget {
        /// The override's object.
        object: ObjectId,
        /// The override's field.
        field: Name,
    },

    /// Live object does not exist.
    #[error("object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    /// Type is not registered with the host.
    #[error("unknown type: {0}")]
    UnknownType(TypeName),

    /// Type is registered with a different object kind than requested.
    #[error("{type_name} is not {expected} type")]
    KindMismatch {
        /// The requested type.
        type_name: TypeName,
        /// Expected kind, rendered with an article ("an entity").
        expected: String,
    },

    /// Field is not declared on the type.
    #[error("field not found: {field} on {type_name}")]
    FieldNotFound {
        /// The queried type.
        type_name: TypeName,
        /// The missing field.
        field: Name,
    },

    /// Value does not have the declared shape.
    #[error("type mismatch on {field}: expected {expected}")]
    TypeMismatch {
        /// Field being written.
        field: Name,
        /// Declared type, rendered.
        expected: String,
    },

    /// Object is not part of any nested instance.
    #[error("object {0:?} is not inside a nested instance")]
    NotNested(ObjectId),

    /// Embedding would make an asset contain itself.
    #[error("nesting {0} would create a cycle")]
    NestedCycle(ResourcePath),

    /// Asset is not present in the library.
    #[error("asset not found: {0}")]
    AssetNotFound(ResourcePath),

    /// Payload bytes are malformed.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// Container encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Returns true for kinds a caller should surface to a user as an
    /// actionable message rather than only logging.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedVersion(_) | Self::MissingExternalResource(_)
        )
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// GUID of the object being processed.
    pub object: Option<Guid>,
    /// Field being processed.
    pub field: Option<Name>,
    /// Asset being processed.
    pub asset: Option<ResourcePath>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the object GUID.
    #[must_use]
    pub fn with_object(mut self, guid: Guid) -> Self {
        self.object = Some(guid);
        self
    }

    /// Sets the field name.
    #[must_use]
    pub fn with_field(mut self, field: Name) -> Self {
        self.field = Some(field);
        self
    }

    /// Sets the asset path.
    #[must_use]
    pub fn with_asset(mut self, asset: ResourcePath) -> Self {
        self.asset = Some(asset);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(asset) = &self.asset {
            write!(f, "in {asset}")?;
            sep = " ";
        }
        if let Some(object) = &self.object {
            write!(f, "{sep}at {object}")?;
            sep = " ";
        }
        if let Some(field) = &self.field {
            write!(f, "{sep}field {field}")?;
        }
        Ok(())
    }
}

/// A non-fatal condition recorded during a load, duplicate, or reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: ErrorKind,
    /// GUID of the affected object, when known.
    pub object: Option<Guid>,
    /// Affected field, when known.
    pub field: Option<Name>,
}

impl Diagnostic {
    /// Creates a diagnostic without location.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            object: None,
            field: None,
        }
    }

    /// Sets the affected object.
    #[must_use]
    pub fn at(mut self, object: Option<Guid>) -> Self {
        self.object = object;
        self
    }

    /// Sets the affected field.
    #[must_use]
    pub fn on_field(mut self, field: Name) -> Self {
        self.field = Some(field);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(object) = &self.object {
            write!(f, " (object {object}")?;
            if let Some(field) = &self.field {
                write!(f, ", field {field}")?;
            }
            write!(f, ")")?;
        } else if let Some(field) = &self.field {
            write!(f, " (field {field})")?;
        }
        Ok(())
    }
}
