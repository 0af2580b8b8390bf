//! Declared field types.
//!
//! The wire codec is type-directed: it never writes a value's type into the
//! stream, so the declared [`FieldType`] of each field is what tells the
//! reader how many bytes to consume.

use std::fmt;
use std::sync::Arc;

use crate::collections::{LtMap, LtVec};
use crate::name::{Name, TypeName};
use crate::value::Value;

/// Declared type of a field.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// UTF-8 string, written inline.
    String,
    /// Interned name, written as a table index.
    Name,
    /// Homogeneous ordered list.
    List(Box<FieldType>),
    /// Homogeneous ordered map.
    Map(Box<FieldType>, Box<FieldType>),
    /// Fixed-size record with its own field layout.
    Record(Arc<RecordSchema>),
    /// Tagged reference (resource, type, object, member, or none).
    Reference,
}

impl FieldType {
    /// Creates a list type.
    #[must_use]
    pub fn list(element: FieldType) -> Self {
        Self::List(Box::new(element))
    }

    /// Creates a map type.
    #[must_use]
    pub fn map(key: FieldType, value: FieldType) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Creates a record type.
    #[must_use]
    pub fn record(schema: RecordSchema) -> Self {
        Self::Record(Arc::new(schema))
    }

    /// Returns the zero value for this type.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::String("".into()),
            Self::Name => Value::Name(Name::from("")),
            Self::List(_) => Value::List(LtVec::new()),
            Self::Map(_, _) => Value::Map(LtMap::new()),
            Self::Record(schema) => Value::Record(schema.default_record()),
            Self::Reference => Value::Nil,
        }
    }

    /// Checks whether a value has the shape this type expects.
    ///
    /// Only the outer shape is checked; element types are checked as the
    /// codec recurses.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Bool, Value::Bool(_))
                | (Self::Int, Value::Int(_))
                | (Self::Float, Value::Float(_))
                | (Self::String, Value::String(_))
                | (Self::Name, Value::Name(_))
                | (Self::List(_), Value::List(_))
                | (Self::Map(_, _), Value::Map(_))
                | (Self::Record(_), Value::Record(_))
                | (Self::Reference, Value::Nil | Value::Ref(_))
        )
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Name => write!(f, "name"),
            Self::List(elem) => write!(f, "list<{elem}>"),
            Self::Map(k, v) => write!(f, "map<{k}, {v}>"),
            Self::Record(schema) => write!(f, "record {}", schema.name),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// Per-field flags consulted by skip predicates and the override engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldFlags {
    /// Runtime-only state that is never persisted.
    pub transient: bool,
    /// Callback binding; never persisted.
    pub delegate: bool,
    /// The referenced object is owned inline by the field's owner and may be
    /// created on demand when no counterpart exists.
    pub instanced: bool,
}

/// Schema for a single field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldSchema {
    /// Field name.
    pub name: Name,
    /// Declared type.
    pub ty: FieldType,
    /// Flags.
    pub flags: FieldFlags,
    /// Explicit default, if different from the type's zero value.
    pub default: Option<Value>,
}

impl FieldSchema {
    /// Creates a field with no flags.
    #[must_use]
    pub fn new(name: impl Into<Name>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            flags: FieldFlags::default(),
            default: None,
        }
    }

    /// Marks the field as transient.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.flags.transient = true;
        self
    }

    /// Marks the field as a delegate binding.
    #[must_use]
    pub fn delegate(mut self) -> Self {
        self.flags.delegate = true;
        self
    }

    /// Marks the field as holding an inline-owned sub-object.
    #[must_use]
    pub fn instanced(mut self) -> Self {
        self.flags.instanced = true;
        self
    }

    /// Sets an explicit default value.
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Returns the value a freshly created object holds for this field.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.ty.default_value())
    }

    /// Returns true if the field is never persisted.
    #[must_use]
    pub const fn is_runtime_only(&self) -> bool {
        self.flags.transient || self.flags.delegate
    }
}

/// Layout of a fixed-size record value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordSchema {
    /// Record type name.
    pub name: TypeName,
    /// Fields in wire order.
    pub fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Creates an empty record schema.
    #[must_use]
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }

    /// Returns a record value holding every field's default.
    #[must_use]
    pub fn default_record(&self) -> LtMap<Name, Value> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.default_value()))
            .collect()
    }
}
