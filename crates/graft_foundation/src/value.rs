//! Field values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::collections::{LtMap, LtVec};
use crate::id::ObjectId;
use crate::name::{Name, ResourcePath, TypeName};

/// A field value as read from or written to a live object.
///
/// Values are cheaply cloneable; aggregates use structural sharing.
#[derive(Clone)]
pub enum Value {
    /// Absence of a value, and the "none" reference.
    Nil,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String.
    String(Arc<str>),
    /// Interned name.
    Name(Name),
    /// Ordered list.
    List(LtVec<Value>),
    /// Ordered map.
    Map(LtMap<Value, Value>),
    /// Fixed-size record keyed by field name.
    Record(LtMap<Name, Value>),
    /// Reference to something outside the value itself.
    Ref(Reference),
}

/// A reference held in a field.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reference {
    /// A standalone resource outside any payload.
    Resource(ResourcePath),
    /// A type descriptor.
    Type(TypeName),
    /// A live object in the same scene.
    Object(ObjectId),
    /// A named member of a type.
    Member {
        /// Type declaring the member.
        owner: TypeName,
        /// Member name.
        member: Name,
    },
}

impl Value {
    /// Creates an object reference.
    #[must_use]
    pub const fn object(id: ObjectId) -> Self {
        Self::Ref(Reference::Object(id))
    }

    /// Creates a resource reference.
    #[must_use]
    pub fn resource(path: impl Into<ResourcePath>) -> Self {
        Self::Ref(Reference::Resource(path.into()))
    }

    /// Creates a type-descriptor reference.
    #[must_use]
    pub fn type_ref(name: impl Into<TypeName>) -> Self {
        Self::Ref(Reference::Type(name.into()))
    }

    /// Creates a record from name/value pairs.
    #[must_use]
    pub fn record<N: Into<Name>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Self::Record(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    /// Returns true if this value is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Attempts to extract a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a float.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a record.
    #[must_use]
    pub const fn as_record(&self) -> Option<&LtMap<Name, Value>> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Attempts to extract a list.
    #[must_use]
    pub const fn as_list(&self) -> Option<&LtVec<Value>> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to extract a referenced object.
    #[must_use]
    pub const fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Ref(Reference::Object(id)) => Some(*id),
            _ => None,
        }
    }

    /// Visits every object handle held anywhere inside this value.
    pub fn for_each_object(&self, f: &mut impl FnMut(ObjectId)) {
        match self {
            Self::Ref(Reference::Object(id)) => f(*id),
            Self::List(items) => items.iter().for_each(|v| v.for_each_object(f)),
            Self::Map(entries) => {
                for (k, v) in entries.iter() {
                    k.for_each_object(f);
                    v.for_each_object(f);
                }
            }
            Self::Record(fields) => fields.values().for_each(|v| v.for_each_object(f)),
            _ => {}
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Nil => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Float(_) => 3,
            Self::String(_) => 4,
            Self::Name(_) => 5,
            Self::List(_) => 6,
            Self::Map(_) => 7,
            Self::Record(_) => 8,
            Self::Ref(_) => 9,
        }
    }
}

// Floats compare by bit pattern so that Eq, Hash, and Ord agree.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Nil => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Float(n) => n.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::Name(n) => n.hash(state),
            Self::List(v) => v.hash(state),
            Self::Map(m) => m.hash(state),
            Self::Record(r) => r.hash(state),
            Self::Ref(r) => r.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Nil, Self::Nil) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Name(a), Self::Name(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => a.cmp(b),
            (Self::Map(a), Self::Map(b)) => a.cmp(b),
            (Self::Record(a), Self::Record(b)) => a.cmp(b),
            (Self::Ref(a), Self::Ref(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Name(n) => write!(f, ":{n}"),
            Self::List(v) => write!(f, "{v:?}"),
            Self::Map(m) => write!(f, "{m:?}"),
            Self::Record(r) => write!(f, "{r:?}"),
            Self::Ref(r) => write!(f, "{r:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Name(n) => write!(f, ":{n}"),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k} {v}")?;
                }
                write!(f, "}}")
            }
            Self::Record(r) => {
                write!(f, "(")?;
                for (i, (k, v)) in r.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, ")")
            }
            Self::Ref(r) => write!(f, "{r}"),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(path) => write!(f, "resource {path}"),
            Self::Type(name) => write!(f, "type {name}"),
            Self::Object(id) => write!(f, "{id}"),
            Self::Member { owner, member } => write!(f, "{owner}::{member}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Name> for Value {
    fn from(n: Name) -> Self {
        Self::Name(n)
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Self::Ref(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}
