//! Type schemas for entities and behavior-objects.
//!
//! A [`TypeSchema`] declares the fields of one host type in wire order.
//! The serializer walks these fields in declaration order, so adding a field
//! at the end of a schema keeps older payloads loadable.

use std::collections::HashMap;
use std::sync::Arc;

use graft_foundation::{Error, ErrorKind, FieldSchema, Result, TypeName};

/// Whether a type describes entities or behavior-objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A hierarchy node.
    Entity,
    /// Field-bearing state attached to an entity or another behavior.
    Behavior,
}

impl ObjectKind {
    /// Stable wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Entity => 0,
            Self::Behavior => 1,
        }
    }

    /// Decodes a wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Entity),
            1 => Some(Self::Behavior),
            _ => None,
        }
    }

    const fn article(self) -> &'static str {
        match self {
            Self::Entity => "an entity",
            Self::Behavior => "a behavior",
        }
    }
}

/// Schema definition for an entity or behavior type.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSchema {
    /// Type name.
    pub name: TypeName,
    /// Entity or behavior.
    pub kind: ObjectKind,
    /// Field definitions in wire order.
    pub fields: Vec<FieldSchema>,
    /// Carries the local offset/orientation/scale of its entity.
    pub positional: bool,
}

impl TypeSchema {
    /// Creates an entity type schema.
    #[must_use]
    pub fn entity(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Entity,
            fields: Vec::new(),
            positional: false,
        }
    }

    /// Creates a behavior type schema.
    #[must_use]
    pub fn behavior(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Behavior,
            fields: Vec::new(),
            positional: false,
        }
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Marks the type as scene-positional.
    #[must_use]
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    /// Returns the field schema by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }
}

/// Registry of every type the host can instantiate.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    types: HashMap<TypeName, Arc<TypeSchema>>,
}

impl TypeRegistry {
    /// Type used for entities in payloads that predate typed entities.
    pub const DEFAULT_ENTITY: &'static str = "Entity";

    /// Creates a registry holding only the default entity type.
    #[must_use]
    pub fn new() -> Self {
        let mut types = HashMap::new();
        let default = TypeSchema::entity(Self::DEFAULT_ENTITY);
        types.insert(default.name.clone(), Arc::new(default));
        Self { types }
    }

    /// Registers a type.
    ///
    /// Registering a name twice replaces the earlier schema, except that the
    /// default entity type must stay an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the default entity name is re-registered as a
    /// behavior.
    pub fn register(&mut self, schema: TypeSchema) -> Result<()> {
        if schema.name.as_str() == Self::DEFAULT_ENTITY && schema.kind != ObjectKind::Entity {
            return Err(Error::new(ErrorKind::KindMismatch {
                type_name: schema.name,
                expected: ObjectKind::Entity.article().into(),
            }));
        }
        self.types.insert(schema.name.clone(), Arc::new(schema));
        Ok(())
    }

    /// Builder-style registration.
    ///
    /// # Errors
    ///
    /// See [`TypeRegistry::register`].
    pub fn with(mut self, schema: TypeSchema) -> Result<Self> {
        self.register(schema)?;
        Ok(self)
    }

    /// Looks up a type.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<TypeSchema>> {
        self.types.get(name)
    }

    /// Looks up a type and checks its kind.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the name is not registered, or
    /// `KindMismatch` if it is registered with the other kind.
    pub fn expect_kind(&self, name: &TypeName, kind: ObjectKind) -> Result<Arc<TypeSchema>> {
        let schema = self
            .types
            .get(name)
            .ok_or_else(|| Error::unknown_type(name.clone()))?;
        if schema.kind != kind {
            return Err(Error::new(ErrorKind::KindMismatch {
                type_name: name.clone(),
                expected: kind.article().into(),
            }));
        }
        Ok(Arc::clone(schema))
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if only the default entity type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
