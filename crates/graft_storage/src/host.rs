//! Capabilities the serializer consumes from a host object model.
//!
//! The serializer never touches host storage directly. Everything it needs
//! is expressed by these traits, which [`crate::Scene`] implements for the
//! in-memory model.

use std::sync::Arc;

use graft_foundation::{Name, ObjectId, ResourcePath, Result, TypeName, Value};

use crate::schema::{ObjectKind, TypeSchema};

/// Structural ownership edges.
pub trait OwnershipGraph {
    /// Objects directly owned by `object`, in a stable order.
    ///
    /// Behaviors come before child entities. A missing object owns nothing.
    fn owned(&self, object: ObjectId) -> Vec<ObjectId>;
}

/// Field enumeration and access.
pub trait FieldAccessor {
    /// The schema describing `object`'s fields, in wire order.
    fn schema_of(&self, object: ObjectId) -> Option<Arc<TypeSchema>>;

    /// Current value of a field.
    fn get(&self, object: ObjectId, field: &str) -> Option<Value>;

    /// Sets a field.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is gone, the field is not declared, or
    /// the value does not fit the declared type.
    fn set(&mut self, object: ObjectId, field: &Name, value: Value) -> Result<()>;
}

/// Everything the serializer and override engine need from a host scene.
pub trait SceneHost: OwnershipGraph + FieldAccessor {
    /// Checks if a handle refers to a live object.
    fn exists(&self, object: ObjectId) -> bool;

    /// Entity or behavior.
    fn kind(&self, object: ObjectId) -> Option<ObjectKind>;

    /// The object's owner: parent entity for entities, owning object for
    /// behaviors. `None` for top-level entities.
    fn owner(&self, object: ObjectId) -> Option<ObjectId>;

    /// Display label, if any.
    fn label(&self, object: ObjectId) -> Option<String>;

    /// Sets or clears the display label.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is gone.
    fn set_label(&mut self, object: ObjectId, label: Option<String>) -> Result<()>;

    /// Looks up a registered type.
    fn type_schema(&self, name: &TypeName) -> Option<Arc<TypeSchema>>;

    /// Spawns an entity of the given type under `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or not an entity type, or the
    /// parent is gone.
    fn spawn_entity(&mut self, type_name: &TypeName, parent: Option<ObjectId>) -> Result<ObjectId>;

    /// Attaches a behavior of the given type to `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or not a behavior type, or the
    /// owner is gone.
    fn attach_behavior(&mut self, type_name: &TypeName, owner: ObjectId) -> Result<ObjectId>;

    /// Destroys an object and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is gone.
    fn destroy(&mut self, object: ObjectId) -> Result<()>;

    /// Checks whether an external resource can be resolved.
    fn resolve_resource(&self, path: &ResourcePath) -> bool;

    /// Runs post-construction logic for an entity whose fields are fully
    /// populated. Called once per loaded entity, root to leaf.
    fn post_construct(&mut self, entity: ObjectId) {
        let _ = entity;
    }

    /// Type name of a live object.
    fn type_name(&self, object: ObjectId) -> Option<TypeName> {
        self.schema_of(object).map(|s| s.name.clone())
    }
}
