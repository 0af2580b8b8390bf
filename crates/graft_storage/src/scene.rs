//! In-memory scene: entities, behavior-objects, and their ownership tree.
//!
//! `Scene` is the reference host for the serializer. It keeps ownership as a
//! forest: every object has at most one owner, and re-parenting refuses to
//! create a cycle.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use graft_foundation::{Error, ErrorKind, LtMap, Name, ObjectId, ResourcePath, Result, TypeName, Value};

use crate::arena::ObjectArena;
use crate::host::{FieldAccessor, OwnershipGraph, SceneHost};
use crate::schema::{ObjectKind, TypeRegistry, TypeSchema};

/// Hook run after an object's fields have been populated by a load.
pub type ConstructHook = fn(&mut Scene, ObjectId);

#[derive(Clone, Debug)]
struct Node {
    schema: Arc<TypeSchema>,
    owner: Option<ObjectId>,
    behaviors: Vec<ObjectId>,
    children: Vec<ObjectId>,
    fields: LtMap<Name, Value>,
    label: Option<String>,
}

impl Node {
    fn new(schema: Arc<TypeSchema>, owner: Option<ObjectId>) -> Self {
        let fields = schema
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.default_value()))
            .collect();
        Self {
            schema,
            owner,
            behaviors: Vec::new(),
            children: Vec::new(),
            fields,
            label: None,
        }
    }
}

/// A mutable scene of live objects.
#[derive(Clone)]
pub struct Scene {
    registry: Arc<TypeRegistry>,
    objects: ObjectArena<Node>,
    roots: Vec<ObjectId>,
    resources: HashSet<ResourcePath>,
    hooks: HashMap<TypeName, ConstructHook>,
}

impl Scene {
    /// Creates an empty scene over a type registry.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            objects: ObjectArena::new(),
            roots: Vec::new(),
            resources: HashSet::new(),
            hooks: HashMap::new(),
        }
    }

    /// An empty scene sharing this scene's registry and resource catalog.
    ///
    /// Construct hooks are not carried over.
    #[must_use]
    pub fn scratch(&self) -> Self {
        Self {
            resources: self.resources.clone(),
            ..Self::new(Arc::clone(&self.registry))
        }
    }

    /// The registry this scene instantiates from.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the scene holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Top-level entities in creation order.
    #[must_use]
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Registers a resource the scene can resolve.
    pub fn register_resource(&mut self, path: impl Into<ResourcePath>) {
        self.resources.insert(path.into());
    }

    /// Registers a post-construction hook for a type.
    pub fn on_construct(&mut self, type_name: impl Into<TypeName>, hook: ConstructHook) {
        self.hooks.insert(type_name.into(), hook);
    }

    /// Spawns an entity.
    ///
    /// # Errors
    ///
    /// See [`SceneHost::spawn_entity`].
    pub fn spawn(&mut self, type_name: &str, parent: Option<ObjectId>) -> Result<ObjectId> {
        self.spawn_entity(&TypeName::from(type_name), parent)
    }

    /// Attaches a behavior.
    ///
    /// # Errors
    ///
    /// See [`SceneHost::attach_behavior`].
    pub fn attach(&mut self, type_name: &str, owner: ObjectId) -> Result<ObjectId> {
        self.attach_behavior(&TypeName::from(type_name), owner)
    }

    /// Child entities of an entity.
    #[must_use]
    pub fn children(&self, entity: ObjectId) -> &[ObjectId] {
        self.objects.get(entity).map_or(&[], |n| n.children.as_slice())
    }

    /// Behaviors attached to an object.
    #[must_use]
    pub fn behaviors(&self, object: ObjectId) -> &[ObjectId] {
        self.objects.get(object).map_or(&[], |n| n.behaviors.as_slice())
    }

    /// First behavior of the given type attached to an object.
    #[must_use]
    pub fn behavior_of_type(&self, object: ObjectId, type_name: &str) -> Option<ObjectId> {
        self.behaviors(object).iter().copied().find(|b| {
            self.objects
                .get(*b)
                .is_some_and(|n| n.schema.name.as_str() == type_name)
        })
    }

    /// First child entity with the given label.
    #[must_use]
    pub fn child_labeled(&self, entity: ObjectId, label: &str) -> Option<ObjectId> {
        self.children(entity).iter().copied().find(|c| {
            self.objects
                .get(*c)
                .is_some_and(|n| n.label.as_deref() == Some(label))
        })
    }

    /// Reads a field, or `None` if the object or field is missing.
    #[must_use]
    pub fn field(&self, object: ObjectId, field: &str) -> Option<&Value> {
        self.objects.get(object)?.fields.get(field)
    }

    /// Sets a field by name.
    ///
    /// # Errors
    ///
    /// See [`FieldAccessor::set`].
    pub fn set_field(&mut self, object: ObjectId, field: &str, value: impl Into<Value>) -> Result<()> {
        self.set(object, &Name::from(field), value.into())
    }

    /// Moves an entity under a new parent.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is gone, if `entity` is not an
    /// entity, or if the move would make `entity` its own ancestor.
    pub fn reparent(&mut self, entity: ObjectId, parent: Option<ObjectId>) -> Result<()> {
        let node = self.objects.get(entity).ok_or_else(|| Error::object_not_found(entity))?;
        if node.schema.kind != ObjectKind::Entity {
            return Err(Error::new(ErrorKind::KindMismatch {
                type_name: node.schema.name.clone(),
                expected: "an entity".into(),
            }));
        }
        let old_parent = node.owner;
        if let Some(p) = parent {
            self.objects.validate(p)?;
            let mut cursor = Some(p);
            while let Some(c) = cursor {
                if c == entity {
                    return Err(Error::structural_cycle(entity));
                }
                cursor = self.objects.get(c).and_then(|n| n.owner);
            }
        }

        self.detach(entity, old_parent);
        match parent {
            Some(p) => {
                if let Some(n) = self.objects.get_mut(p) {
                    n.children.push(entity);
                }
            }
            None => self.roots.push(entity),
        }
        if let Some(n) = self.objects.get_mut(entity) {
            n.owner = parent;
        }
        Ok(())
    }

    /// Iterates over every live object.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.ids()
    }

    fn detach(&mut self, object: ObjectId, owner: Option<ObjectId>) {
        match owner {
            Some(o) => {
                if let Some(n) = self.objects.get_mut(o) {
                    n.children.retain(|c| *c != object);
                    n.behaviors.retain(|b| *b != object);
                }
            }
            None => self.roots.retain(|r| *r != object),
        }
    }

    fn destroy_subtree(&mut self, object: ObjectId) -> Result<()> {
        let node = self.objects.remove(object)?;
        for owned in node.behaviors.into_iter().chain(node.children) {
            self.destroy_subtree(owned)?;
        }
        Ok(())
    }

    fn construct_behaviors(&mut self, object: ObjectId) {
        let behaviors = self.behaviors(object).to_vec();
        for behavior in behaviors {
            if let Some(hook) = self.hook_for(behavior) {
                hook(self, behavior);
            }
            self.construct_behaviors(behavior);
        }
    }

    fn hook_for(&self, object: ObjectId) -> Option<ConstructHook> {
        let name = &self.objects.get(object)?.schema.name;
        self.hooks.get(name).copied()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.objects.len())
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl OwnershipGraph for Scene {
    fn owned(&self, object: ObjectId) -> Vec<ObjectId> {
        self.objects.get(object).map_or_else(Vec::new, |n| {
            n.behaviors.iter().chain(&n.children).copied().collect()
        })
    }
}

impl FieldAccessor for Scene {
    fn schema_of(&self, object: ObjectId) -> Option<Arc<TypeSchema>> {
        self.objects.get(object).map(|n| Arc::clone(&n.schema))
    }

    fn get(&self, object: ObjectId, field: &str) -> Option<Value> {
        self.field(object, field).cloned()
    }

    fn set(&mut self, object: ObjectId, field: &Name, value: Value) -> Result<()> {
        let node = self
            .objects
            .get_mut(object)
            .ok_or_else(|| Error::object_not_found(object))?;
        let schema = node
            .schema
            .field(field.as_str())
            .ok_or_else(|| Error::field_not_found(node.schema.name.clone(), field.clone()))?;
        if !schema.ty.accepts(&value) {
            return Err(Error::new(ErrorKind::TypeMismatch {
                field: field.clone(),
                expected: schema.ty.to_string(),
            }));
        }
        node.fields = node.fields.insert(field.clone(), value);
        Ok(())
    }
}

impl SceneHost for Scene {
    fn exists(&self, object: ObjectId) -> bool {
        self.objects.contains(object)
    }

    fn kind(&self, object: ObjectId) -> Option<ObjectKind> {
        self.objects.get(object).map(|n| n.schema.kind)
    }

    fn owner(&self, object: ObjectId) -> Option<ObjectId> {
        self.objects.get(object).and_then(|n| n.owner)
    }

    fn label(&self, object: ObjectId) -> Option<String> {
        self.objects.get(object).and_then(|n| n.label.clone())
    }

    fn set_label(&mut self, object: ObjectId, label: Option<String>) -> Result<()> {
        let node = self
            .objects
            .get_mut(object)
            .ok_or_else(|| Error::object_not_found(object))?;
        node.label = label;
        Ok(())
    }

    fn type_schema(&self, name: &TypeName) -> Option<Arc<TypeSchema>> {
        self.registry.get(name.as_str()).cloned()
    }

    fn spawn_entity(&mut self, type_name: &TypeName, parent: Option<ObjectId>) -> Result<ObjectId> {
        let schema = self.registry.expect_kind(type_name, ObjectKind::Entity)?;
        if let Some(p) = parent {
            self.objects.validate(p)?;
            if self.kind(p) != Some(ObjectKind::Entity) {
                return Err(Error::invalid_root(format!("parent {p} is not an entity")));
            }
        }
        let id = self.objects.insert(Node::new(schema, parent));
        match parent {
            Some(p) => {
                if let Some(n) = self.objects.get_mut(p) {
                    n.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        Ok(id)
    }

    fn attach_behavior(&mut self, type_name: &TypeName, owner: ObjectId) -> Result<ObjectId> {
        let schema = self.registry.expect_kind(type_name, ObjectKind::Behavior)?;
        self.objects.validate(owner)?;
        let id = self.objects.insert(Node::new(schema, Some(owner)));
        if let Some(n) = self.objects.get_mut(owner) {
            n.behaviors.push(id);
        }
        Ok(id)
    }

    fn destroy(&mut self, object: ObjectId) -> Result<()> {
        let owner = self
            .objects
            .get(object)
            .ok_or_else(|| Error::object_not_found(object))?
            .owner;
        self.detach(object, owner);
        self.destroy_subtree(object)
    }

    fn resolve_resource(&self, path: &ResourcePath) -> bool {
        self.resources.contains(path)
    }

    fn post_construct(&mut self, entity: ObjectId) {
        if let Some(hook) = self.hook_for(entity) {
            hook(self, entity);
        }
        self.construct_behaviors(entity);
    }
}
