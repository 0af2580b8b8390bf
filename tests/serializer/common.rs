//! Shared fixtures

use std::sync::Arc;

use graft_foundation::{FieldSchema, FieldType, GuidGenerator, ObjectId};
use graft_serializer::{IdentityMap, Serializer};
use graft_storage::{Scene, TypeRegistry, TypeSchema};

pub fn registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new()
        .with(TypeSchema::entity("Crate").with_field(FieldSchema::new("sealed", FieldType::Bool)))
        .and_then(|r| {
            r.with(
                TypeSchema::behavior("Stats")
                    .with_field(FieldSchema::new("hp", FieldType::Int))
                    .with_field(FieldSchema::new("color", FieldType::String)),
            )
        })
        .and_then(|r| r.with(TypeSchema::behavior("Link").with_field(FieldSchema::new("target", FieldType::Reference))))
        .and_then(|r| r.with(TypeSchema::behavior("Legacy").with_field(FieldSchema::new("hp", FieldType::Int))))
        .unwrap();
    Arc::new(registry)
}

pub fn scene() -> Scene {
    Scene::new(registry())
}

pub fn save(scene: &Scene, root: ObjectId) -> Vec<u8> {
    Serializer::default()
        .serialize(scene, root, &mut IdentityMap::new(), &mut GuidGenerator::seeded(11))
        .unwrap()
}
