//! Shared fixtures

use std::sync::Arc;

use graft_foundation::{FieldSchema, FieldType, GuidGenerator, ObjectId, ResourcePath, Value};
use graft_nested::{AssetLibrary, OverrideEngine};
use graft_serializer::{IdentityMap, LoadOptions, Serializer};
use graft_storage::{Scene, TypeRegistry, TypeSchema};

pub const LANTERN: &str = "props/lantern";

pub fn registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new()
        .with(TypeSchema::entity("Lantern"))
        .and_then(|r| {
            r.with(
                TypeSchema::behavior("Lamp")
                    .with_field(FieldSchema::new("lux", FieldType::Int))
                    .with_field(FieldSchema::new("color", FieldType::String)),
            )
        })
        .and_then(|r| r.with(TypeSchema::behavior("Glass").with_field(FieldSchema::new("tint", FieldType::String))))
        .unwrap();
    Arc::new(registry)
}

pub fn scene() -> Scene {
    Scene::new(registry())
}

/// An authoring scene holding one asset, saved with stable GUIDs.
pub struct Author {
    pub scene: Scene,
    pub root: ObjectId,
    pub identity: IdentityMap,
    generator: GuidGenerator,
}

impl Author {
    /// A lantern with a warm lamp.
    pub fn lantern() -> Self {
        let mut scene = scene();
        let root = scene.spawn("Lantern", None).unwrap();
        let lamp = scene.attach("Lamp", root).unwrap();
        scene.set_field(lamp, "lux", 400).unwrap();
        scene.set_field(lamp, "color", "amber").unwrap();
        Self {
            scene,
            root,
            identity: IdentityMap::new(),
            generator: GuidGenerator::seeded(21),
        }
    }

    pub fn lamp(&self) -> ObjectId {
        self.scene.behavior_of_type(self.root, "Lamp").unwrap()
    }

    pub fn publish(&mut self, engine: &mut OverrideEngine) {
        let payload = Serializer::default()
            .serialize(&self.scene, self.root, &mut self.identity, &mut self.generator)
            .unwrap();
        engine.library_mut().store(LANTERN, payload).unwrap();
    }
}

pub fn engine(author: &mut Author) -> OverrideEngine {
    let mut engine = OverrideEngine::new(AssetLibrary::new()).with_generator(GuidGenerator::seeded(31));
    author.publish(&mut engine);
    engine
}

pub fn place(engine: &mut OverrideEngine, scene: &mut Scene, parent: Option<ObjectId>) -> ObjectId {
    let options = LoadOptions::new().with_parent(parent);
    engine
        .embed(scene, &ResourcePath::from(LANTERN), &options, None)
        .unwrap()
}

pub fn text(scene: &Scene, object: ObjectId, field: &str) -> Option<String> {
    scene.field(object, field).and_then(Value::as_str).map(str::to_string)
}
