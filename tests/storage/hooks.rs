//! Integration tests for construct hooks

use std::sync::Arc;

use graft_foundation::{FieldSchema, FieldType, ObjectId, Value};
use graft_storage::{Scene, SceneHost, TypeRegistry, TypeSchema};

fn light_up(scene: &mut Scene, lamp: ObjectId) {
    scene.set_field(lamp, "lit", true).unwrap();
}

fn count_boot(scene: &mut Scene, room: ObjectId) {
    let boots = scene.field(room, "boots").and_then(Value::as_int).unwrap_or(0);
    scene.set_field(room, "boots", boots + 1).unwrap();
}

fn scene() -> Scene {
    let registry = TypeRegistry::new()
        .with(TypeSchema::entity("Room").with_field(FieldSchema::new("boots", FieldType::Int)))
        .and_then(|r| r.with(TypeSchema::behavior("Lamp").with_field(FieldSchema::new("lit", FieldType::Bool))))
        .unwrap();
    let mut scene = Scene::new(Arc::new(registry));
    scene.on_construct("Lamp", light_up);
    scene.on_construct("Room", count_boot);
    scene
}

#[test]
fn post_construct_runs_entity_and_behavior_hooks() {
    let mut scene = scene();
    let room = scene.spawn("Room", None).unwrap();
    let lamp = scene.attach("Lamp", room).unwrap();
    assert_eq!(scene.field(lamp, "lit"), Some(&Value::Bool(false)));

    scene.post_construct(room);
    assert_eq!(scene.field(lamp, "lit"), Some(&Value::Bool(true)));
    assert_eq!(scene.field(room, "boots"), Some(&Value::Int(1)));
}

#[test]
fn hooks_do_not_run_on_plain_spawn() {
    let mut scene = scene();
    let room = scene.spawn("Room", None).unwrap();
    assert_eq!(scene.field(room, "boots"), Some(&Value::Int(0)));
}
