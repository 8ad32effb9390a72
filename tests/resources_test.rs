mod common;

use std::sync::Arc;

use cgmath::{Quaternion, Rotation3, Deg, Vector3};
use common::test_utils::{
    approx_eq, cube_geometry, lacquered_cube_glb, mesh, scene, textured_cube_glb, triangle_glb,
};
use futures::executor::block_on;
use model_preview::{
    data_structures::{
        material::{Material, TextureSlot},
        scene_graph::{MeshNode, SceneNode},
    },
    diagnostics::metrics,
    resources::{
        LoadEvent, LoadTask,
        animation::{AnimationChannel, AnimationClip, AnimationMixer, Keyframes},
        fetch::{progress_fraction, progress_text},
        load_model, load_model_gltf,
        validate::{MIN_TRIANGLES, MIN_VERTICES, validate_glb},
    },
};

fn error_of<T: std::fmt::Debug>(result: anyhow::Result<T>) -> String {
    result.expect_err("expected an error").to_string()
}

#[test]
fn should_accept_closed_shapes() {
    let summary = validate_glb("crate.GLB", &textured_cube_glb()).expect("valid cube");

    assert_eq!(summary.vertex_count, MIN_VERTICES);
    assert_eq!(summary.triangle_count, MIN_TRIANGLES);
}

#[test]
fn should_reject_other_extensions() {
    assert_eq!(
        error_of(validate_glb("crate.gltf", &textured_cube_glb())),
        "Only .glb files are supported."
    );
    assert_eq!(
        error_of(validate_glb("glb", &textured_cube_glb())),
        "Only .glb files are supported."
    );
}

#[test]
fn should_reject_wrong_magic() {
    let message = "The uploaded file does not appear to be a valid GLB file.";
    assert_eq!(error_of(validate_glb("a.glb", b"PK\x03\x04 zip")), message);
    assert_eq!(error_of(validate_glb("a.glb", b"gl")), message);
    assert_eq!(error_of(validate_glb("a.glb", b"glTF garbage after magic")), message);
}

#[test]
fn should_reject_shapes_below_a_cube() {
    assert_eq!(
        error_of(validate_glb("triangle.glb", &triangle_glb())),
        "GLB file must have some valid shape."
    );
}

#[test]
fn should_load_scene_graph_from_glb() {
    let model = block_on(load_model_gltf(&textured_cube_glb(), "")).expect("loads");

    let children = model.scene.get_children();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].source_index(), Some(0));
    assert!(children[0].as_mesh().is_some());
    assert_eq!(children[1].get_local_transform().position, Vector3::new(3.0, 0.0, 0.0));
    assert_ne!(
        children[0].as_mesh().map(|m| m.id),
        children[1].as_mesh().map(|m| m.id)
    );
    assert!(model.animations.is_empty());
}

#[test]
fn should_collect_metrics_of_loaded_glb() {
    let model = block_on(load_model_gltf(&textured_cube_glb(), "")).expect("loads");
    let snapshot = metrics::collect(&*model.scene, &model.animations);

    assert_eq!(snapshot.face_count, 24);
    assert_eq!(snapshot.mesh_count, 2);
    assert_eq!(snapshot.material_count, 1);
    // metallic-roughness fills two slots with one texture
    assert_eq!(snapshot.pbr_texture_count, 1);
    assert_eq!(snapshot.other_texture_count, 1);
    assert_eq!(snapshot.dimensions, Vector3::new(5.0, 2.0, 2.0));
    assert!(!snapshot.has_animations);
}

#[test]
fn should_map_clearcoat_and_sheen_textures() {
    let model = block_on(load_model_gltf(&lacquered_cube_glb(), "")).expect("loads");
    let children = model.scene.get_children();
    let mesh = children[0].as_mesh().expect("mesh node");
    let material = mesh.materials.iter().next().expect("material");

    let source = |slot| material.texture(slot).and_then(|t| t.source_index);
    assert_eq!(source(TextureSlot::Clearcoat), Some(0));
    assert_eq!(source(TextureSlot::ClearcoatRoughness), Some(0));
    assert_eq!(source(TextureSlot::ClearcoatNormal), Some(1));
    assert_eq!(source(TextureSlot::SheenColor), Some(2));

    let snapshot = metrics::collect(&*model.scene, &model.animations);
    assert_eq!(snapshot.material_count, 1);
    assert_eq!(snapshot.pbr_texture_count, 2);
    assert_eq!(snapshot.other_texture_count, 1);
}

#[test]
fn should_give_unassigned_primitives_a_default_material() {
    let model = block_on(load_model_gltf(&triangle_glb(), "")).expect("loads");
    let snapshot = metrics::collect(&*model.scene, &model.animations);

    assert_eq!(snapshot.face_count, 1);
    assert_eq!(snapshot.material_count, 1);
    assert!(!snapshot.has_textures());
}

#[test]
fn should_fail_on_unreadable_bytes() {
    assert!(block_on(load_model_gltf(b"not a model", "")).is_err());
}

#[test]
fn should_report_progress_then_model() {
    let path = std::env::temp_dir().join(format!("model-preview-{}.glb", std::process::id()));
    std::fs::write(&path, textured_cube_glb()).expect("write fixture");

    let mut events = Vec::new();
    block_on(load_model(&path.to_string_lossy(), "", &mut |event| {
        events.push(event)
    }));
    let _ = std::fs::remove_file(&path);

    assert!(matches!(events.first(), Some(LoadEvent::Progress(Some(f))) if *f == 0.0));
    assert!(matches!(events.iter().rev().nth(1), Some(LoadEvent::Progress(Some(f))) if *f == 1.0));
    assert!(matches!(events.last(), Some(LoadEvent::Loaded(_))));
}

#[test]
fn should_report_missing_files() {
    let mut events = Vec::new();
    block_on(load_model("missing.glb", "/nonexistent-assets", &mut |event| {
        events.push(event)
    }));

    match events.as_slice() {
        [LoadEvent::Failed(reason)] => assert!(reason.contains("cannot open"), "{}", reason),
        other => panic!("unexpected events {:?}", other),
    }
}

#[test]
fn should_abort_cancelled_loads() {
    let (load, task) = LoadTask::new(async { 42 });
    assert!(!task.is_cancelled());

    task.cancel();

    assert!(task.is_cancelled());
    assert!(block_on(load).is_err());
}

#[test]
fn should_compute_progress() {
    assert_eq!(progress_fraction(50, Some(100)), Some(0.5));
    assert_eq!(progress_fraction(0, Some(100)), Some(0.0));
    assert_eq!(progress_fraction(10, None), None);
    assert_eq!(progress_fraction(10, Some(0)), None);
    assert_eq!(progress_fraction(200, Some(100)), Some(1.0));

    assert_eq!(progress_text(None), "Loading model... 0%");
    assert_eq!(progress_text(Some(0.0)), "Loading model... 0.0%");
    assert_eq!(progress_text(Some(0.256)), "Loading model... 25.6%");
    assert_eq!(progress_text(Some(1.0)), "Loading model... 100.0%");
}

fn animated_scene() -> Box<dyn SceneNode> {
    let node: Box<dyn SceneNode> = Box::new(
        MeshNode::new(mesh(0, cube_geometry(1.0), Arc::new(Material::new("plain"))))
            .with_source_index(7),
    );
    scene(vec![node])
}

fn slide(timestamps: Vec<f32>) -> AnimationClip {
    AnimationClip {
        name: "slide".to_string(),
        channels: vec![AnimationChannel {
            target: 7,
            keyframes: Keyframes::Translation(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(10.0, 0.0, 0.0),
            ]),
            timestamps,
        }],
    }
}

fn child_x(root: &dyn SceneNode) -> f32 {
    root.get_children()[0].get_local_transform().position.x
}

#[test]
fn should_interpolate_and_loop_clips() {
    let mut root = animated_scene();
    let mut mixer = AnimationMixer::new(vec![slide(vec![0.0, 1.0])]).expect("has clips");

    mixer.update(&mut *root, 0.25);
    assert!(approx_eq(child_x(&*root), 2.5));

    mixer.update(&mut *root, 1.0);
    assert!(approx_eq(mixer.time(), 1.25));
    assert!(approx_eq(child_x(&*root), 2.5));
}

#[test]
fn should_clamp_before_first_keyframe() {
    let mut root = animated_scene();
    let mut mixer = AnimationMixer::new(vec![slide(vec![0.5, 1.5])]).expect("has clips");

    mixer.update(&mut *root, 0.25);
    assert_eq!(child_x(&*root), 0.0);
}

#[test]
fn should_slerp_rotations() {
    let mut root = animated_scene();
    let clip = AnimationClip {
        name: "turn".to_string(),
        channels: vec![AnimationChannel {
            target: 7,
            keyframes: Keyframes::Rotation(vec![
                Quaternion::from_angle_y(Deg(0.0)),
                Quaternion::from_angle_y(Deg(90.0)),
            ]),
            timestamps: vec![0.0, 2.0],
        }],
    };
    let mut mixer = AnimationMixer::new(vec![clip]).expect("has clips");

    mixer.update(&mut *root, 1.0);
    let rotation = root.get_children()[0].get_local_transform().rotation;
    let expected: Quaternion<f32> = Quaternion::from_angle_y(Deg(45.0));
    assert!(approx_eq(rotation.s, expected.s) && approx_eq(rotation.v.y, expected.v.y));
}

#[test]
fn should_slerp_along_the_shorter_arc() {
    let mut root = animated_scene();
    let clip = AnimationClip {
        name: "turn".to_string(),
        channels: vec![AnimationChannel {
            target: 7,
            keyframes: Keyframes::Rotation(vec![
                Quaternion::from_angle_y(Deg(0.0)),
                -Quaternion::from_angle_y(Deg(90.0)),
            ]),
            timestamps: vec![0.0, 2.0],
        }],
    };
    let mut mixer = AnimationMixer::new(vec![clip]).expect("has clips");

    mixer.update(&mut *root, 1.0);
    let rotation = root.get_children()[0].get_local_transform().rotation;
    let expected: Quaternion<f32> = Quaternion::from_angle_y(Deg(45.0));
    // the long way round would land on a 135 degree turn
    assert!(approx_eq(rotation.s.abs(), expected.s));
    assert!(approx_eq(rotation.v.y.abs(), expected.v.y));
}

#[test]
fn should_not_create_mixer_without_clips() {
    assert!(AnimationMixer::new(Vec::new()).is_none());
    assert_eq!(slide(vec![0.0, 3.0]).duration(), 3.0);
}
