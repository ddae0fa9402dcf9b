//! Batch pipeline tests
//!
//! Runs the full orchestrator over scratch model trees with a fake scene:
//! discovery, skip-existing, failure isolation, multi-direction output and
//! the no-geometry fallback.

use std::fs;

use pretty_assertions::assert_eq;
use spritebake_core::{
    cropper_for, place_camera, run_batch, BatchError, Compass, NoopCropper, SceneError,
};
use spritebake_tests::harness::{box_mesh, BROKEN_MODEL, EMPTY_MODEL};
use spritebake_tests::{FakeScene, ModelTree};

#[test]
fn test_empty_input_directory_aborts() {
    let tree = ModelTree::new();
    tree.add_model("notes.txt", "not a model");
    let mut scene = FakeScene::new();

    let err = run_batch(&tree.config(), &mut scene, &NoopCropper).unwrap_err();
    assert!(matches!(err, BatchError::NoAssets { .. }));
    assert!(scene.configured.is_empty());
    assert!(!tree.output().exists());
}

#[test]
fn test_scene_configured_once_per_run() {
    let tree = ModelTree::new();
    tree.add_model("a.glb", "");
    tree.add_model("b.glb", "");
    tree.add_model("c.glb", "");
    let mut scene = FakeScene::new();

    let result = run_batch(&tree.config(), &mut scene, &NoopCropper).unwrap();
    assert_eq!(result.total, 3);
    assert_eq!(result.processed, 3);
    assert_eq!(scene.configured.len(), 1);
    assert_eq!(scene.clears, 3);
    assert_eq!(scene.configured[0].ortho_scale, 4.0);
}

#[test]
fn test_second_run_with_skip_existing_renders_nothing() {
    let tree = ModelTree::new();
    tree.add_model("a.glb", "");
    tree.add_model("props/b.obj", "");
    tree.add_model("props/c.fbx", "");

    let mut config = tree.config();
    let first = run_batch(&config, &mut FakeScene::new(), &NoopCropper).unwrap();
    assert_eq!(first.processed, 3);

    config.skip_existing = true;
    let mut scene = FakeScene::new();
    let second = run_batch(&config, &mut scene, &NoopCropper).unwrap();

    assert_eq!(second.total, 3);
    assert_eq!(second.skipped, 3);
    assert_eq!(second.processed, 0);
    assert_eq!(second.failed, 0);
    assert!(scene.imports.is_empty());
    assert!(scene.renders.is_empty());
}

#[test]
fn test_skip_existing_needs_every_direction() {
    let tree = ModelTree::new();
    tree.add_model("knight.glb", "");

    let mut config = tree.config();
    config.rotations = 4;
    run_batch(&config, &mut FakeScene::new(), &NoopCropper).unwrap();

    fs::remove_file(tree.sprite("knight_w.png")).unwrap();

    config.skip_existing = true;
    let mut scene = FakeScene::new();
    let result = run_batch(&config, &mut scene, &NoopCropper).unwrap();
    assert_eq!(result.skipped, 0);
    assert_eq!(result.processed, 1);
    assert_eq!(scene.renders.len(), 4);
    assert!(tree.sprite("knight_w.png").exists());
}

#[test]
fn test_one_bad_asset_does_not_stop_the_batch() {
    let tree = ModelTree::new();
    tree.add_model("a_tree.glb", "");
    tree.add_model("b_part.stl", "");
    tree.add_model("c_rock.glb", "");

    let mut config = tree.config();
    config.formats.push(".stl".to_string());
    let mut scene = FakeScene::new();

    let result = run_batch(&config, &mut scene, &NoopCropper).unwrap();
    assert_eq!(result.total, 3);
    assert_eq!(result.processed, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.failed_assets(), vec!["b_part.stl"]);
    assert_eq!(result.failures[0].direction, None);
    assert!(result.failures[0].error.contains(".stl"));

    assert!(tree.sprite("a_tree.png").exists());
    assert!(!tree.sprite("b_part.png").exists());
    assert!(tree.sprite("c_rock.png").exists());
}

#[test]
fn test_import_failure_is_recorded() {
    let tree = ModelTree::new();
    tree.add_model("broken.glb", BROKEN_MODEL);
    tree.add_model("fine.glb", "");

    let result = run_batch(&tree.config(), &mut FakeScene::new(), &NoopCropper).unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(result.failed, 1);
    assert!(result.failures[0].error.contains("corrupt file"));
}

#[test]
fn test_four_directions_share_one_import() {
    let tree = ModelTree::new();
    tree.add_meshes(
        "units/knight.glb",
        &[box_mesh("Body", [1.0, 1.0, 0.0], [2.0, 3.0, 2.0])],
    );

    let mut config = tree.config();
    config.rotations = 4;
    config.camera_yaw = 45.0;
    let mut scene = FakeScene::new();

    let result = run_batch(&config, &mut scene, &NoopCropper).unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(scene.imports.len(), 1);
    assert_eq!(scene.renders.len(), 4);

    for (suffix, yaw) in [("s", 0.0), ("e", 90.0), ("n", 180.0), ("w", 270.0)] {
        let name = format!("units/knight_{}.png", suffix);
        assert!(tree.sprite(&name).exists(), "missing {}", name);
        assert!(tree.sprite(&name).with_extension("json").exists());

        let request = scene
            .renders
            .iter()
            .find(|r| r.output_path == tree.sprite(&name))
            .unwrap();
        assert_eq!(
            request.pose,
            place_camera([1.5, 2.0, 1.0], config.camera_angle, yaw)
        );
    }
    assert!(!tree.sprite("units/knight.png").exists());
}

#[test]
fn test_failed_direction_keeps_siblings() {
    let tree = ModelTree::new();
    tree.add_model("tower.glb", "");

    let mut config = tree.config();
    config.rotations = 4;
    let mut scene = FakeScene::new().failing_on("_n.png");

    let result = run_batch(&config, &mut scene, &NoopCropper).unwrap();
    assert_eq!(result.processed, 0);
    assert_eq!(result.failed, 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].direction, Some(Compass::North));
    assert!(result.failures[0].error.contains("GPU out of memory"));

    for suffix in ["s", "e", "w"] {
        assert!(tree.sprite(&format!("tower_{}.png", suffix)).exists());
    }
    assert!(!tree.sprite("tower_n.png").exists());
    assert!(!tree.sprite("tower_n.json").exists());
}

#[test]
fn test_missing_render_output_is_a_failure() {
    let tree = ModelTree::new();
    tree.add_model("ghost.glb", "");
    let mut scene = FakeScene::new().silent_on("ghost");

    let result = run_batch(&tree.config(), &mut scene, &NoopCropper).unwrap();
    assert_eq!(result.failed, 1);
    let expected = SceneError::OutputMissing {
        path: tree.sprite("ghost.png"),
    };
    assert_eq!(result.failures[0].error, expected.to_string());
    assert!(!tree.sprite("ghost.json").exists());
}

#[test]
fn test_output_tree_mirrors_input_tree() {
    let tree = ModelTree::new();
    tree.add_model("props/crates/large.GLB", "");
    tree.add_model("props/barrel.obj", "");

    let result = run_batch(&tree.config(), &mut FakeScene::new(), &NoopCropper).unwrap();
    assert_eq!(result.processed, 2);
    assert!(tree.sprite("props/crates/large.png").exists());
    assert!(tree.sprite("props/barrel.png").exists());
}

#[test]
fn test_assets_processed_in_path_order() {
    let tree = ModelTree::new();
    tree.add_model("zebra.glb", "");
    tree.add_model("alpha/mid.glb", "");
    tree.add_model("beta.glb", "");
    let mut scene = FakeScene::new();

    run_batch(&tree.config(), &mut scene, &NoopCropper).unwrap();
    let order: Vec<_> = scene
        .imports
        .iter()
        .map(|p| p.strip_prefix(tree.input()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        order,
        vec![
            std::path::PathBuf::from("alpha/mid.glb"),
            std::path::PathBuf::from("beta.glb"),
            std::path::PathBuf::from("zebra.glb"),
        ]
    );
}

#[test]
fn test_canvas_is_the_same_for_every_asset() {
    let tree = ModelTree::new();
    tree.add_meshes("small.glb", &[box_mesh("S", [0.0; 3], [0.1, 0.1, 0.1])]);
    tree.add_meshes("large.glb", &[box_mesh("L", [-3.0; 3], [3.0, 3.0, 3.0])]);
    let mut scene = FakeScene::new();

    run_batch(&tree.config(), &mut scene, &NoopCropper).unwrap();
    let sizes: Vec<_> = scene.renders.iter().map(|r| r.canvas_size).collect();
    assert_eq!(sizes, vec![1024, 1024]);
}

#[test]
fn test_empty_geometry_renders_degraded() {
    let tree = ModelTree::new();
    tree.add_model("a_solid.glb", "");
    tree.add_model("b_hollow.glb", EMPTY_MODEL);
    let mut scene = FakeScene::new();
    let config = tree.config();

    let result = run_batch(&config, &mut scene, &NoopCropper).unwrap();
    assert_eq!(result.processed, 2);
    assert_eq!(result.failed, 0);
    assert_eq!(result.degraded, vec!["b_hollow.glb".to_string()]);

    // The degraded render keeps the previous asset's camera.
    assert_eq!(scene.renders[1].pose, scene.renders[0].pose);
    assert_eq!(scene.renders[1].canvas_size, config.min_canvas_size);
}

#[test]
fn test_empty_geometry_can_be_a_failure() {
    let tree = ModelTree::new();
    tree.add_model("hollow.glb", EMPTY_MODEL);
    let mut config = tree.config();
    config.fail_on_empty_geometry = true;
    let mut scene = FakeScene::new();

    let result = run_batch(&config, &mut scene, &NoopCropper).unwrap();
    assert_eq!(result.processed, 0);
    assert_eq!(result.failed, 1);
    assert!(result.degraded.is_empty());
    assert!(scene.renders.is_empty());
    assert_eq!(result.failures[0].code.as_deref(), Some("SCENE_006"));
}

#[test]
fn test_auto_crop_shrinks_sprites() {
    let tree = ModelTree::new();
    tree.add_model("crate.glb", "");
    let config = tree.config();
    let cropper = cropper_for(config.auto_crop);

    run_batch(&config, &mut FakeScene::new(), cropper.as_ref()).unwrap();
    let sprite = image::open(tree.sprite("crate.png")).unwrap();
    assert_eq!((sprite.width(), sprite.height()), (256, 256));
}

#[cfg(unix)]
#[test]
fn test_dangling_link_does_not_abort_discovery() {
    let tree = ModelTree::new();
    tree.add_model("a.glb", "");
    tree.add_model("b.glb", "");
    std::os::unix::fs::symlink("/nonexistent/target", tree.input().join("stale_link")).unwrap();

    let result = run_batch(&tree.config(), &mut FakeScene::new(), &NoopCropper).unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.processed, 2);
    assert!(tree.sprite("a.png").exists());
    assert!(tree.sprite("b.png").exists());
}

#[cfg(unix)]
#[test]
fn test_link_loop_does_not_abort_discovery() {
    let tree = ModelTree::new();
    tree.add_model("a.glb", "");
    tree.add_model("props/b.obj", "");
    std::os::unix::fs::symlink(tree.input(), tree.input().join("props/loop")).unwrap();

    let result = run_batch(&tree.config(), &mut FakeScene::new(), &NoopCropper).unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.processed, 2);
    assert_eq!(result.failed, 0);
}

#[test]
fn test_same_stem_different_extension_is_a_collision() {
    let tree = ModelTree::new();
    tree.add_meshes("tree.glb", &[box_mesh("Trunk", [0.0; 3], [3.0, 1.0, 4.0])]);
    tree.add_model("tree.obj", "");
    let mut scene = FakeScene::new();

    let result = run_batch(&tree.config(), &mut scene, &NoopCropper).unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.failed_assets(), vec!["tree.obj"]);
    assert!(result.failures[0].error.contains("tree.glb"));
    assert_eq!(scene.imports.len(), 1);
    assert_eq!(scene.renders.len(), 1);

    // The first asset's sidecar is intact.
    assert_eq!(tree.sidecar("tree.png")["object_bounds"]["width"], 3.0);
}

#[test]
fn test_collision_is_not_reported_as_skipped() {
    let tree = ModelTree::new();
    tree.add_model("rock.fbx", "");
    tree.add_model("rock.glb", "");
    let mut config = tree.config();
    config.skip_existing = true;

    let result = run_batch(&config, &mut FakeScene::new(), &NoopCropper).unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.failed_assets(), vec!["rock.glb"]);
}

#[test]
fn test_failures_carry_scene_error_codes() {
    let tree = ModelTree::new();
    tree.add_model("a_part.stl", "");
    tree.add_model("b_broken.glb", BROKEN_MODEL);
    let mut config = tree.config();
    config.formats.push(".stl".to_string());

    let result = run_batch(&config, &mut FakeScene::new(), &NoopCropper).unwrap();
    let codes: Vec<_> = result
        .failures
        .iter()
        .map(|item| item.code.as_deref())
        .collect();
    assert_eq!(codes, vec![Some("SCENE_001"), Some("SCENE_002")]);
}
