//! End-to-end render tests: scene in, RGBA frame out, through the public API.

use silica::camera::Camera;
use silica::render::render;
use silica::scene::{builtin_scene, load_scene, Material, Scene, SceneConfig, Sphere};
use silica::trace::ShadeMode;
use silica::util::Vec3;

use tempfile::NamedTempFile;

/// Level camera at the origin looking down -Z.
fn level_camera() -> Camera {
    Camera {
        look_from: Vec3::ZERO,
        look_at: Vec3::new(0.0, 0.0, -1.0),
        vup: Vec3::Y,
        vfov: 90.0,
        defocus_angle: 0.0,
        focus_distance: 1.0,
    }
}

#[test]
fn test_demo_scene_renders_spheres_against_sky() {
    let (scene, camera) = builtin_scene("demo", 0).expect("demo should resolve");
    let basis = camera.basis(64, 36).expect("Failed to derive basis");
    let frame = render(&scene, &basis, ShadeMode::Normals);

    assert_eq!((frame.width, frame.height), (64, 36));
    assert_eq!(frame.pixels.len(), 64 * 36 * 4);

    // The demo camera centers the blue sphere, so the middle of the frame
    // shows a surface normal while the top corners show sky.
    let center = frame.pixel(32, 18);
    let corner = frame.pixel(0, 0);
    assert_ne!(center, corner, "Sphere and sky should shade differently");
    assert_eq!(center[3], 255);
    assert_eq!(corner[3], 255);
}

#[test]
fn test_sky_gradient_runs_white_to_blue() {
    // One sphere behind the camera: every pixel sees sky.
    let scene = Scene::new(vec![Sphere::new(
        Vec3::new(0.0, 0.0, 10.0),
        0.5,
        Material::diffuse(Vec3::splat(0.5)),
    )])
    .expect("Failed to build scene");
    let basis = level_camera().basis(32, 32).expect("Failed to derive basis");
    let frame = render(&scene, &basis, ShadeMode::Normals);

    for py in 0..32 {
        for px in 0..32 {
            let [r, _, b, a] = frame.pixel(px, py);
            assert_eq!(a, 255);
            assert_eq!(b, 255, "Sky keeps blue saturated at ({px}, {py})");
            assert!(r <= b);
        }
    }
    // Upward rays sit further along the white-to-blue blend.
    assert!(frame.pixel(16, 0)[0] < frame.pixel(16, 31)[0]);
}

#[test]
fn test_center_pixel_survives_resolution_changes() {
    // With odd dimensions the center pixel looks straight down the view
    // axis, so re-deriving the basis for a new viewport size must not
    // change what that pixel shows.
    let scene = Scene::new(vec![Sphere::new(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        Material::diffuse(Vec3::splat(0.5)),
    )])
    .expect("Failed to build scene");
    let camera = level_camera();

    let small = render(
        &scene,
        &camera.basis(33, 33).expect("Failed to derive basis"),
        ShadeMode::Normals,
    );
    let large = render(
        &scene,
        &camera.basis(65, 65).expect("Failed to derive basis"),
        ShadeMode::Normals,
    );
    // Head-on hit: normal (0, 0, 1) encodes as (127, 127, 255).
    assert_eq!(small.pixel(16, 16), [127, 127, 255, 255]);
    assert_eq!(small.pixel(16, 16), large.pixel(32, 32));
}

#[test]
fn test_cover_scatter_frame_is_reproducible() {
    // The cover camera has a nonzero aperture, so this covers the defocus
    // jitter path as well as material scattering.
    let (scene, camera) = builtin_scene("cover", 5).expect("cover should resolve");
    let basis = camera.basis(48, 27).expect("Failed to derive basis");

    let a = render(&scene, &basis, ShadeMode::Scatter);
    let b = render(&scene, &basis, ShadeMode::Scatter);
    assert_eq!(a.pixels, b.pixels, "Same scene and basis, same frame");
}

#[test]
fn test_file_round_trip_preserves_the_frame() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let (scene, camera) = builtin_scene("demo", 0).expect("demo should resolve");

    SceneConfig::from_scene(&scene, &camera)
        .save(temp.path())
        .expect("Failed to save scene");
    let (loaded, loaded_camera) = load_scene(temp.path()).expect("Failed to load scene");

    let basis = camera.basis(32, 18).expect("Failed to derive basis");
    let loaded_basis = loaded_camera.basis(32, 18).expect("Failed to derive basis");
    let original = render(&scene, &basis, ShadeMode::Scatter);
    let reloaded = render(&loaded, &loaded_basis, ShadeMode::Scatter);
    assert_eq!(original.pixels, reloaded.pixels);
}

#[test]
fn test_scene_file_to_png_pipeline() {
    // The whole CLI render path: JSON scene file in, PNG out.
    let scene_file = NamedTempFile::new().expect("Failed to create temp file");
    let json = r#"{
        "camera": { "look_from": [0.0, 0.0, 0.0], "look_at": [0.0, 0.0, -1.0],
                    "vfov": 90.0, "defocus_angle": 0.0, "focus_distance": 1.0 },
        "spheres": [
            {
                "center": [0.0, 0.0, -1.0],
                "radius": 0.5,
                "material": { "type": "diffuse", "albedo": [0.1, 0.2, 0.5] }
            }
        ]
    }"#;
    std::fs::write(scene_file.path(), json).expect("Failed to write scene file");

    let (scene, camera) = load_scene(scene_file.path()).expect("Failed to load scene");
    let basis = camera.basis(24, 16).expect("Failed to derive basis");
    let frame = render(&scene, &basis, ShadeMode::Scatter);

    let out_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let out_path = out_dir.path().join("render.png");
    frame.save_png(&out_path).expect("Failed to save PNG");

    let loaded = image::open(&out_path).expect("Failed to reopen PNG").to_rgba8();
    assert_eq!(loaded.dimensions(), (24, 16));
    assert_eq!(loaded.as_raw(), &frame.pixels);
}
