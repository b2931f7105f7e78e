//! silica CLI - render sphere scenes and launch the interactive viewer.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use silica::camera::{Camera, CameraBasis};
use silica::render::{self, Frame};
use silica::scene::{builtin_scene, load_scene, MaterialKind, Scene, SPHERE_RECORD_SIZE};
use silica::trace::ShadeMode;

/// Verbosity level (thread-safe)
const LOG_QUIET: u8 = 0;
const LOG_INFO: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LOG_INFO);

#[inline]
fn log_level() -> u8 {
    LOG_LEVEL.load(Ordering::Relaxed)
}

#[inline]
fn set_log_level(level: u8) {
    LOG_LEVEL.store(level, Ordering::Relaxed);
}

macro_rules! info {
    ($($arg:tt)*) => {
        if log_level() >= LOG_INFO {
            println!("[INFO] {}", format!($($arg)*));
        }
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        if log_level() >= LOG_DEBUG {
            println!("[DEBUG] {}", format!($($arg)*));
        }
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        if log_level() >= LOG_TRACE {
            println!("[TRACE] {}", format!($($arg)*));
        }
    };
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => set_log_level(LOG_DEBUG),
            "-vv" | "--trace" => set_log_level(LOG_TRACE),
            "-q" | "--quiet" => set_log_level(LOG_QUIET),
            _ => filtered_args.push(arg),
        }
    }

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // View command - launch interactive viewer
        "view" | "v" => {
            #[cfg(feature = "viewer")]
            {
                let file = filtered_args.get(1).map(|s| std::path::PathBuf::from(*s));
                if let Err(e) = silica::viewer::run(file) {
                    eprintln!("Viewer error: {}", e);
                    std::process::exit(1);
                }
            }
            #[cfg(not(feature = "viewer"))]
            {
                eprintln!("Viewer not available. Rebuild with: cargo build --features viewer");
                std::process::exit(1);
            }
        }

        // Render command - trace a scene to a PNG
        "render" | "r" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing scene argument");
                eprintln!("Usage: silica-cli render <scene.json|demo|cover> [options]");
                std::process::exit(1);
            }
            cmd_render(&filtered_args[1..]);
        }

        // Info command - show scene summary
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing scene argument");
                eprintln!("Usage: silica-cli info <scene.json|demo|cover>");
                std::process::exit(1);
            }
            cmd_info(filtered_args[1]);
        }

        // Help
        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(filtered_args[0]).exists() {
                cmd_info(filtered_args[0]);
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("silica - sphere scene ray tracer");
    println!(
        "version {} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("SILICA_BUILD_DATE").unwrap_or("unknown")
    );
    println!();
    println!("USAGE:");
    println!("    silica-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    v, view   [scene]          Open scene in the interactive viewer (Esc to exit)");
    println!("    r, render <scene> [opts]   Trace scene to a PNG image");
    println!("    i, info   <scene>          Show scene and camera summary");
    println!("    h, help                    Show this help");
    println!();
    println!("    <scene> is a .json file or a built-in name: demo, cover");
    println!();
    println!("RENDER OPTIONS:");
    println!("    -o, --output <file>   Output path (default: render.png)");
    println!("    -s, --size <WxH>      Image size (default: 1280x720)");
    println!("    -m, --mode <mode>     Shading: normals or scatter (default: scatter)");
    println!("        --seed <n>        Seed for the cover scene generator (default: 0)");
    println!("    -g, --gpu             Render on the GPU instead of CPU threads");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Suppress progress and info output");
    println!();
    println!("EXAMPLES:");
    println!("    silica-cli view scene.json          # Fly through a scene");
    println!("    silica-cli render demo              # Render the demo scene");
    println!("    silica-cli render cover --seed 7 --size 1920x1080 -o cover.png");
    println!("    silica-cli render scene.json -m normals   # Shading debug view");
    println!("    silica-cli -q render cover --gpu    # Quiet GPU render");
    println!();
    println!("NOTES:");
    println!("    - Passing a .json file directly is equivalent to 'info'");
    println!("    - Viewer requires --features viewer (enabled by default)");
    println!("    - GPU rendering requires --features gpu (implied by viewer)");
}

/// Resolve a scene argument: built-in name first, then a JSON file.
fn load_source(source: &str, seed: u64) -> (Scene, Camera) {
    if let Some(pair) = builtin_scene(source, seed) {
        debug!("Using built-in scene '{}'", source);
        return pair;
    }
    match load_scene(Path::new(source)) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Failed to load {}: {}", source, e);
            std::process::exit(1);
        }
    }
}

fn cmd_render(args: &[&str]) {
    let source = args[0];

    let mut output = PathBuf::from("render.png");
    let mut width = 1280u32;
    let mut height = 720u32;
    let mut mode = ShadeMode::Scatter;
    let mut seed = 0u64;
    let mut use_gpu = false;

    let mut i = 1;
    while i < args.len() {
        match args[i] {
            "-o" | "--output" => {
                i += 1;
                match args.get(i) {
                    Some(value) => output = PathBuf::from(*value),
                    None => {
                        eprintln!("Error: {} expects a file path", args[i - 1]);
                        std::process::exit(1);
                    }
                }
            }
            "-s" | "--size" => {
                i += 1;
                match args.get(i).and_then(|v| parse_size(v)) {
                    Some((w, h)) => {
                        width = w;
                        height = h;
                    }
                    None => {
                        eprintln!("Error: --size expects WIDTHxHEIGHT, e.g. --size 1920x1080");
                        std::process::exit(1);
                    }
                }
            }
            "-m" | "--mode" => {
                i += 1;
                match args.get(i).and_then(|v| ShadeMode::parse(v)) {
                    Some(m) => mode = m,
                    None => {
                        eprintln!("Error: --mode expects 'normals' or 'scatter'");
                        std::process::exit(1);
                    }
                }
            }
            "--seed" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse().ok()) {
                    Some(n) => seed = n,
                    None => {
                        eprintln!("Error: --seed expects an integer");
                        std::process::exit(1);
                    }
                }
            }
            "-g" | "--gpu" => use_gpu = true,
            other => {
                eprintln!("Unknown render option: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let (scene, camera) = load_source(source, seed);

    info!("Scene: {} spheres", scene.len());
    debug!(
        "Rendering {}x{} in {} mode -> {}",
        width,
        height,
        mode,
        output.display()
    );

    let basis = match camera.basis(width, height) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Camera setup failed: {}", e);
            std::process::exit(1);
        }
    };

    let started = Instant::now();
    let frame = if use_gpu {
        render_gpu(&scene, &basis, mode)
    } else {
        render_cpu(&scene, &basis, mode, height)
    };

    if let Err(e) = frame.save_png(&output) {
        eprintln!("Failed to write {}: {}", output.display(), e);
        std::process::exit(1);
    }

    println!(
        "Rendered {}x{} ({}) in {:.2}s -> {}",
        width,
        height,
        mode,
        started.elapsed().as_secs_f32(),
        output.display()
    );
}

fn render_cpu(scene: &Scene, basis: &CameraBasis, mode: ShadeMode, height: u32) -> Frame {
    let bar = if log_level() >= LOG_INFO {
        let pb = ProgressBar::new(height as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} rows | {elapsed_precise} | ETA: {eta}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let frame = match &bar {
        Some(pb) => render::render_with(scene, basis, mode, |_| pb.inc(1)),
        None => render::render(scene, basis, mode),
    };

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }
    frame
}

fn render_gpu(scene: &Scene, basis: &CameraBasis, mode: ShadeMode) -> Frame {
    #[cfg(feature = "gpu")]
    {
        info!("Rendering on the GPU");
        match render::gpu::render_headless(scene, basis, mode) {
            Ok(frame) => frame,
            Err(e) => {
                eprintln!("GPU render failed: {}", e);
                std::process::exit(1);
            }
        }
    }
    #[cfg(not(feature = "gpu"))]
    {
        let _ = (scene, basis, mode);
        eprintln!("GPU rendering not available. Rebuild with: cargo build --features gpu");
        std::process::exit(1);
    }
}

fn cmd_info(source: &str) {
    info!("Loading scene: {}", source);

    let (scene, camera) = load_source(source, 0);

    println!("Scene: {}", source);
    println!(
        "Spheres: {} ({} bytes packed, {} per record)",
        scene.len(),
        scene.packed_size(),
        SPHERE_RECORD_SIZE
    );
    println!();

    // Count spheres by material kind
    let mut diffuse = 0usize;
    let mut metal = 0usize;
    let mut dielectric = 0usize;
    for sphere in scene.spheres() {
        match sphere.material.kind {
            MaterialKind::Diffuse => diffuse += 1,
            MaterialKind::Metal => metal += 1,
            MaterialKind::Dielectric => dielectric += 1,
        }
        trace!(
            "sphere center=({:.2}, {:.2}, {:.2}) r={:.2} kind={:?}",
            sphere.center.x,
            sphere.center.y,
            sphere.center.z,
            sphere.radius,
            sphere.material.kind
        );
    }

    println!("Materials:");
    println!("  Diffuse:    {}", diffuse);
    println!("  Metal:      {}", metal);
    println!("  Dielectric: {}", dielectric);
    println!();

    println!("Camera:");
    println!(
        "  From:    ({:.2}, {:.2}, {:.2})",
        camera.look_from.x, camera.look_from.y, camera.look_from.z
    );
    println!(
        "  At:      ({:.2}, {:.2}, {:.2})",
        camera.look_at.x, camera.look_at.y, camera.look_at.z
    );
    println!("  Vfov:    {:.1} deg", camera.vfov);
    println!(
        "  Defocus: {:.2} deg at {:.2} focus distance",
        camera.defocus_angle, camera.focus_distance
    );
}

/// Parse "1920x1080" style size arguments.
fn parse_size(value: &str) -> Option<(u32, u32)> {
    let lower = value.to_ascii_lowercase();
    let (w, h) = lower.split_once('x')?;
    let width = w.parse::<u32>().ok().filter(|&n| n > 0)?;
    let height = h.parse::<u32>().ok().filter(|&n| n > 0)?;
    Some((width, height))
}
