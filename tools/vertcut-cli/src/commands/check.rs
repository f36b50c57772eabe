//! Check external tool availability.

use vertcut_render_engine::discovery::find_background_image;
use vertcut_render_engine::process::{command_exists, resolve_tool};

use super::Context;

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    println!("vertcut System Check");
    println!("{}", "=".repeat(50));

    let encoder = &ctx.app.encoder;
    let mut all_ok = true;
    for (name, configured) in [("ffmpeg", &encoder.ffmpeg), ("ffprobe", &encoder.ffprobe)] {
        let resolved = resolve_tool(configured);
        if command_exists(&resolved) {
            println!("[OK] {name}: {}", resolved.display());
        } else {
            println!("[MISSING] {name}: {} is not runnable", resolved.display());
            all_ok = false;
        }
    }

    let dirs = [
        ("Input", &ctx.app.input_dir),
        ("Output", &ctx.app.output_dir),
    ];
    for (label, dir) in dirs {
        if dir.is_dir() {
            println!("[OK] {label} directory: {}", dir.display());
        } else {
            println!("[INFO] {label} directory {} will be created", dir.display());
        }
    }

    if ctx.app.discovery.discover_background {
        match find_background_image(&ctx.app.discovery) {
            Some(path) => println!("[OK] Background image: {}", path.display()),
            None => println!("[INFO] No background image, gray fill will be used"),
        }
    }

    println!();
    if all_ok {
        println!("All required tools are available. vertcut is ready.");
    } else {
        println!("Some required tools are missing. Install ffmpeg or place the binaries here.");
    }

    Ok(())
}
