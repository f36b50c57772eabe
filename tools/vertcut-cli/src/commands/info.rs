//! Show media information for a source and check the layout against it.

use std::path::PathBuf;

use vertcut_processing_core::validate_regions;
use vertcut_render_engine::probe::{FfprobeInspector, MediaInspector};
use vertcut_render_engine::process::{resolve_tool, SystemRunner};

use super::Context;

pub fn run(ctx: &Context, input: Option<PathBuf>) -> anyhow::Result<()> {
    let layout = ctx.layout()?;
    let source = ctx.resolve_input(input)?;

    let runner = SystemRunner::new();
    let inspector = FfprobeInspector::new(&runner, resolve_tool(&ctx.app.encoder.ffprobe));
    let info = inspector.inspect(&source)?;

    println!("Source: {}", source.display());
    println!("  Resolution: {}x{} @ {:.2}fps", info.width, info.height, info.fps);
    println!("  Duration: {:.2}s", info.duration_secs);
    println!("  Audio: {}", if info.has_audio { "yes" } else { "no" });
    println!();

    println!(
        "Canvas: {}x{} @ {}fps",
        layout.canvas.width, layout.canvas.height, layout.canvas.fps
    );
    println!("Regions (paint order):");
    for entry in layout.layout().paint_order() {
        let r = entry.region.rect;
        let p = entry.placement.rect;
        println!(
            "  [{}] {:<10} crop {}x{}+{}+{} -> {}x{}+{}+{} ({:?}){}",
            entry.z_order,
            entry.region.role,
            r.width,
            r.height,
            r.x,
            r.y,
            p.width,
            p.height,
            p.x,
            p.y,
            entry.placement.scale,
            if entry.region.role == layout.primary_role {
                " audio"
            } else {
                ""
            }
        );
    }
    println!();

    match validate_regions(info.width, info.height, layout.regions()) {
        Ok(()) => println!("All regions fit the source frame."),
        Err(e) => println!("[WARN] {e}"),
    }
    if info.duration_secs < ctx.app.clips.duration_secs {
        println!(
            "[WARN] Source is shorter than the default clip duration ({:.1}s)",
            ctx.app.clips.duration_secs
        );
    }

    Ok(())
}
