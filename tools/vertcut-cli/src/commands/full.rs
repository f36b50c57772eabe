//! Render the whole source.

use std::path::PathBuf;

use vertcut_render_engine::probe::FfprobeInspector;
use vertcut_render_engine::process::{resolve_tool, SystemRunner};
use vertcut_render_engine::Pipeline;

use super::Context;

pub fn run(ctx: &Context, input: Option<PathBuf>) -> anyhow::Result<()> {
    let layout = ctx.layout()?;
    let source = ctx.resolve_input(input)?;

    let runner = SystemRunner::new();
    let inspector = FfprobeInspector::new(&runner, resolve_tool(&ctx.app.encoder.ffprobe));
    let mut pipeline = Pipeline::new(&layout, &ctx.app, &runner, &inspector);

    println!("Rendering full video {}", source.display());
    let clip = pipeline.run_full(&source)?;
    println!("Duration: {:.1}s", clip.fragment.duration_secs);
    println!("Output: {}", clip.path.display());
    Ok(())
}
