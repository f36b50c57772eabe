//! Render a single fragment.

use std::path::PathBuf;

use vertcut_layout_model::fragment::{FragmentSpec, StartStrategy};
use vertcut_render_engine::probe::FfprobeInspector;
use vertcut_render_engine::process::{resolve_tool, SystemRunner};
use vertcut_render_engine::Pipeline;

use super::Context;

pub fn run(
    ctx: &Context,
    input: Option<PathBuf>,
    strategy: StartStrategy,
    start: f64,
    duration: Option<f64>,
) -> anyhow::Result<()> {
    let layout = ctx.layout()?;
    let source = ctx.resolve_input(input)?;
    let duration = duration.unwrap_or(ctx.app.clips.duration_secs);
    let spec = FragmentSpec::new(start, duration, strategy)?;

    let runner = SystemRunner::new();
    let inspector = FfprobeInspector::new(&runner, resolve_tool(&ctx.app.encoder.ffprobe));
    let mut pipeline =
        Pipeline::new(&layout, &ctx.app, &runner, &inspector).with_sampler(ctx.sampler());

    println!("Rendering fragment of {}", source.display());
    let clip = pipeline.run_fragment(&source, &spec)?;

    println!(
        "Fragment {:.2}s - {:.2}s",
        clip.fragment.start_secs,
        clip.fragment.end_secs()
    );
    println!("Output: {}", clip.path.display());
    Ok(())
}
