//! Render a batch of random clips.

use std::path::PathBuf;

use vertcut_layout_model::fragment::ClipBatchRequest;
use vertcut_render_engine::probe::FfprobeInspector;
use vertcut_render_engine::process::{resolve_tool, SystemRunner};
use vertcut_render_engine::Pipeline;

use super::Context;

pub fn run(
    ctx: &Context,
    input: Option<PathBuf>,
    count: Option<usize>,
    duration: Option<f64>,
) -> anyhow::Result<()> {
    let layout = ctx.layout()?;
    let source = ctx.resolve_input(input)?;
    let request = ClipBatchRequest::new(
        count.unwrap_or(ctx.app.clips.batch_count),
        duration.unwrap_or(ctx.app.clips.duration_secs),
    )?;

    let runner = SystemRunner::new();
    let inspector = FfprobeInspector::new(&runner, resolve_tool(&ctx.app.encoder.ffprobe));
    let mut pipeline =
        Pipeline::new(&layout, &ctx.app, &runner, &inspector).with_sampler(ctx.sampler());

    println!(
        "Rendering {} clips of {:.1}s from {}",
        request.count,
        request.duration_secs,
        source.display()
    );
    let report = pipeline.run_batch(&source, &request)?;

    println!();
    println!("Created {}/{} clips", report.successful, report.total);
    for path in &report.outputs {
        println!("  {}", path.display());
    }
    if !report.failures.is_empty() {
        println!();
        println!("Failed clips:");
        for failure in &report.failures {
            println!(
                "  clip {:02} at {:.2}s: {}",
                failure.index + 1,
                failure.start_secs,
                failure.error
            );
        }
    }

    if !report.is_success() {
        anyhow::bail!("no clips were created");
    }
    Ok(())
}
