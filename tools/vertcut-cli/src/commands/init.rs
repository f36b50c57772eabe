//! Write default config and layout files.

use std::path::PathBuf;

use vertcut_common::config::config_file_path;
use vertcut_layout_model::config::RegionConfig;

use super::Context;

pub fn run(
    ctx: &Context,
    config_path: Option<PathBuf>,
    output: PathBuf,
    force: bool,
) -> anyhow::Result<()> {
    let config_path = config_path.unwrap_or_else(config_file_path);
    let layout_path = output.join("layout.json");

    for path in [&config_path, &layout_path] {
        if path.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }
    }

    ctx.app
        .save_to(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", config_path.display()))?;
    RegionConfig::default()
        .save(&layout_path)
        .map_err(|e| anyhow::anyhow!("Failed to write layout: {e}"))?;
    ctx.app.ensure_directories()?;

    println!("Initialized vertcut:");
    println!("  Config: {}", config_path.display());
    println!("  Layout: {}", layout_path.display());
    println!("  Input:  {}/", ctx.app.input_dir.display());
    println!("  Output: {}/", ctx.app.output_dir.display());
    println!();
    println!("Place recordings in the input directory, then run:");
    println!("  vertcut --layout {} batch", layout_path.display());

    Ok(())
}
