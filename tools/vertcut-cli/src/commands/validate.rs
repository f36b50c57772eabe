//! Validate a layout file.

use std::path::PathBuf;

use vertcut_layout_model::config::RegionConfig;

pub fn run(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = match &path {
        Some(path) => {
            println!("Validating layout at: {}", path.display());
            RegionConfig::load(path).map_err(|e| anyhow::anyhow!("Layout is invalid: {e}"))?
        }
        None => {
            println!("No --layout given, validating the built-in default");
            let config = RegionConfig::default();
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("Layout is invalid: {e}"))?;
            config
        }
    };

    println!(
        "  Canvas: {}x{} @ {}fps",
        config.canvas.width, config.canvas.height, config.canvas.fps
    );
    println!("  Regions: {}", config.layout().len());
    println!("  Primary (audio) role: {}", config.primary_role);
    match &config.canvas.background {
        Some(background) => println!("  Background: {background:?}"),
        None => println!("  Background: discovered or gray"),
    }

    println!("\nLayout is valid.");
    Ok(())
}
