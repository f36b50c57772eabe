//! Subcommand implementations.

use std::path::{Path, PathBuf};

use vertcut_common::config::AppConfig;
use vertcut_common::error::VertcutError;
use vertcut_layout_model::config::RegionConfig;
use vertcut_processing_core::FragmentSampler;
use vertcut_render_engine::discovery::find_latest_video;

pub mod batch;
pub mod check;
pub mod clip;
pub mod full;
pub mod info;
pub mod init;
pub mod validate;

/// Settings shared by every subcommand.
pub struct Context {
    pub app: AppConfig,
    pub layout_path: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Context {
    pub fn load(
        config: Option<&Path>,
        layout: Option<&Path>,
        seed: Option<u64>,
    ) -> anyhow::Result<Self> {
        let app = match config {
            Some(path) => AppConfig::load_from(path)?,
            None => AppConfig::load(),
        };
        Ok(Self {
            app,
            layout_path: layout.map(Path::to_path_buf),
            seed,
        })
    }

    /// The layout from `--layout`, or the built-in default.
    pub fn layout(&self) -> anyhow::Result<RegionConfig> {
        match &self.layout_path {
            Some(path) => Ok(RegionConfig::load(path)
                .map_err(|e| VertcutError::config(e.to_string()))?),
            None => Ok(RegionConfig::default()),
        }
    }

    pub fn sampler(&self) -> FragmentSampler {
        match self.seed {
            Some(seed) => {
                tracing::info!(seed, "Using seeded sampler");
                FragmentSampler::seeded(seed)
            }
            None => FragmentSampler::from_entropy(),
        }
    }

    /// The explicit input, or the newest unprocessed video in the input directory.
    pub fn resolve_input(&self, input: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        self.app.ensure_directories()?;
        match input {
            Some(path) => Ok(path),
            None => Ok(find_latest_video(
                &self.app.input_dir,
                &self.app.discovery,
                &self.app.naming,
            )?),
        }
    }
}
