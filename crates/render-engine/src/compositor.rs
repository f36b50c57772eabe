//! Composition planning.
//!
//! Turns a layout plus the cropped per-region media into a typed
//! [`CompositionPlan`]. The plan knows nothing about ffmpeg syntax; see
//! [`crate::ffmpeg`] for serialization.

use std::path::{Path, PathBuf};

use vertcut_common::error::{VertcutError, VertcutResult};
use vertcut_layout_model::config::RegionConfig;
use vertcut_layout_model::layout::{BackgroundSpec, Canvas, Color};

/// A cropped region stream ready for composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedMedia {
    pub role: String,
    pub path: PathBuf,
}

impl CroppedMedia {
    pub fn new(role: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            role: role.into(),
            path: path.into(),
        }
    }
}

/// One input of the composite invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanInput {
    /// A regular media file.
    Media { path: PathBuf, role: String },
    /// A still image repeated for the duration of the composite.
    LoopedImage { path: PathBuf },
}

/// Named intermediate stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pad {
    Base,
    /// Layer `n` after frame rate normalization.
    Normalized(usize),
    /// Layer `n` after scaling.
    Scaled(usize),
    /// Composite after layer `n` has been overlaid.
    Stage(usize),
    Output,
}

/// Where an op reads its frames from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Input(usize),
    Pad(Pad),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanOp {
    Fill {
        color: Color,
        width: u32,
        height: u32,
        fps: u32,
        duration_secs: Option<f64>,
        output: Pad,
    },
    StretchImage {
        source: Source,
        width: u32,
        height: u32,
        fps: u32,
        output: Pad,
    },
    NormalizeFps {
        source: Source,
        fps: u32,
        output: Pad,
    },
    Scale {
        source: Source,
        width: u32,
        height: u32,
        output: Pad,
    },
    OverlayAt {
        base: Pad,
        top: Pad,
        x: u32,
        y: u32,
        shortest: bool,
        output: Pad,
    },
}

impl PlanOp {
    pub fn output(&self) -> Pad {
        match self {
            PlanOp::Fill { output, .. }
            | PlanOp::StretchImage { output, .. }
            | PlanOp::NormalizeFps { output, .. }
            | PlanOp::Scale { output, .. }
            | PlanOp::OverlayAt { output, .. } => *output,
        }
    }
}

/// How the base layer was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseLayer {
    Image(PathBuf),
    Color(Color),
    /// The configured image was missing; mid-gray was used instead.
    FallbackGray,
}

/// A complete, engine-agnostic composite description.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub inputs: Vec<PlanInput>,
    pub ops: Vec<PlanOp>,

    /// Input index whose audio becomes the output audio.
    pub audio_input: usize,

    pub base: BaseLayer,
    pub duration_limit: Option<f64>,
}

/// Builds [`CompositionPlan`]s for one region configuration.
pub struct CompositionPlanner<'a> {
    config: &'a RegionConfig,
}

impl<'a> CompositionPlanner<'a> {
    pub fn new(config: &'a RegionConfig) -> Self {
        Self { config }
    }

    /// Plan the composite.
    ///
    /// Every layout role must have a valid handle in `media`; otherwise no plan
    /// is produced at all.
    pub fn plan(
        &self,
        media: &[CroppedMedia],
        background: Option<&BackgroundSpec>,
        duration_limit: Option<f64>,
    ) -> VertcutResult<CompositionPlan> {
        let canvas = &self.config.canvas;
        let layers = self.config.layout().paint_order();

        let mut handles = Vec::with_capacity(layers.len());
        for entry in &layers {
            let role = entry.region.role.as_str();
            let handle = media
                .iter()
                .find(|m| m.role == role)
                .ok_or_else(|| {
                    VertcutError::composition(format!("no cropped media for region '{role}'"))
                })?;
            check_handle(handle)?;
            handles.push(handle);
        }

        let mut inputs = Vec::new();
        let mut ops = Vec::new();

        let base = match background {
            Some(BackgroundSpec::Image { path }) if path.is_file() => {
                inputs.push(PlanInput::LoopedImage { path: path.clone() });
                ops.push(PlanOp::StretchImage {
                    source: Source::Input(0),
                    width: canvas.width,
                    height: canvas.height,
                    fps: canvas.fps,
                    output: Pad::Base,
                });
                BaseLayer::Image(path.clone())
            }
            Some(BackgroundSpec::Image { path }) => {
                tracing::warn!(
                    path = %path.display(),
                    "Background image not found, using gray fill"
                );
                ops.push(canvas_fill(canvas, Color::MID_GRAY, duration_limit));
                BaseLayer::FallbackGray
            }
            Some(BackgroundSpec::Color { color }) => {
                ops.push(canvas_fill(canvas, *color, duration_limit));
                BaseLayer::Color(*color)
            }
            None => {
                tracing::debug!("No background, using gray fill");
                ops.push(canvas_fill(canvas, Color::MID_GRAY, duration_limit));
                BaseLayer::Color(Color::MID_GRAY)
            }
        };

        let mut audio_input = None;
        let mut composite = Pad::Base;
        let last = layers.len().saturating_sub(1);

        for (n, (entry, handle)) in layers.iter().zip(&handles).enumerate() {
            let input = inputs.len();
            inputs.push(PlanInput::Media {
                path: handle.path.clone(),
                role: handle.role.clone(),
            });
            if entry.region.role == self.config.primary_role {
                audio_input = Some(input);
            }

            let target = entry.placement.target_rect(&entry.region.rect);
            let output = if n == last {
                Pad::Output
            } else {
                Pad::Stage(n)
            };

            ops.push(PlanOp::NormalizeFps {
                source: Source::Input(input),
                fps: canvas.fps,
                output: Pad::Normalized(n),
            });
            ops.push(PlanOp::Scale {
                source: Source::Pad(Pad::Normalized(n)),
                width: target.width,
                height: target.height,
                output: Pad::Scaled(n),
            });
            ops.push(PlanOp::OverlayAt {
                base: composite,
                top: Pad::Scaled(n),
                x: target.x,
                y: target.y,
                shortest: true,
                output,
            });
            composite = output;
        }

        let audio_input = audio_input.ok_or_else(|| {
            VertcutError::composition(format!(
                "primary region '{}' has no cropped media",
                self.config.primary_role
            ))
        })?;

        tracing::debug!(
            inputs = inputs.len(),
            ops = ops.len(),
            base = ?base,
            "Composition planned"
        );

        Ok(CompositionPlan {
            width: canvas.width,
            height: canvas.height,
            fps: canvas.fps,
            inputs,
            ops,
            audio_input,
            base,
            duration_limit,
        })
    }
}

fn canvas_fill(canvas: &Canvas, color: Color, duration_secs: Option<f64>) -> PlanOp {
    PlanOp::Fill {
        color,
        width: canvas.width,
        height: canvas.height,
        fps: canvas.fps,
        duration_secs,
        output: Pad::Base,
    }
}

fn check_handle(handle: &CroppedMedia) -> VertcutResult<()> {
    let len = file_len(&handle.path).ok_or_else(|| {
        VertcutError::composition(format!(
            "cropped media for '{}' is missing: {}",
            handle.role,
            handle.path.display()
        ))
    })?;
    if len == 0 {
        return Err(VertcutError::composition(format!(
            "cropped media for '{}' is empty: {}",
            handle.role,
            handle.path.display()
        )));
    }
    Ok(())
}

fn file_len(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
}
