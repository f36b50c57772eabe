//! Vertcut Render Engine
//!
//! Drives ffmpeg to turn one horizontal recording into vertical clips:
//! cut a time window, crop every layout region out of it, and composite
//! the regions onto the output canvas.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source.mov ──┐
//!              ├── Inspect (ffprobe) ── Bounds check
//! layout ──────┘                │
//!                               ├── Fragment (-ss/-t, stream copy)
//!                               │         │
//!                               │         ├── Crop region 1 ─┐
//!                               │         ├── Crop region 2 ─┤
//!                               │         └── Crop region N ─┤
//!                               │                            │
//! background ───────────────────┴────────── Composite ◄──────┘
//!                                               │
//!                                               ▼
//!                                   processed_<stem>_<ts>.mp4
//! ```

pub mod compositor;
pub mod discovery;
pub mod ffmpeg;
pub mod pipeline;
pub mod probe;
pub mod process;

pub use compositor::{CompositionPlan, CompositionPlanner, CroppedMedia, PlanOp};
pub use pipeline::{BatchReport, ClipOutput, Pipeline, PipelineState};
pub use probe::{FfprobeInspector, MediaInfo, MediaInspector};
pub use process::{ProcessRunner, SystemRunner};
