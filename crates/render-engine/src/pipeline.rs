//! Per-source clip pipeline.
//!
//! ```text
//! Discovered -> InfoFetched -> Validated -> FragmentExtracted
//!            -> RegionsCropped -> Composited -> Cleaned -> Done
//! ```
//!
//! Any step may move to `Failed`. Intermediate files live in an
//! [`ArtifactSet`] and are removed on every exit path.

use std::fmt;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use vertcut_common::config::AppConfig;
use vertcut_common::error::VertcutResult;
use vertcut_layout_model::config::RegionConfig;
use vertcut_layout_model::fragment::{ClipBatchRequest, Fragment, FragmentSpec};
use vertcut_layout_model::layout::BackgroundSpec;
use vertcut_processing_core::{validate_regions, FragmentSampler};

use crate::compositor::{CompositionPlanner, CroppedMedia};
use crate::discovery::{batch_suffix, find_background_image, output_path, timestamp_now};
use crate::ffmpeg::{composite_args, crop_args, fragment_args};
use crate::probe::{MediaInfo, MediaInspector};
use crate::process::{resolve_tool, verify_output, Invocation, ProcessRunner, Stage};

/// Output suffix for single-fragment runs.
pub const FRAGMENT_SUFFIX: &str = "test";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Discovered,
    InfoFetched,
    Validated,
    FragmentExtracted,
    RegionsCropped,
    Composited,
    Cleaned,
    Done,
    Failed,
}

impl PipelineState {
    /// The state that follows on success, if any.
    pub fn next(self) -> Option<Self> {
        use PipelineState::*;
        match self {
            Discovered => Some(InfoFetched),
            InfoFetched => Some(Validated),
            Validated => Some(FragmentExtracted),
            FragmentExtracted => Some(RegionsCropped),
            RegionsCropped => Some(Composited),
            Composited => Some(Cleaned),
            Cleaned => Some(Done),
            Done | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Ordered record of the states one clip passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTrace {
    history: Vec<PipelineState>,
}

impl Default for StateTrace {
    fn default() -> Self {
        Self {
            history: vec![PipelineState::Discovered],
        }
    }
}

impl StateTrace {
    pub fn current(&self) -> PipelineState {
        self.history
            .last()
            .copied()
            .unwrap_or(PipelineState::Discovered)
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert_eq!(self.current().next(), Some(next));
        tracing::debug!(from = %self.current(), to = %next, "Pipeline state");
        self.history.push(next);
    }

    fn fail(&mut self) {
        if !self.current().is_terminal() {
            tracing::debug!(from = %self.current(), "Pipeline state -> Failed");
            self.history.push(PipelineState::Failed);
        }
    }
}

/// Temporary files owned by one clip. Dropping the set deletes them.
pub struct ArtifactSet {
    dir: PathBuf,
    paths: Vec<TempPath>,
}

impl ArtifactSet {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            paths: Vec::new(),
        })
    }

    /// Reserve a uniquely named file for an intermediate stream.
    pub fn create(&mut self, label: &str) -> std::io::Result<PathBuf> {
        let label: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let temp = tempfile::Builder::new()
            .prefix(&format!("vertcut-{label}-"))
            .suffix(".mkv")
            .tempfile_in(&self.dir)?
            .into_temp_path();
        let path = temp.to_path_buf();
        self.paths.push(temp);
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every held file. Returns how many were removed.
    pub fn release(&mut self) -> usize {
        let mut removed = 0;
        for temp in self.paths.drain(..) {
            let path = temp.to_path_buf();
            match temp.close() {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file");
                }
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "Temp files removed");
        }
        removed
    }
}

impl Drop for ArtifactSet {
    fn drop(&mut self) {
        self.release();
    }
}

/// A produced clip.
#[derive(Debug, Clone)]
pub struct ClipOutput {
    pub path: PathBuf,
    pub fragment: Fragment,
    pub trace: StateTrace,
}

#[derive(Debug, Clone)]
pub struct ClipFailure {
    /// 0-based clip index within the batch.
    pub index: usize,
    pub start_secs: f64,
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total: usize,
    pub successful: usize,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<ClipFailure>,
}

impl BatchReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// A batch succeeds when at least one clip was produced.
    pub fn is_success(&self) -> bool {
        self.successful > 0
    }
}

/// Runs clips for one region configuration.
pub struct Pipeline<'a> {
    layout: &'a RegionConfig,
    app: &'a AppConfig,
    runner: &'a dyn ProcessRunner,
    inspector: &'a dyn MediaInspector,
    sampler: FragmentSampler,
    background: Option<BackgroundSpec>,
    ffmpeg: PathBuf,
    temp_dir: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        layout: &'a RegionConfig,
        app: &'a AppConfig,
        runner: &'a dyn ProcessRunner,
        inspector: &'a dyn MediaInspector,
    ) -> Self {
        let background = layout.canvas.background.clone().or_else(|| {
            if app.discovery.discover_background {
                find_background_image(&app.discovery).map(|path| BackgroundSpec::Image { path })
            } else {
                None
            }
        });

        Self {
            layout,
            app,
            runner,
            inspector,
            sampler: FragmentSampler::from_entropy(),
            background,
            ffmpeg: resolve_tool(&app.encoder.ffmpeg),
            temp_dir: app.resolved_temp_dir(),
        }
    }

    pub fn with_sampler(mut self, sampler: FragmentSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Override the resolved background.
    pub fn with_background(mut self, background: Option<BackgroundSpec>) -> Self {
        self.background = background;
        self
    }

    pub fn background(&self) -> Option<&BackgroundSpec> {
        self.background.as_ref()
    }

    /// One clip chosen by `spec`.
    pub fn run_fragment(&mut self, source: &Path, spec: &FragmentSpec) -> VertcutResult<ClipOutput> {
        let (info, mut trace) = self.prepare(source)?;
        let fragment = self.sampler.single_fragment(info.duration_secs, spec);
        let path = self.run_clip(&info, &fragment, Some(FRAGMENT_SUFFIX), None, &mut trace)?;
        Ok(ClipOutput {
            path,
            fragment,
            trace,
        })
    }

    /// The whole source as one clip.
    pub fn run_full(&mut self, source: &Path) -> VertcutResult<ClipOutput> {
        let (info, mut trace) = self.prepare(source)?;
        let fragment = Fragment {
            start_secs: 0.0,
            duration_secs: info.duration_secs,
        };
        let path = self.run_clip(&info, &fragment, None, None, &mut trace)?;
        Ok(ClipOutput {
            path,
            fragment,
            trace,
        })
    }

    /// `request.count` random clips. Failed clips are recorded and skipped.
    pub fn run_batch(
        &mut self,
        source: &Path,
        request: &ClipBatchRequest,
    ) -> VertcutResult<BatchReport> {
        let (info, trace) = self.prepare(source)?;
        let starts = self.sampler.batch_for(info.duration_secs, request)?;
        let mut report = BatchReport::new(starts.len());

        for (index, start_secs) in starts.into_iter().enumerate() {
            tracing::info!(
                clip = index + 1,
                total = report.total,
                start_secs,
                "Processing clip"
            );
            let fragment = Fragment {
                start_secs,
                duration_secs: request.duration_secs,
            };
            let suffix = batch_suffix(index);
            let mut clip_trace = trace.clone();

            match self.run_clip(
                &info,
                &fragment,
                Some(&suffix),
                Some(request.duration_secs),
                &mut clip_trace,
            ) {
                Ok(path) => {
                    report.successful += 1;
                    report.outputs.push(path);
                }
                Err(e) => {
                    tracing::error!(clip = index + 1, error = %e, "Clip failed, continuing");
                    report.failures.push(ClipFailure {
                        index,
                        start_secs,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            successful = report.successful,
            total = report.total,
            "Batch finished"
        );
        Ok(report)
    }

    fn prepare(&self, source: &Path) -> VertcutResult<(MediaInfo, StateTrace)> {
        let mut trace = StateTrace::default();
        tracing::info!(source = %source.display(), "Processing source");

        let info = self.inspector.inspect(source)?;
        trace.advance(PipelineState::InfoFetched);

        validate_regions(info.width, info.height, self.layout.regions())?;
        trace.advance(PipelineState::Validated);

        std::fs::create_dir_all(&self.app.output_dir)?;
        Ok((info, trace))
    }

    fn run_clip(
        &self,
        info: &MediaInfo,
        fragment: &Fragment,
        suffix: Option<&str>,
        duration_limit: Option<f64>,
        trace: &mut StateTrace,
    ) -> VertcutResult<PathBuf> {
        let mut artifacts = ArtifactSet::new(&self.temp_dir)?;
        let result = self.produce(&mut artifacts, info, fragment, suffix, duration_limit, trace);
        artifacts.release();

        match result {
            Ok(path) => {
                trace.advance(PipelineState::Cleaned);
                trace.advance(PipelineState::Done);
                tracing::info!(output = %path.display(), "Clip written");
                Ok(path)
            }
            Err(e) => {
                trace.fail();
                Err(e)
            }
        }
    }

    fn produce(
        &self,
        artifacts: &mut ArtifactSet,
        info: &MediaInfo,
        fragment: &Fragment,
        suffix: Option<&str>,
        duration_limit: Option<f64>,
        trace: &mut StateTrace,
    ) -> VertcutResult<PathBuf> {
        let encoder = &self.app.encoder;

        let whole_source = fragment.start_secs <= 0.0 && fragment.end_secs() >= info.duration_secs;
        let input = if whole_source {
            tracing::debug!("Fragment covers the whole source, cropping directly");
            info.path.clone()
        } else {
            let path = artifacts.create("fragment")?;
            self.run_ffmpeg(
                Stage::Fragment,
                fragment_args(&info.path, fragment, &path),
                &path,
                format!(
                    "Extract {:.2}s-{:.2}s",
                    fragment.start_secs,
                    fragment.end_secs()
                ),
            )?;
            path
        };
        trace.advance(PipelineState::FragmentExtracted);

        let mut media = Vec::with_capacity(self.layout.layout().len());
        for region in self.layout.regions() {
            let path = artifacts.create(&region.role)?;
            self.run_ffmpeg(
                Stage::Crop {
                    role: region.role.clone(),
                },
                crop_args(&input, &region.rect, encoder, &path),
                &path,
                format!("Crop {}", region.role),
            )?;
            media.push(CroppedMedia::new(region.role.clone(), path));
        }
        trace.advance(PipelineState::RegionsCropped);

        let plan = CompositionPlanner::new(self.layout).plan(
            &media,
            self.background.as_ref(),
            duration_limit,
        )?;
        let output = output_path(
            &self.app.output_dir,
            &info.path,
            &self.app.naming,
            suffix,
            &timestamp_now(),
        );

        if let Err(e) = self.run_ffmpeg(
            Stage::Composite,
            composite_args(&plan, encoder, &output),
            &output,
            format!("Composite {}", output.display()),
        ) {
            remove_partial(&output);
            return Err(e);
        }
        trace.advance(PipelineState::Composited);
        Ok(output)
    }

    fn run_ffmpeg(
        &self,
        stage: Stage,
        args: Vec<String>,
        output: &Path,
        description: String,
    ) -> VertcutResult<()> {
        let invocation = Invocation {
            program: self.ffmpeg.clone(),
            args,
            stage,
            description,
            output: Some(output.to_path_buf()),
        };
        self.runner.run(&invocation)?;
        verify_output(&invocation)
    }
}

fn remove_partial(output: &Path) {
    if !output.exists() {
        return;
    }
    match std::fs::remove_file(output) {
        Ok(()) => tracing::info!(path = %output.display(), "Removed partial output"),
        Err(e) => tracing::warn!(
            path = %output.display(),
            error = %e,
            "Failed to remove partial output"
        ),
    }
}
