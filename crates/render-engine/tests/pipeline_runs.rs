//! Pipeline runs against a scripted ffmpeg stand-in.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use vertcut_common::config::AppConfig;
use vertcut_common::error::{VertcutError, VertcutResult};
use vertcut_layout_model::config::RegionConfig;
use vertcut_layout_model::fragment::{ClipBatchRequest, FragmentSpec, StartStrategy};
use vertcut_layout_model::layout::{BackgroundSpec, Color};
use vertcut_processing_core::FragmentSampler;
use vertcut_render_engine::pipeline::{Pipeline, PipelineState};
use vertcut_render_engine::probe::{MediaInfo, MediaInspector};
use vertcut_render_engine::process::{Invocation, ProcessOutput, ProcessRunner, Stage};

/// Writes each invocation's output file, failing the invocations it was told to.
#[derive(Default)]
struct ScriptedRunner {
    failing_composites: HashSet<usize>,
    failing_crop_role: Option<String>,
    silent_composites: bool,
    calls: RefCell<Vec<Invocation>>,
    composites: RefCell<usize>,
}

impl ScriptedRunner {
    fn failing_composites(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing_composites: indices.into_iter().collect(),
            ..Self::default()
        }
    }

    fn stages(&self) -> Vec<Stage> {
        self.calls.borrow().iter().map(|c| c.stage.clone()).collect()
    }

    fn fragment_starts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.stage == Stage::Fragment)
            .map(|c| {
                let pos = c.args.iter().position(|a| a == "-ss").unwrap();
                c.args[pos + 1].clone()
            })
            .collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> VertcutResult<ProcessOutput> {
        self.calls.borrow_mut().push(invocation.clone());

        let fail = match &invocation.stage {
            Stage::Composite => {
                let mut count = self.composites.borrow_mut();
                let index = *count;
                *count += 1;
                self.failing_composites.contains(&index)
            }
            Stage::Crop { role } => self.failing_crop_role.as_deref() == Some(role.as_str()),
            _ => false,
        };

        let silent = self.silent_composites && invocation.stage == Stage::Composite;
        if let Some(output) = invocation.output.as_ref().filter(|_| !silent) {
            // A failed encode may still leave a truncated file behind.
            std::fs::write(output, if fail { &b"partial"[..] } else { &b"encoded"[..] })?;
        }

        if fail {
            return Err(VertcutError::ExternalProcess {
                description: invocation.description.clone(),
                status: "exit status: 1".to_string(),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(ProcessOutput::default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct FixedInspector {
    duration_secs: f64,
    width: u32,
    height: u32,
}

impl FixedInspector {
    fn hd(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            width: 1280,
            height: 720,
        }
    }
}

impl MediaInspector for FixedInspector {
    fn inspect(&self, path: &Path) -> VertcutResult<MediaInfo> {
        Ok(MediaInfo {
            path: path.to_path_buf(),
            duration_secs: self.duration_secs,
            width: self.width,
            height: self.height,
            fps: 60.0,
            has_audio: true,
        })
    }
}

struct Workspace {
    _root: tempfile::TempDir,
    app: AppConfig,
    source: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let mut app = AppConfig::default();
        app.input_dir = root.path().join("input");
        app.output_dir = root.path().join("output");
        app.temp_dir = Some(root.path().join("work"));
        app.discovery.discover_background = false;
        let source = app.input_dir.join("stream.mov");
        Self {
            _root: root,
            app,
            source,
        }
    }

    fn leftover_temp_files(&self) -> usize {
        let dir = self.app.temp_dir.as_ref().unwrap();
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    fn outputs(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.app.output_dir)
            .map(|d| d.flatten().map(|e| e.path()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }
}

#[test]
fn batch_of_twenty_with_three_failures_succeeds() {
    let ws = Workspace::new();
    let layout = RegionConfig::default();
    let runner = ScriptedRunner::failing_composites([2, 9, 15]);
    let inspector = FixedInspector::hd(600.0);

    let mut pipeline =
        Pipeline::new(&layout, &ws.app, &runner, &inspector).with_sampler(FragmentSampler::seeded(5));
    let report = pipeline
        .run_batch(&ws.source, &ClipBatchRequest::new(20, 15.0).unwrap())
        .unwrap();

    assert_eq!(report.total, 20);
    assert_eq!(report.successful, 17);
    assert!(report.is_success());
    let failed: Vec<usize> = report.failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![2, 9, 15]);
    assert!(report.failures[0].error.contains("simulated failure"));

    // Partial composites are removed; only successful clips remain.
    assert_eq!(ws.outputs().len(), 17);
    assert_eq!(ws.outputs(), {
        let mut expected = report.outputs.clone();
        expected.sort();
        expected
    });
    assert_eq!(ws.leftover_temp_files(), 0);
}

#[test]
fn batch_with_every_clip_failing_is_not_success() {
    let ws = Workspace::new();
    let layout = RegionConfig::default();
    let runner = ScriptedRunner::failing_composites(0..20);
    let inspector = FixedInspector::hd(600.0);

    let mut pipeline = Pipeline::new(&layout, &ws.app, &runner, &inspector);
    let report = pipeline
        .run_batch(&ws.source, &ClipBatchRequest::new(20, 15.0).unwrap())
        .unwrap();

    assert_eq!(report.successful, 0);
    assert_eq!(report.failures.len(), 20);
    assert!(!report.is_success());
    assert!(ws.outputs().is_empty());
    assert_eq!(ws.leftover_temp_files(), 0);
}

#[test]
fn clean_exit_without_composite_output_counts_as_failure() {
    let ws = Workspace::new();
    let layout = RegionConfig::default();
    let runner = ScriptedRunner {
        silent_composites: true,
        ..ScriptedRunner::default()
    };
    let inspector = FixedInspector::hd(600.0);

    let mut pipeline = Pipeline::new(&layout, &ws.app, &runner, &inspector);
    let report = pipeline
        .run_batch(&ws.source, &ClipBatchRequest::new(3, 15.0).unwrap())
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.successful, 0);
    assert!(report.outputs.is_empty());
    assert_eq!(report.failures.len(), 3);
    assert!(report.failures[0].error.contains("no output produced"));
    assert!(ws.outputs().is_empty());
    assert_eq!(ws.leftover_temp_files(), 0);
}

#[test]
fn batch_clips_are_named_and_limited() {
    let ws = Workspace::new();
    let layout = RegionConfig::default();
    let runner = ScriptedRunner::default();
    let inspector = FixedInspector::hd(120.0);

    let mut pipeline =
        Pipeline::new(&layout, &ws.app, &runner, &inspector).with_sampler(FragmentSampler::seeded(9));
    let report = pipeline
        .run_batch(&ws.source, &ClipBatchRequest::new(3, 15.0).unwrap())
        .unwrap();

    let names: Vec<String> = report
        .outputs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    for (i, name) in names.iter().enumerate() {
        assert!(name.starts_with(&format!("processed_stream_clip_{:02}_", i + 1)), "{name}");
        assert!(name.ends_with(".mp4"));
    }

    let calls = runner.calls.borrow();
    let composite = calls.iter().find(|c| c.stage == Stage::Composite).unwrap();
    assert!(composite.args.windows(2).any(|w| w == ["-t", "15.000"]));
    drop(calls);

    let starts: Vec<f64> = runner
        .fragment_starts()
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    assert_eq!(starts.len(), 3);
    assert!(starts.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn seeded_batches_cut_identical_fragments() {
    let layout = RegionConfig::default();
    let inspector = FixedInspector::hd(900.0);
    let request = ClipBatchRequest::new(6, 20.0).unwrap();

    let run = || {
        let ws = Workspace::new();
        let runner = ScriptedRunner::default();
        Pipeline::new(&layout, &ws.app, &runner, &inspector)
            .with_sampler(FragmentSampler::seeded(77))
            .run_batch(&ws.source, &request)
            .unwrap();
        runner.fragment_starts()
    };
    assert_eq!(run(), run());
}

#[test]
fn fragment_run_walks_every_state() {
    let ws = Workspace::new();
    let layout = RegionConfig::default();
    let runner = ScriptedRunner::default();
    let inspector = FixedInspector::hd(100.0);

    let mut pipeline = Pipeline::new(&layout, &ws.app, &runner, &inspector);
    let spec = FragmentSpec::new(0.0, 20.0, StartStrategy::Centered).unwrap();
    let clip = pipeline.run_fragment(&ws.source, &spec).unwrap();

    assert_eq!(clip.fragment.start_secs, 40.0);
    assert!(clip
        .path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("processed_stream_test_"));
    assert_eq!(
        clip.trace.history(),
        &[
            PipelineState::Discovered,
            PipelineState::InfoFetched,
            PipelineState::Validated,
            PipelineState::FragmentExtracted,
            PipelineState::RegionsCropped,
            PipelineState::Composited,
            PipelineState::Cleaned,
            PipelineState::Done,
        ]
    );
    assert_eq!(
        runner.stages(),
        vec![
            Stage::Fragment,
            Stage::Crop {
                role: "camera".to_string()
            },
            Stage::Crop {
                role: "subtitles".to_string()
            },
            Stage::Crop {
                role: "game".to_string()
            },
            Stage::Composite,
        ]
    );
    assert!(runner.fragment_starts() == vec!["40.000".to_string()]);
    assert_eq!(ws.leftover_temp_files(), 0);
}

#[test]
fn full_run_crops_the_source_directly() {
    let ws = Workspace::new();
    let layout = RegionConfig::default();
    let runner = ScriptedRunner::default();
    let inspector = FixedInspector::hd(42.0);

    let mut pipeline = Pipeline::new(&layout, &ws.app, &runner, &inspector);
    let clip = pipeline.run_full(&ws.source).unwrap();

    let name = clip.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("processed_stream_2"), "{name}");
    assert!(!runner.stages().contains(&Stage::Fragment));

    let calls = runner.calls.borrow();
    let source = ws.source.display().to_string();
    let crop = calls
        .iter()
        .find(|c| matches!(c.stage, Stage::Crop { .. }))
        .unwrap();
    assert!(crop.args.windows(2).any(|w| w[0] == "-i" && w[1] == source));
    let composite = calls.iter().find(|c| c.stage == Stage::Composite).unwrap();
    assert!(!composite.args.contains(&"-t".to_string()));
}

#[test]
fn out_of_bounds_source_is_rejected_before_any_crop() {
    let ws = Workspace::new();
    let layout = RegionConfig::default();
    let runner = ScriptedRunner::default();
    let inspector = FixedInspector {
        duration_secs: 100.0,
        width: 854,
        height: 480,
    };

    let mut pipeline = Pipeline::new(&layout, &ws.app, &runner, &inspector);
    let err = pipeline
        .run_fragment(&ws.source, &FragmentSpec::random(15.0).unwrap())
        .unwrap_err();

    assert!(matches!(err, VertcutError::OutOfBounds { .. }));
    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn crop_failure_skips_composite_and_cleans_up() {
    let ws = Workspace::new();
    let layout = RegionConfig::default();
    let runner = ScriptedRunner {
        failing_crop_role: Some("subtitles".to_string()),
        ..ScriptedRunner::default()
    };
    let inspector = FixedInspector::hd(100.0);

    let mut pipeline = Pipeline::new(&layout, &ws.app, &runner, &inspector);
    let err = pipeline
        .run_fragment(&ws.source, &FragmentSpec::random(10.0).unwrap())
        .unwrap_err();

    assert!(matches!(err, VertcutError::ExternalProcess { .. }));
    assert!(!runner.stages().contains(&Stage::Composite));
    assert_eq!(ws.leftover_temp_files(), 0);
    assert!(ws.outputs().is_empty());
}

#[test]
fn short_source_cannot_fill_a_batch() {
    let ws = Workspace::new();
    let layout = RegionConfig::default();
    let runner = ScriptedRunner::default();
    let inspector = FixedInspector::hd(10.0);

    let mut pipeline = Pipeline::new(&layout, &ws.app, &runner, &inspector);
    let err = pipeline
        .run_batch(&ws.source, &ClipBatchRequest::new(5, 15.0).unwrap())
        .unwrap_err();
    assert!(matches!(err, VertcutError::InsufficientDuration { .. }));
    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn layout_background_reaches_the_filter_graph() {
    let ws = Workspace::new();
    let mut layout = RegionConfig::default();
    layout.canvas.background = Some(BackgroundSpec::Color {
        color: Color::rgb(0x10, 0x20, 0x30),
    });
    let runner = ScriptedRunner::default();
    let inspector = FixedInspector::hd(100.0);

    let mut pipeline = Pipeline::new(&layout, &ws.app, &runner, &inspector);
    pipeline
        .run_fragment(&ws.source, &FragmentSpec::random(10.0).unwrap())
        .unwrap();

    let calls = runner.calls.borrow();
    let composite = calls.iter().find(|c| c.stage == Stage::Composite).unwrap();
    let pos = composite
        .args
        .iter()
        .position(|a| a == "-filter_complex")
        .unwrap();
    assert!(composite.args[pos + 1].starts_with("color=c=0x102030:s=1080x1920:r=30[bg]"));
}
