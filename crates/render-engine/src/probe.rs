//! Media inspection via ffprobe.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use vertcut_common::error::{VertcutError, VertcutResult};

use crate::process::{Invocation, ProcessRunner, Stage};

/// Frame rate assumed when the stream does not report one.
pub const FALLBACK_FPS: f64 = 30.0;

/// Properties of a source's primary video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub has_audio: bool,
}

/// Anything that can report [`MediaInfo`] for a file.
pub trait MediaInspector {
    fn inspect(&self, path: &Path) -> VertcutResult<MediaInfo>;
}

/// Inspector backed by an `ffprobe` binary.
pub struct FfprobeInspector<'a> {
    runner: &'a dyn ProcessRunner,
    ffprobe: PathBuf,
}

impl<'a> FfprobeInspector<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            ffprobe: ffprobe.into(),
        }
    }

    fn invocation(&self, path: &Path) -> Invocation {
        Invocation {
            program: self.ffprobe.clone(),
            args: vec![
                "-v".to_string(),
                "error".to_string(),
                "-print_format".to_string(),
                "json".to_string(),
                "-show_format".to_string(),
                "-show_streams".to_string(),
                path.display().to_string(),
            ],
            stage: Stage::Probe,
            description: format!("ffprobe {}", path.display()),
            output: None,
        }
    }
}

impl MediaInspector for FfprobeInspector<'_> {
    fn inspect(&self, path: &Path) -> VertcutResult<MediaInfo> {
        if !path.is_file() {
            return Err(VertcutError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = self
            .runner
            .run(&self.invocation(path))
            .map_err(|e| VertcutError::media_inspection(path, e.to_string()))?;
        let info = parse_probe_output(path, &output.stdout)?;

        tracing::info!(
            path = %path.display(),
            duration_secs = info.duration_secs,
            width = info.width,
            height = info.height,
            fps = info.fps,
            has_audio = info.has_audio,
            "Media inspected"
        );
        Ok(info)
    }
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Parse `ffprobe -print_format json` output.
pub fn parse_probe_output(path: &Path, stdout: &[u8]) -> VertcutResult<MediaInfo> {
    let fail = |msg: &str| VertcutError::media_inspection(path, msg);

    let parsed: ProbeOut = serde_json::from_slice(stdout)
        .map_err(|e| VertcutError::media_inspection(path, format!("invalid ffprobe json: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| fail("no video stream found"))?;
    let width = video
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| fail("missing video width"))?;
    let height = video
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| fail("missing video height"))?;

    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| fail("missing format duration"))?;

    let fps = video
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .unwrap_or(FALLBACK_FPS);

    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaInfo {
        path: path.to_path_buf(),
        duration_secs,
        width,
        height,
        fps,
        has_audio,
    })
}

/// `"30000/1001"` -> `29.97..`. Zero or malformed ratios yield `None`.
pub fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = match raw.split_once('/') {
        Some((n, d)) => (n.trim().parse::<f64>().ok()?, d.trim().parse::<f64>().ok()?),
        None => (raw.trim().parse::<f64>().ok()?, 1.0),
    };
    if num <= 0.0 || den <= 0.0 {
        return None;
    }
    let fps = num / den;
    fps.is_finite().then_some(fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"codec_type": "video", "width": 1280, "height": 720, "r_frame_rate": "60/1"},
            {"codec_type": "audio"}
        ],
        "format": {"duration": "612.480000"}
    }"#;

    #[test]
    fn test_parse_full_output() {
        let info = parse_probe_output(Path::new("in.mov"), SAMPLE.as_bytes()).unwrap();
        assert_eq!(info.width, 1280);
        assert_eq!(info.height, 720);
        assert_eq!(info.fps, 60.0);
        assert!((info.duration_secs - 612.48).abs() < 1e-9);
        assert!(info.has_audio);
    }

    #[test]
    fn test_no_video_stream_is_failure() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "3.0"}}"#;
        let err = parse_probe_output(Path::new("a.mp4"), json.as_bytes()).unwrap_err();
        assert!(matches!(err, VertcutError::MediaInspection { .. }));
        assert!(err.to_string().contains("no video stream"));
    }

    #[test]
    fn test_missing_duration_is_failure() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 10, "height": 10}]}"#;
        let err = parse_probe_output(Path::new("a.mp4"), json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn test_frame_rate_fallback() {
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 360, "r_frame_rate": "0/0"}],
            "format": {"duration": "10"}
        }"#;
        let info = parse_probe_output(Path::new("a.mp4"), json.as_bytes()).unwrap();
        assert_eq!(info.fps, FALLBACK_FPS);
        assert!(!info.has_audio);
    }

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("1/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_inspect_missing_file() {
        let runner = crate::process::SystemRunner::new();
        let inspector = FfprobeInspector::new(&runner, "ffprobe");
        let err = inspector
            .inspect(Path::new("/nonexistent/vertcut/input.mov"))
            .unwrap_err();
        assert!(matches!(err, VertcutError::FileNotFound { .. }));
    }
}
