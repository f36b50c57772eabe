//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{VertcutError, VertcutResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory scanned for source recordings.
    pub input_dir: PathBuf,

    /// Directory where rendered clips are written.
    pub output_dir: PathBuf,

    /// Directory for intermediate artifacts (system temp dir when unset).
    pub temp_dir: Option<PathBuf>,

    /// Output file naming.
    pub naming: NamingConfig,

    /// Input and background discovery rules.
    pub discovery: DiscoveryConfig,

    /// External encoder settings.
    pub encoder: EncoderConfig,

    /// Default clip parameters.
    pub clips: ClipDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// How generated output files are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Prefix of every generated file; inputs carrying it are skipped.
    pub processed_prefix: String,

    /// Container extension without the dot.
    pub container: String,
}

/// Filesystem discovery rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Accepted source extensions (lowercase, with dot).
    pub video_extensions: Vec<String>,

    /// Search for a background image when the layout names none.
    pub discover_background: bool,

    /// Directories searched for a background image, in order.
    pub background_dirs: Vec<PathBuf>,

    /// Accepted background extensions (lowercase, with dot).
    pub background_extensions: Vec<String>,

    /// Case-insensitive name fragments marking screenshots, never used as backgrounds.
    pub screenshot_markers: Vec<String>,
}

/// Encoder parameters passed to the external video engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// ffmpeg binary name or path.
    pub ffmpeg: PathBuf,

    /// ffprobe binary name or path.
    pub ffprobe: PathBuf,

    /// Video codec.
    pub codec: String,

    /// Preset used when cropping regions.
    pub crop_preset: String,

    /// Preset used for the final composite.
    pub composite_preset: String,

    /// Constant rate factor (0 = lossless).
    pub crf: u32,

    /// Audio codec for the final composite.
    pub audio_codec: String,
}

/// Default clip parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipDefaults {
    /// Clip length in seconds.
    pub duration_secs: f64,

    /// Number of clips produced in batch mode.
    pub batch_count: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "vertcut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path (appended to).
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            temp_dir: None,
            naming: NamingConfig::default(),
            discovery: DiscoveryConfig::default(),
            encoder: EncoderConfig::default(),
            clips: ClipDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            processed_prefix: "processed".to_string(),
            container: "mp4".to_string(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            video_extensions: [".mov", ".mp4", ".avi", ".mkv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            discover_background: true,
            background_dirs: vec![
                PathBuf::from("."),
                PathBuf::from("input"),
                PathBuf::from("test"),
            ],
            background_extensions: [".jpg", ".jpeg", ".png", ".bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            screenshot_markers: vec!["screenshot".to_string(), "снимок".to_string()],
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            codec: "libx264".to_string(),
            crop_preset: "ultrafast".to_string(),
            composite_preset: "fast".to_string(),
            crf: 0,
            audio_codec: "aac".to_string(),
        }
    }
}

impl Default for ClipDefaults {
    fn default() -> Self {
        Self {
            duration_secs: 15.0,
            batch_count: 20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], errors are returned.
    pub fn load_from(path: &Path) -> VertcutResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VertcutError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| VertcutError::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Directory for intermediate artifacts.
    pub fn resolved_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Create the input and output directories if missing.
    pub fn ensure_directories(&self) -> Result<(), std::io::Error> {
        for dir in [&self.input_dir, &self.output_dir] {
            std::fs::create_dir_all(dir)?;
            tracing::debug!(dir = %dir.display(), "Directory ready");
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("vertcut").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_processing_conventions() {
        let config = AppConfig::default();
        assert_eq!(config.naming.processed_prefix, "processed");
        assert_eq!(config.naming.container, "mp4");
        assert_eq!(config.clips.batch_count, 20);
        assert!((config.clips.duration_secs - 15.0).abs() < 1e-9);
        assert!(config
            .discovery
            .video_extensions
            .contains(&".mkv".to_string()));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"output_dir": "clips", "encoder": {"crf": 18}}"#).unwrap();
        assert_eq!(parsed.output_dir, PathBuf::from("clips"));
        assert_eq!(parsed.encoder.crf, 18);
        assert_eq!(parsed.encoder.codec, "libx264");
        assert_eq!(parsed.input_dir, PathBuf::from("input"));
    }

    #[test]
    fn test_save_and_load_from_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.clips.batch_count = 5;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.clips.batch_count, 5);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, VertcutError::Config { .. }));
    }

    #[test]
    fn test_ensure_directories_creates_both() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            input_dir: dir.path().join("in"),
            output_dir: dir.path().join("out"),
            ..AppConfig::default()
        };
        config.ensure_directories().unwrap();
        assert!(config.input_dir.is_dir());
        assert!(config.output_dir.is_dir());
    }
}
