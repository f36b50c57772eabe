//! The per-run region configuration.
//!
//! A [`RegionConfig`] is loaded once at startup, validated, and then passed
//! by reference into every component. Nothing mutates it afterwards.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::layout::{Canvas, Layout, LayoutEntry, Placement, Region};

/// Role whose audio is used when none is configured.
pub const DEFAULT_PRIMARY_ROLE: &str = "game";

/// Named source regions, their canvas placements, and the canvas itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub canvas: Canvas,

    /// Layout entries in declaration order.
    pub entries: Layout,

    /// Role whose audio track becomes the output audio.
    #[serde(default = "default_primary_role")]
    pub primary_role: String,
}

fn default_primary_role() -> String {
    DEFAULT_PRIMARY_ROLE.to_string()
}

impl Default for RegionConfig {
    /// The stock streaming layout: webcam across the top, subtitles below,
    /// gameplay painted last so it sits above both.
    fn default() -> Self {
        Self {
            canvas: Canvas::vertical_hd(),
            entries: Layout::new(vec![
                LayoutEntry {
                    region: Region::new("camera", Rect::new(0, 455, 470, 265)),
                    placement: Placement::stretch(Rect::new(0, 0, 1080, 608)),
                    z_order: 0,
                },
                LayoutEntry {
                    region: Region::new("subtitles", Rect::new(479, 455, 801, 265)),
                    placement: Placement::stretch(Rect::new(0, 1051, 1080, 265)),
                    z_order: 1,
                },
                LayoutEntry {
                    region: Region::new("game", Rect::new(160, 0, 840, 455)),
                    placement: Placement::stretch(Rect::new(120, 596, 840, 455)),
                    z_order: 2,
                },
            ]),
            primary_role: default_primary_role(),
        }
    }
}

impl RegionConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let config: RegionConfig =
            serde_json::from_str(json).map_err(|e| LayoutError::ParseError {
                path: PathBuf::from("<inline>"),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| LayoutError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: RegionConfig =
            serde_json::from_str(&json).map_err(|e| LayoutError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LayoutError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| LayoutError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| LayoutError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Check structural invariants. Bounds against a concrete source frame are
    /// checked separately, once the source dimensions are known.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let canvas = &self.canvas;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(LayoutError::invalid(format!(
                "canvas must have non-zero size, got {}x{}",
                canvas.width, canvas.height
            )));
        }
        if canvas.fps == 0 {
            return Err(LayoutError::invalid("canvas frame rate must be non-zero"));
        }
        if self.entries.is_empty() {
            return Err(LayoutError::invalid("layout has no regions"));
        }

        let mut seen = HashSet::new();
        for entry in self.entries.entries() {
            let role = entry.region.role.as_str();
            if role.trim().is_empty() {
                return Err(LayoutError::invalid("region role must not be empty"));
            }
            if !seen.insert(role) {
                return Err(LayoutError::invalid(format!("duplicate region role '{role}'")));
            }
            if !entry.region.rect.has_area() {
                return Err(LayoutError::invalid(format!(
                    "region '{role}' has zero width or height"
                )));
            }
            let target = entry.placement.rect;
            if !target.has_area() {
                return Err(LayoutError::invalid(format!(
                    "placement of '{role}' has zero width or height"
                )));
            }
            if !target.fits_within(canvas.width, canvas.height) {
                return Err(LayoutError::invalid(format!(
                    "placement of '{role}' ({},{} {}x{}) extends beyond the {}x{} canvas",
                    target.x, target.y, target.width, target.height, canvas.width, canvas.height
                )));
            }
        }

        if self.entries.entry(&self.primary_role).is_none() {
            return Err(LayoutError::invalid(format!(
                "primary role '{}' is not a layout region",
                self.primary_role
            )));
        }

        Ok(())
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.entries.regions()
    }

    pub fn layout(&self) -> &Layout {
        &self.entries
    }
}

/// Errors that can occur when loading or validating a region config.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid layout: {message}")]
    ValidationError { message: String },
}

impl LayoutError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::ValidationError {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BackgroundSpec, Color, ScaleMode};

    #[test]
    fn test_default_config_is_valid() {
        let config = RegionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.entries.len(), 3);
        assert_eq!(config.primary_role, "game");

        let order: Vec<&str> = config
            .layout()
            .paint_order()
            .iter()
            .map(|e| e.region.role.as_str())
            .collect();
        assert_eq!(order, vec!["camera", "subtitles", "game"]);
    }

    #[test]
    fn test_camera_placement_keeps_source_aspect() {
        let config = RegionConfig::default();
        let camera = config.layout().entry("camera").unwrap();
        let source_ratio = camera.region.rect.aspect_ratio();
        let target_ratio = camera.placement.rect.aspect_ratio();
        assert!((source_ratio - target_ratio).abs() < 0.01);
    }

    #[test]
    fn test_rejects_duplicate_roles() {
        let mut config = RegionConfig::default();
        let mut entries = config.entries.entries().to_vec();
        entries[1].region.role = "camera".to_string();
        config.entries = Layout::new(entries);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate region role 'camera'"));
    }

    #[test]
    fn test_rejects_zero_sized_region() {
        let mut config = RegionConfig::default();
        let mut entries = config.entries.entries().to_vec();
        entries[0].region.rect.height = 0;
        config.entries = Layout::new(entries);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_placement_outside_canvas() {
        let mut config = RegionConfig::default();
        let mut entries = config.entries.entries().to_vec();
        entries[1].placement.rect.y = 1800;
        config.entries = Layout::new(entries);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("subtitles"));
    }

    #[test]
    fn test_rejects_unknown_primary_role() {
        let config = RegionConfig {
            primary_role: "mic".to_string(),
            ..RegionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_layout_and_zero_fps() {
        let empty = RegionConfig {
            entries: Layout::default(),
            ..RegionConfig::default()
        };
        assert!(empty.validate().is_err());

        let mut still = RegionConfig::default();
        still.canvas.fps = 0;
        assert!(still.validate().is_err());
    }

    #[test]
    fn test_from_json_with_n_regions() {
        let json = r##"{
            "canvas": {"width": 720, "height": 1280, "fps": 25,
                       "background": {"kind": "color", "color": "#101010"}},
            "entries": [
                {"region": {"role": "a", "rect": {"x": 0, "y": 0, "width": 100, "height": 100}},
                 "placement": {"rect": {"x": 0, "y": 0, "width": 720, "height": 400}, "scale": "preserve_aspect"},
                 "z_order": 3},
                {"region": {"role": "b", "rect": {"x": 100, "y": 0, "width": 100, "height": 100}},
                 "placement": {"rect": {"x": 0, "y": 400, "width": 720, "height": 400}}},
                {"region": {"role": "c", "rect": {"x": 200, "y": 0, "width": 100, "height": 100}},
                 "placement": {"rect": {"x": 0, "y": 800, "width": 720, "height": 400}},
                 "z_order": 1},
                {"region": {"role": "d", "rect": {"x": 300, "y": 0, "width": 100, "height": 100}},
                 "placement": {"rect": {"x": 10, "y": 10, "width": 50, "height": 50}},
                 "z_order": 9}
            ],
            "primary_role": "c"
        }"##;

        let config = RegionConfig::from_json(json).unwrap();
        assert_eq!(config.entries.len(), 4);
        assert_eq!(
            config.canvas.background,
            Some(BackgroundSpec::Color {
                color: Color::rgb(0x10, 0x10, 0x10)
            })
        );
        let a = config.layout().entry("a").unwrap();
        assert_eq!(a.placement.scale, ScaleMode::PreserveAspect);
        let b = config.layout().entry("b").unwrap();
        assert_eq!(b.placement.scale, ScaleMode::Stretch);
        assert_eq!(b.z_order, 0);

        let order: Vec<&str> = config
            .layout()
            .paint_order()
            .iter()
            .map(|e| e.region.role.as_str())
            .collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_primary_role_defaults_to_game() {
        let mut value = serde_json::to_value(RegionConfig::default()).unwrap();
        value.as_object_mut().unwrap().remove("primary_role");
        let parsed: RegionConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.primary_role, DEFAULT_PRIMARY_ROLE);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts").join("default.json");

        RegionConfig::default().save(&path).unwrap();
        let loaded = RegionConfig::load(&path).unwrap();
        assert_eq!(loaded, RegionConfig::default());
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = RegionConfig::load("/nonexistent/vertcut/layout.json").unwrap_err();
        assert!(matches!(err, LayoutError::IoError { .. }));
    }
}
