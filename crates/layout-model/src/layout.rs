//! Regions, placements, and the output canvas.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A named crop area in source-frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Role of the region (e.g. "game", "camera", "subtitles").
    pub role: String,

    /// Crop rectangle in the source frame.
    pub rect: Rect,
}

impl Region {
    pub fn new(role: impl Into<String>, rect: Rect) -> Self {
        Self {
            role: role.into(),
            rect,
        }
    }
}

/// How region pixels are fitted into their placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Scale to exactly the placement size (aspect ratio disabled).
    #[default]
    Stretch,
    /// Scale to the largest size that keeps the region's aspect ratio,
    /// centered in the placement.
    PreserveAspect,
}

/// Where a region lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Target rectangle on the canvas.
    pub rect: Rect,

    #[serde(default)]
    pub scale: ScaleMode,
}

impl Placement {
    pub fn stretch(rect: Rect) -> Self {
        Self {
            rect,
            scale: ScaleMode::Stretch,
        }
    }

    /// The rectangle actually covered by a region of `source` size.
    pub fn target_rect(&self, source: &Rect) -> Rect {
        match self.scale {
            ScaleMode::Stretch => self.rect,
            ScaleMode::PreserveAspect => self.rect.fit_centered(source.width, source.height),
        }
    }
}

/// One `(Region, Placement, zOrder)` entry of the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub region: Region,
    pub placement: Placement,

    /// Paint order; higher values are painted later (on top).
    #[serde(default)]
    pub z_order: i32,
}

/// Ordered collection of layout entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Layout {
    entries: Vec<LayoutEntry>,
}

impl Layout {
    pub fn new(entries: Vec<LayoutEntry>) -> Self {
        Self { entries }
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    /// Entries in paint order: ascending zOrder, ties in declaration order.
    pub fn paint_order(&self) -> Vec<&LayoutEntry> {
        let mut ordered: Vec<&LayoutEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|entry| entry.z_order);
        ordered
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.entries.iter().map(|entry| &entry.region)
    }

    pub fn entry(&self, role: &str) -> Option<&LayoutEntry> {
        self.entries.iter().find(|entry| entry.region.role == role)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An sRGB color parsed from `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Fallback canvas fill when no background is available.
    pub const MID_GRAY: Color = Color {
        r: 0x80,
        g: 0x80,
        b: 0x80,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{value}', expected #RRGGBB"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("invalid color '{value}': {e}"))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Canvas background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundSpec {
    /// Static image stretched to the canvas.
    Image { path: PathBuf },
    /// Solid fill.
    Color { color: Color },
}

/// Fixed-resolution output frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,

    /// Output frame rate; every region is normalized to it.
    pub fps: u32,

    #[serde(default)]
    pub background: Option<BackgroundSpec>,
}

impl Canvas {
    /// Standard 9:16 short-form canvas.
    pub fn vertical_hd() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            background: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}
