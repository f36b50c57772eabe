//! Pixel rectangles used for source regions and canvas placements.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in integer pixel units.
///
/// `(0, 0)` is the top-left corner of the frame it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive), widened so it cannot overflow.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Bottom edge (exclusive), widened so it cannot overflow.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Whether both dimensions are non-zero.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Whether the rectangle lies entirely within a `width x height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    /// Largest rectangle with `content`'s aspect ratio that fits inside `self`,
    /// centered on it. Each side is at least one pixel.
    pub fn fit_centered(&self, content_width: u32, content_height: u32) -> Rect {
        let scale = (self.width as f64 / content_width.max(1) as f64)
            .min(self.height as f64 / content_height.max(1) as f64);

        let width = ((content_width as f64 * scale).round() as u32).clamp(1, self.width.max(1));
        let height = ((content_height as f64 * scale).round() as u32).clamp(1, self.height.max(1));

        Rect {
            x: self.x + self.width.saturating_sub(width) / 2,
            y: self.y + self.height.saturating_sub(height) / 2,
            width,
            height,
        }
    }
}
