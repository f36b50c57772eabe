//! Vertcut Layout Model
//!
//! Defines the core data contracts for reframing a composite recording:
//! - **Geometry:** Pixel rectangles and aspect fitting
//! - **Layout:** Named source regions, their canvas placements, and paint order
//! - **Canvas:** Output resolution, frame rate, and background
//! - **Fragments:** Time windows selected from the source
//! - **RegionConfig:** The immutable per-run configuration tying it together
//!
//! All coordinates are integer pixels. Source regions are expressed in the
//! source frame; placements are expressed on the output canvas.

pub mod config;
pub mod fragment;
pub mod geometry;
pub mod layout;

pub use config::*;
pub use fragment::*;
pub use geometry::*;
pub use layout::*;
