//! Crop bounds validation.
//!
//! Runs once per source, after inspection and before any crop. A single
//! violation rejects the whole source so that no region is ever cropped
//! from a frame that cannot hold all of them.

use vertcut_common::error::{VertcutError, VertcutResult};
use vertcut_layout_model::layout::Region;

/// Check that every region fits inside a `source_width x source_height` frame.
///
/// Regions are checked in order and the first offending one is reported.
pub fn validate_regions<'a>(
    source_width: u32,
    source_height: u32,
    regions: impl IntoIterator<Item = &'a Region>,
) -> VertcutResult<()> {
    for region in regions {
        let rect = region.rect;
        if !rect.fits_within(source_width, source_height) {
            return Err(VertcutError::OutOfBounds {
                role: region.role.clone(),
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                source_width,
                source_height,
            });
        }
    }

    tracing::debug!(source_width, source_height, "Crop coordinates are within bounds");
    Ok(())
}
