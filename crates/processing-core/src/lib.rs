//! Vertcut Processing Core
//!
//! Decides what gets cut before anything is cut:
//! - **Bounds:** Go/no-go check of every crop region against the source frame
//! - **Sampling:** Choose fragment windows (fixed, centered, random, batches)
//!
//! This crate is pure computation: no I/O and no external processes.
//! All inputs are data; all outputs are data.

pub mod bounds;
pub mod sampler;

pub use bounds::validate_regions;
pub use sampler::FragmentSampler;
