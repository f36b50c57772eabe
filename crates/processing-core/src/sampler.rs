//! Fragment sampling.
//!
//! Chooses the time windows that get cut from a source. The random source
//! is injected so that batch sampling is reproducible under a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vertcut_common::error::{VertcutError, VertcutResult};
use vertcut_layout_model::fragment::{ClipBatchRequest, Fragment, FragmentSpec, StartStrategy};

/// Time-window selection over a source of known duration.
#[derive(Debug, Clone)]
pub struct FragmentSampler<R = StdRng> {
    rng: R,
}

impl FragmentSampler<StdRng> {
    /// Sampler seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Sampler with a fixed seed; identical seeds give identical offsets.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FragmentSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Resolve one fragment.
    ///
    /// A source no longer than the requested duration yields the whole source
    /// `(0, source_secs)`. That is a valid result, not an error.
    pub fn single_fragment(&mut self, source_secs: f64, spec: &FragmentSpec) -> Fragment {
        let source_secs = source_secs.max(0.0);
        if source_secs <= spec.duration_secs {
            return Fragment {
                start_secs: 0.0,
                duration_secs: source_secs,
            };
        }

        let latest_start = source_secs - spec.duration_secs;
        let start_secs = match spec.strategy {
            StartStrategy::Fixed => spec.start_offset_secs.clamp(0.0, source_secs),
            StartStrategy::Centered => (latest_start / 2.0).max(0.0),
            StartStrategy::UniformRandom => self.rng.gen_range(0.0..=latest_start),
        };

        tracing::info!(
            strategy = ?spec.strategy,
            start_secs,
            end_secs = start_secs + spec.duration_secs,
            "Fragment selected"
        );

        Fragment {
            start_secs,
            duration_secs: spec.duration_secs,
        }
    }

    /// Draw `count` independent start offsets in `[0, source_secs - duration_secs]`,
    /// sorted ascending.
    ///
    /// Offsets are neither deduplicated nor spaced apart; clips may overlap.
    pub fn batch_fragments(
        &mut self,
        source_secs: f64,
        duration_secs: f64,
        count: usize,
    ) -> VertcutResult<Vec<f64>> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(VertcutError::config(format!(
                "clip duration must be a positive number of seconds, got {duration_secs}"
            )));
        }
        if !source_secs.is_finite() {
            return Err(VertcutError::config(format!(
                "source duration must be finite, got {source_secs}"
            )));
        }
        if source_secs < duration_secs {
            return Err(VertcutError::InsufficientDuration {
                source_secs,
                requested_secs: duration_secs,
            });
        }

        let latest_start = source_secs - duration_secs;
        let mut starts: Vec<f64> = (0..count)
            .map(|_| self.rng.gen_range(0.0..=latest_start))
            .collect();
        starts.sort_by(f64::total_cmp);

        tracing::info!(
            count,
            duration_secs,
            starts = ?starts.iter().map(|s| format!("{s:.2}")).collect::<Vec<_>>(),
            "Batch start offsets generated"
        );

        Ok(starts)
    }

    /// [`FragmentSampler::batch_fragments`] for a prepared request.
    pub fn batch_for(
        &mut self,
        source_secs: f64,
        request: &ClipBatchRequest,
    ) -> VertcutResult<Vec<f64>> {
        self.batch_fragments(source_secs, request.duration_secs, request.count)
    }
}
