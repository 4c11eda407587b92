//! Folds a track's chained-effects queue into a single render pass.
//!
//! The front of the queue is inspected repeatedly:
//!
//! - spatial effect: pop, multiply its matrix into one pushed stack slot, no draw;
//! - colour effect: pop, fold its RGBA multiplier, no draw;
//! - pixel effect: pop and render; the pass ends and the effect owns the rest of the queue.
//!
//! Folding is positional: anything queued after the rendering effect is never folded.

use crate::compose::queue::{ChainedQueue, SourceFrame, TrackQueue};
use crate::effects::protocol::{CompositeState, Effect, PassState};
use crate::effects::registry::EffectRegistry;
use crate::foundation::config::EngineConfig;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::FxResult;
use crate::render::context::RenderScope;

/// Result of composing one track for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackOutcome {
    pub track: String,
    pub state: CompositeState,
    pub draws: usize,
    /// Spatial effects skipped because the per-pass fold budget was spent.
    pub skipped: usize,
    /// Items left in the queue after the pass, discarded with the frame.
    pub dropped: usize,
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    max_spatial_folds: usize,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Compositor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_spatial_folds: config.max_spatial_folds.max(1),
        }
    }

    /// Run one pass over `queue`.
    ///
    /// The stack depth on return equals the depth on entry, also on error.
    #[tracing::instrument(level = "debug", skip_all, fields(frame = frame.0, queued = queue.len()))]
    pub fn compose_track(
        &self,
        scope: &mut RenderScope<'_>,
        effects: &mut EffectRegistry,
        source: &SourceFrame,
        frame: FrameIndex,
        queue: &mut ChainedQueue,
    ) -> FxResult<(PassState, usize)> {
        let mut pass = PassState::default();
        let mut pushed = false;
        let mut skipped = 0usize;
        let result = self.fold(
            scope,
            effects,
            source,
            frame,
            queue,
            &mut pass,
            &mut pushed,
            &mut skipped,
        );
        if pushed {
            scope.stack.pop();
        }
        result.map(|()| (pass, skipped))
    }

    #[allow(clippy::too_many_arguments)]
    fn fold(
        &self,
        scope: &mut RenderScope<'_>,
        effects: &mut EffectRegistry,
        source: &SourceFrame,
        frame: FrameIndex,
        queue: &mut ChainedQueue,
        pass: &mut PassState,
        pushed: &mut bool,
        skipped: &mut usize,
    ) -> FxResult<()> {
        while let Some(front) = queue.front() {
            let id = front.effect;
            let effect = effects.get_mut(id)?;
            let Some(item) = queue.pop_front() else {
                break;
            };
            match effect {
                Effect::Spatial(e) => {
                    if pass.spatial_folds >= self.max_spatial_folds {
                        tracing::warn!(effect = id.0, "spatial fold budget spent, skipping");
                        *skipped += 1;
                        continue;
                    }
                    let m = e.chained_spatial_transform(&item, frame)?;
                    if !*pushed {
                        scope.stack.push();
                        *pushed = true;
                    }
                    scope.stack.multiply_matrix(m);
                    pass.spatial_folds += 1;
                    pass.state = CompositeState::SpatiallyTransformed;
                    tracing::trace!(effect = id.0, "folded spatial transform");
                }
                Effect::Colour(e) => {
                    let c = e.chained_colour(&item, frame)?;
                    pass.colour = pass.colour.fold(c);
                    pass.colour_folds += 1;
                    pass.state = CompositeState::ColourFolded;
                    tracing::trace!(effect = id.0, colour = ?pass.colour, "folded colour");
                }
                Effect::Pixel(e) => {
                    e.render(scope, pass, source, &item, frame, queue)?;
                    pass.state = CompositeState::Rendered;
                    return Ok(());
                }
            }
        }
        if pass.state != CompositeState::Base {
            tracing::debug!("no rendering effect in queue, nothing drawn");
        }
        Ok(())
    }

    /// Compose every track in the given order. A failing track is reported in its outcome
    /// and does not affect the others; each queue is empty afterwards.
    ///
    /// Effects get their `end_frame` call once all tracks are done.
    pub fn compose_frame(
        &self,
        scope: &mut RenderScope<'_>,
        effects: &mut EffectRegistry,
        frame: FrameIndex,
        tracks: &mut [TrackQueue],
    ) -> Vec<TrackOutcome> {
        let outcomes: Vec<TrackOutcome> = tracks
            .iter_mut()
            .map(|track| {
                let draws_before = scope.draws();
                let result =
                    self.compose_track(scope, effects, &track.source, frame, &mut track.queue);
                let dropped = track.queue.clear();
                if dropped > 0 {
                    tracing::debug!(track = %track.name, dropped, "discarding unchained items");
                }
                let draws = scope.draws() - draws_before;
                match result {
                    Ok((pass, skipped)) => TrackOutcome {
                        track: track.name.clone(),
                        state: pass.state,
                        draws,
                        skipped,
                        dropped,
                        error: None,
                    },
                    Err(err) => {
                        tracing::warn!(track = %track.name, error = %err, "track skipped");
                        TrackOutcome {
                            track: track.name.clone(),
                            state: CompositeState::Base,
                            draws,
                            skipped: 0,
                            dropped,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .collect();
        effects.end_frame_all(frame);
        outcomes
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
