//! The capability surface every effect implements.
//!
//! An effect is exactly one of three kinds, carried by the [`Effect`] variant, so the
//! compositor decides what to do with the front of a queue by matching instead of probing.

use crate::compose::queue::{ChainedQueue, FrameItem, SourceFrame};
use crate::foundation::core::{ColourMul, FrameIndex, Mat4};
use crate::foundation::error::FxResult;
use crate::render::context::RenderScope;

/// Progress of one track's pass through the compositor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeState {
    #[default]
    Base,
    SpatiallyTransformed,
    ColourFolded,
    Rendered,
}

/// What has been folded so far in the current pass.
///
/// The folded transform is already on the transform stack; pixel effects see it through
/// `scope.stack`, and apply `colour` in their draw.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PassState {
    pub state: CompositeState,
    pub colour: ColourMul,
    pub spatial_folds: usize,
    pub colour_folds: usize,
}

/// Render-thread lifecycle hooks shared by every effect kind.
pub trait EffectLifecycle {
    /// Create GPU objects. Called once when the render context is entered.
    fn init_render_objects(&mut self, _scope: &mut RenderScope<'_>) -> FxResult<()> {
        Ok(())
    }

    /// Release GPU objects. Called once when the render context tears down.
    fn destroy_render_objects(&mut self, _scope: &mut RenderScope<'_>) {}

    /// Called after every track of `frame` has been composed.
    fn end_frame(&mut self, _frame: FrameIndex) {}
}

/// Folds a matrix into the pass without drawing.
pub trait SpatialTransform: EffectLifecycle {
    fn chained_spatial_transform(&mut self, item: &FrameItem, frame: FrameIndex)
    -> FxResult<Mat4>;
}

/// Folds an RGBA multiplier into the pass without drawing.
pub trait ColourTransform: EffectLifecycle {
    fn chained_colour(&mut self, item: &FrameItem, frame: FrameIndex) -> FxResult<ColourMul>;
}

/// Produces pixels. Its render ends the pass and owns whatever is left in `queue`.
pub trait PixelEffect: EffectLifecycle {
    fn render(
        &mut self,
        scope: &mut RenderScope<'_>,
        pass: &PassState,
        source: &SourceFrame,
        item: &FrameItem,
        frame: FrameIndex,
        queue: &mut ChainedQueue,
    ) -> FxResult<()>;
}

/// A registered effect, tagged by kind.
pub enum Effect {
    Spatial(Box<dyn SpatialTransform>),
    Colour(Box<dyn ColourTransform>),
    Pixel(Box<dyn PixelEffect>),
}

impl Effect {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Effect::Spatial(_) => "spatial",
            Effect::Colour(_) => "colour",
            Effect::Pixel(_) => "pixel",
        }
    }

    pub(crate) fn init_render_objects(&mut self, scope: &mut RenderScope<'_>) -> FxResult<()> {
        match self {
            Effect::Spatial(e) => e.init_render_objects(scope),
            Effect::Colour(e) => e.init_render_objects(scope),
            Effect::Pixel(e) => e.init_render_objects(scope),
        }
    }

    pub(crate) fn destroy_render_objects(&mut self, scope: &mut RenderScope<'_>) {
        match self {
            Effect::Spatial(e) => e.destroy_render_objects(scope),
            Effect::Colour(e) => e.destroy_render_objects(scope),
            Effect::Pixel(e) => e.destroy_render_objects(scope),
        }
    }

    pub(crate) fn end_frame(&mut self, frame: FrameIndex) {
        match self {
            Effect::Spatial(e) => e.end_frame(frame),
            Effect::Colour(e) => e.end_frame(frame),
            Effect::Pixel(e) => e.end_frame(frame),
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Effect").field(&self.kind_name()).finish()
    }
}
