//! fxchain composites video tracks through chained effects on a GPU-style device.
//!
//! Each track's effects for an output frame sit in a queue. The compositor folds the leading
//! spatial transforms and colour multipliers into a single pass and hands the result to the
//! first pixel-producing effect, so a chain like `motion -> tint -> passthrough` costs one
//! draw.
//!
//! # Pieces
//!
//! - [`TransformNode`] / [`TransformStack`]: position-rotation-scale matrices and the
//!   fixed-depth push/pop stack they multiply into.
//! - [`RenderNode`]: geometry, shader and textures drawn inside their own stack bracket.
//! - [`LutCache`]: Cube LUTs keyed by path, reference counted per consumer and realized on
//!   the render thread on first use.
//! - [`Effect`]: an effect is exactly one of [`SpatialTransform`], [`ColourTransform`] or
//!   [`PixelEffect`].
//! - [`Compositor`]: the fold/render state machine over a [`ChainedQueue`].
//! - [`GpuDevice`]: the device seam; [`RecordingDevice`] is a headless implementation.
#![forbid(unsafe_code)]

pub mod assets;
pub mod compose;
pub mod effects;
pub mod foundation;
pub mod render;
pub mod transform;

pub use assets::cube::{CubeLut, LutDim};
pub use assets::lut_cache::{LutCache, LutEntryInfo, LutRef, RealizedLut};
pub use compose::compositor::{Compositor, TrackOutcome};
pub use compose::plan::{FramePlan, PlanItem, PlanSource, PlanTrack};
pub use compose::queue::{ChainedQueue, FrameItem, SourceFrame, TrackQueue};
pub use effects::builtin::{
    BuiltinIds, ColourLut, Motion, Passthrough, Tint, register_builtins,
};
pub use effects::protocol::{
    ColourTransform, CompositeState, Effect, EffectLifecycle, PassState, PixelEffect,
    SpatialTransform,
};
pub use effects::registry::{EffectId, EffectRegistry};
pub use foundation::config::{EngineConfig, LutEviction, LutFailure};
pub use foundation::core::{Canvas, ColourMul, FrameIndex};
pub use foundation::error::{FxError, FxResult, LutError};
pub use render::context::{RenderContext, RenderScope};
pub use render::device::{DeviceCommand, GpuDevice, RecordingDevice};
pub use render::node::RenderNode;
pub use transform::node::TransformNode;
pub use transform::stack::TransformStack;
