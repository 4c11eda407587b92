//! Effects shipped with the crate and the helper that registers them.

pub mod colour_lut;
pub mod motion;
pub mod passthrough;
pub mod tint;

use std::rc::Rc;

use crate::assets::lut_cache::LutCache;
use crate::compose::queue::SourceFrame;
use crate::effects::protocol::{Effect, PassState};
use crate::effects::registry::{EffectId, EffectRegistry};
use crate::foundation::core::Vec3;
use crate::foundation::error::FxResult;
use crate::render::context::RenderScope;
use crate::render::device::UniformValue;
use crate::render::node::{NodeResource, RenderNode, Shader};
use crate::render::shaders::{SOURCE_UNIT, UNIFORM_COLOUR, UNIFORM_SOURCE};

pub use colour_lut::ColourLut;
pub use motion::Motion;
pub use passthrough::Passthrough;
pub use tint::Tint;

pub const PASSTHROUGH: &str = "passthrough";
pub const MOTION: &str = "motion";
pub const TINT: &str = "tint";
pub const COLOUR_LUT: &str = "colour_lut";

/// Ids of the built-in effects after [`register_builtins`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuiltinIds {
    pub passthrough: EffectId,
    pub motion: EffectId,
    pub tint: EffectId,
    pub colour_lut: EffectId,
}

pub fn register_builtins(registry: &mut EffectRegistry, luts: &LutCache) -> FxResult<BuiltinIds> {
    Ok(BuiltinIds {
        passthrough: registry
            .register(PASSTHROUGH, Effect::Pixel(Box::new(Passthrough::new())))?,
        motion: registry.register(MOTION, Effect::Spatial(Box::new(Motion)))?,
        tint: registry.register(TINT, Effect::Colour(Box::new(Tint)))?,
        colour_lut: registry.register(
            COLOUR_LUT,
            Effect::Pixel(Box::new(ColourLut::new(luts.clone()))),
        )?,
    })
}

/// Quad node drawn with `shader` over the shared unit quad.
fn quad_node(scope: &RenderScope<'_>, shader: NodeResource<Shader>) -> RenderNode {
    RenderNode::new()
        .with_geometry(NodeResource::Shared(Rc::clone(&scope.shared.quad)))
        .with_shader(shader)
}

/// Size the node to the source, bind the source texture and upload the folded colour.
fn prepare_source_draw(
    node: &mut RenderNode,
    scope: &mut RenderScope<'_>,
    pass: &PassState,
    source: &SourceFrame,
) {
    node.transform
        .set_scale(Vec3::new(source.width as f32, source.height as f32, 1.0));
    match source.texture {
        Some(texture) => node.bind_shared_texture(scope.device, texture, SOURCE_UNIT),
        None => node.unbind_texture(scope.device, SOURCE_UNIT),
    }
    node.set_uniform(UNIFORM_SOURCE, UniformValue::Int(SOURCE_UNIT as i32));
    node.set_uniform(UNIFORM_COLOUR, UniformValue::Vec4(pass.colour.to_vec4()));
}

#[cfg(test)]
#[path = "../../../tests/unit/effects/builtin.rs"]
mod tests;
