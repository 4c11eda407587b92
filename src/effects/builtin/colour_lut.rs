use std::collections::{HashMap, hash_map::Entry};

use crate::assets::cube::LutDim;
use crate::assets::lut_cache::{LutCache, LutRef};
use crate::compose::queue::{ChainedQueue, FrameItem, SourceFrame};
use crate::effects::params;
use crate::effects::protocol::{EffectLifecycle, PassState, PixelEffect};
use crate::foundation::core::{FrameIndex, Vec3};
use crate::foundation::error::{FxError, FxResult};
use crate::render::context::RenderScope;
use crate::render::device::UniformValue;
use crate::render::node::{DeviceResource, NodeResource, RenderNode, Shader};
use crate::render::shaders::{
    self, LUT_UNIT, UNIFORM_DOMAIN_MAX, UNIFORM_DOMAIN_MIN, UNIFORM_LUT, UNIFORM_LUT_SIZE,
};

#[derive(Debug)]
struct InstanceLut {
    lut: LutRef,
    seen: bool,
}

#[derive(Debug)]
struct LutNodes {
    one_d: RenderNode,
    three_d: RenderNode,
}

/// Pixel effect mapping the source through a Cube LUT: `{path: "grade.cube"}`.
///
/// Each effect instance holds its own [`LutRef`]; changing `path` repoints it. The table is
/// realized on the first frame that draws it. An instance that does not draw during a frame
/// gives its reference back when the frame ends.
#[derive(Debug)]
pub struct ColourLut {
    luts: LutCache,
    instances: HashMap<u64, InstanceLut>,
    nodes: Option<LutNodes>,
}

impl ColourLut {
    pub fn new(luts: LutCache) -> Self {
        Self {
            luts,
            instances: HashMap::new(),
            nodes: None,
        }
    }

    /// Acquire or repoint the reference held by `instance`.
    fn instance_ref(&mut self, instance: u64, path: &str) -> FxResult<&LutRef> {
        match self.instances.entry(instance) {
            Entry::Occupied(e) => {
                let slot = e.into_mut();
                slot.lut.repoint(path)?;
                slot.seen = true;
                Ok(&slot.lut)
            }
            Entry::Vacant(v) => {
                let slot = v.insert(InstanceLut {
                    lut: self.luts.acquire(path)?,
                    seen: true,
                });
                Ok(&slot.lut)
            }
        }
    }
}

impl EffectLifecycle for ColourLut {
    fn init_render_objects(&mut self, scope: &mut RenderScope<'_>) -> FxResult<()> {
        let one_d = Shader::create(scope.device, &shaders::lut1d(), shaders::LUT_UNIFORMS)?;
        let three_d = match Shader::create(scope.device, &shaders::lut3d(), shaders::LUT_UNIFORMS)
        {
            Ok(s) => s,
            Err(err) => {
                one_d.destroy(scope.device);
                return Err(err);
            }
        };
        self.nodes = Some(LutNodes {
            one_d: super::quad_node(scope, NodeResource::Owned(one_d)),
            three_d: super::quad_node(scope, NodeResource::Owned(three_d)),
        });
        Ok(())
    }

    fn destroy_render_objects(&mut self, scope: &mut RenderScope<'_>) {
        if let Some(nodes) = self.nodes.take() {
            nodes.one_d.destroy(scope.device);
            nodes.three_d.destroy(scope.device);
        }
        self.instances.clear();
    }

    fn end_frame(&mut self, frame: FrameIndex) {
        let before = self.instances.len();
        self.instances.retain(|_, slot| std::mem::take(&mut slot.seen));
        let released = before - self.instances.len();
        if released > 0 {
            tracing::debug!(frame = frame.0, released, "released luts of inactive instances");
        }
    }
}

impl PixelEffect for ColourLut {
    fn render(
        &mut self,
        scope: &mut RenderScope<'_>,
        pass: &PassState,
        source: &SourceFrame,
        item: &FrameItem,
        _frame: FrameIndex,
        _queue: &mut ChainedQueue,
    ) -> FxResult<()> {
        const NAME: &str = "colour_lut";
        let p = params::object(NAME, &item.params)?;
        let path = params::string(NAME, p, "path")?
            .ok_or_else(|| FxError::validation("colour_lut.path is required"))?
            .to_string();

        let lut = self.instance_ref(item.instance, &path)?;
        let realized = scope.luts.realize(lut, scope.device)?;

        let Some(nodes) = self.nodes.as_mut() else {
            panic!("colour_lut rendered before init_render_objects");
        };
        let node = match realized.dim {
            LutDim::OneD => &mut nodes.one_d,
            LutDim::ThreeD => &mut nodes.three_d,
        };
        super::prepare_source_draw(node, scope, pass, source);
        node.bind_shared_texture(scope.device, realized.texture, LUT_UNIT);
        node.set_uniform(UNIFORM_LUT, UniformValue::Int(LUT_UNIT as i32));
        node.set_uniform(UNIFORM_LUT_SIZE, UniformValue::Float(realized.size as f32));
        node.set_uniform(
            UNIFORM_DOMAIN_MIN,
            UniformValue::Vec3(Vec3::from(realized.domain_min)),
        );
        node.set_uniform(
            UNIFORM_DOMAIN_MAX,
            UniformValue::Vec3(Vec3::from(realized.domain_max)),
        );
        scope.draw_node(node);
        Ok(())
    }
}
