use std::rc::Rc;

use crate::assets::lut_cache::LutCache;
use crate::effects::registry::EffectRegistry;
use crate::foundation::config::EngineConfig;
use crate::foundation::core::{Canvas, Mat4};
use crate::foundation::error::FxResult;
use crate::render::device::GpuDevice;
use crate::render::node::{DeviceResource, Geometry, RenderNode, Shader};
use crate::render::shaders;
use crate::transform::stack::TransformStack;

/// Objects created once per render context and borrowed by effect render nodes.
#[derive(Debug)]
pub struct SharedObjects {
    pub quad: Rc<Geometry>,
    pub composite: Rc<Shader>,
}

/// Owner of all render-thread state: device, transform stack, LUT cache, shared objects.
///
/// Created by [`RenderContext::enter`], which also runs every effect's
/// `init_render_objects`; [`RenderContext::teardown`] undoes both.
pub struct RenderContext<D: GpuDevice> {
    device: D,
    stack: TransformStack,
    luts: LutCache,
    config: EngineConfig,
    shared: SharedObjects,
}

impl<D: GpuDevice> std::fmt::Debug for RenderContext<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("stack_depth", &self.stack.depth())
            .field("luts", &self.luts)
            .field("config", &self.config)
            .finish()
    }
}

impl<D: GpuDevice> RenderContext<D> {
    pub fn enter(
        mut device: D,
        luts: LutCache,
        config: EngineConfig,
        effects: &mut EffectRegistry,
    ) -> FxResult<Self> {
        config.validate()?;
        let quad = Geometry::unit_quad(&mut device)?;
        let composite = match Shader::create(
            &mut device,
            &shaders::composite(),
            shaders::COMPOSITE_UNIFORMS,
        ) {
            Ok(shader) => shader,
            Err(err) => {
                quad.destroy(&mut device);
                return Err(err);
            }
        };
        let mut ctx = Self {
            device,
            stack: TransformStack::new(config.stack_depth),
            luts,
            config,
            shared: SharedObjects {
                quad: Rc::new(quad),
                composite: Rc::new(composite),
            },
        };
        let init = effects.init_all(&mut ctx.scope());
        if let Err(err) = init {
            let Self {
                mut device, shared, ..
            } = ctx;
            shared.destroy(&mut device);
            return Err(err);
        }
        tracing::debug!(effects = effects.len(), "render context entered");
        Ok(ctx)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn stack(&self) -> &TransformStack {
        &self.stack
    }

    pub fn luts(&self) -> &LutCache {
        &self.luts
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reset the stack to the canvas projection, clear, and drop evicted LUT textures.
    pub fn begin_frame(&mut self, canvas: Canvas) {
        self.stack.reset(canvas.ortho_projection(), Mat4::IDENTITY);
        if let Some(rgba) = self.config.clear_rgba {
            self.device.clear(rgba);
        }
        let freed = self.luts.collect_garbage(&mut self.device);
        if freed > 0 {
            tracing::debug!(freed, "released evicted lut textures");
        }
    }

    /// Borrowed view handed to effects for one frame.
    pub fn scope(&mut self) -> RenderScope<'_> {
        RenderScope {
            device: &mut self.device,
            stack: &mut self.stack,
            luts: &self.luts,
            shared: &self.shared,
            dt: 0.0,
            draws: 0,
        }
    }

    /// Destroy effect render objects, shared objects and LUT textures; hand the device back.
    pub fn teardown(mut self, effects: &mut EffectRegistry) -> D {
        effects.destroy_all(&mut self.scope());
        self.luts.teardown(&mut self.device);
        self.shared.destroy(&mut self.device);
        tracing::debug!("render context torn down");
        self.device
    }
}

impl SharedObjects {
    fn destroy(self, device: &mut dyn GpuDevice) {
        match Rc::try_unwrap(self.quad) {
            Ok(quad) => quad.destroy(device),
            Err(_) => tracing::warn!("shared quad still borrowed at teardown"),
        }
        match Rc::try_unwrap(self.composite) {
            Ok(shader) => shader.destroy(device),
            Err(_) => tracing::warn!("shared composite shader still borrowed at teardown"),
        }
    }
}

/// What an effect may touch while rendering: the device, the stack, the LUT cache and the
/// shared objects.
pub struct RenderScope<'a> {
    pub device: &'a mut dyn GpuDevice,
    pub stack: &'a mut TransformStack,
    pub luts: &'a LutCache,
    pub shared: &'a SharedObjects,
    pub dt: f32,
    draws: usize,
}

impl RenderScope<'_> {
    /// Render `node` and count it if it carries geometry.
    pub fn draw_node(&mut self, node: &RenderNode) {
        node.render(self.device, self.stack, self.dt);
        if node.has_geometry() {
            self.draws += 1;
        }
    }

    /// Draws issued through this scope so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/context.rs"]
mod tests;
