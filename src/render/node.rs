//! Drawable scene nodes: geometry, shader and textures bracketed by their own transform.

use std::{collections::HashMap, ops::Deref, rc::Rc};

use crate::foundation::error::{FxError, FxResult};
use crate::render::device::{
    BufferHandle, DrawMode, GpuDevice, ProgramHandle, ShaderSource, TextureHandle,
    UniformLocation, UniformValue,
};
use crate::transform::{node::TransformNode, stack::TransformStack};

/// Uniform receiving `projection * top` on every draw.
pub const UNIFORM_MVP: &str = "u_mvp";
/// Uniform receiving the frame delta time in seconds.
pub const UNIFORM_DT: &str = "u_dt";

/// GPU object that must be released through the device that created it.
pub trait DeviceResource {
    fn destroy(self, device: &mut dyn GpuDevice);
}

/// A node's claim on a sub-resource: owned (destroyed with the node) or shared (left alone).
#[derive(Debug)]
pub enum NodeResource<T> {
    Owned(T),
    Shared(Rc<T>),
}

impl<T> Deref for NodeResource<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            NodeResource::Owned(v) => v,
            NodeResource::Shared(v) => v,
        }
    }
}

impl<T: DeviceResource> NodeResource<T> {
    fn release(self, device: &mut dyn GpuDevice) {
        if let NodeResource::Owned(v) = self {
            v.destroy(device);
        }
    }
}

/// Immutable vertex buffer plus draw mode.
#[derive(Debug)]
pub struct Geometry {
    buffer: BufferHandle,
    mode: DrawMode,
    vertex_count: u32,
}

impl Geometry {
    /// Upload `vertices` (interleaved, `stride` floats per vertex).
    pub fn create(
        device: &mut dyn GpuDevice,
        vertices: &[f32],
        stride: usize,
        mode: DrawMode,
    ) -> FxResult<Self> {
        if stride == 0 || !vertices.len().is_multiple_of(stride) {
            return Err(FxError::validation(
                "vertex data length must be a multiple of the stride",
            ));
        }
        let vertex_count = u32::try_from(vertices.len() / stride)
            .map_err(|_| FxError::validation("too many vertices"))?;
        let buffer = device.create_vertex_buffer(vertices)?;
        Ok(Self {
            buffer,
            mode,
            vertex_count,
        })
    }

    /// Unit quad `(0,0)-(1,1)` as a triangle strip of `x y u v` vertices.
    pub fn unit_quad(device: &mut dyn GpuDevice) -> FxResult<Self> {
        #[rustfmt::skip]
        const QUAD: [f32; 16] = [
            0.0, 0.0, 0.0, 0.0,
            1.0, 0.0, 1.0, 0.0,
            0.0, 1.0, 0.0, 1.0,
            1.0, 1.0, 1.0, 1.0,
        ];
        Self::create(device, &QUAD, 4, DrawMode::TriangleStrip)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn draw(&self, device: &mut dyn GpuDevice) {
        device.draw(self.buffer, self.mode, 0, self.vertex_count);
    }
}

impl DeviceResource for Geometry {
    fn destroy(self, device: &mut dyn GpuDevice) {
        device.delete_buffer(self.buffer);
    }
}

/// Compiled program with uniform locations resolved once at creation.
#[derive(Debug)]
pub struct Shader {
    program: ProgramHandle,
    locations: HashMap<String, UniformLocation>,
}

impl Shader {
    pub fn create(
        device: &mut dyn GpuDevice,
        source: &ShaderSource,
        uniforms: &[&str],
    ) -> FxResult<Self> {
        let program = device.create_program(source)?;
        let mut locations = HashMap::new();
        for name in [UNIFORM_MVP, UNIFORM_DT].iter().chain(uniforms) {
            if let Some(loc) = device.uniform_location(program, name) {
                locations.insert((*name).to_string(), loc);
            }
        }
        Ok(Self { program, locations })
    }

    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied()
    }

    /// Activate the program and upload `values`; names the program lacks are skipped.
    pub fn activate<'a>(
        &self,
        device: &mut dyn GpuDevice,
        values: impl IntoIterator<Item = (&'a str, UniformValue)>,
    ) {
        device.use_program(self.program);
        for (name, value) in values {
            if let Some(loc) = self.location(name) {
                device.set_uniform(loc, value);
            }
        }
    }
}

impl DeviceResource for Shader {
    fn destroy(self, device: &mut dyn GpuDevice) {
        device.delete_program(self.program);
    }
}

/// Texture bound to a fixed unit when a node renders.
#[derive(Debug)]
pub struct Texture {
    pub handle: TextureHandle,
    pub unit: u32,
}

impl DeviceResource for Texture {
    fn destroy(self, device: &mut dyn GpuDevice) {
        device.delete_texture(self.handle);
    }
}

/// A transform plus optional geometry, shader and textures, drawn in one bracketed call.
///
/// Missing parts are skipped silently, so a partially configured node (say, a crop region
/// with no geometry yet) renders nothing rather than failing.
#[derive(Debug, Default)]
pub struct RenderNode {
    pub transform: TransformNode,
    geometry: Option<NodeResource<Geometry>>,
    shader: Option<NodeResource<Shader>>,
    textures: Vec<NodeResource<Texture>>,
    uniforms: Vec<(String, UniformValue)>,
}

impl RenderNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geometry(mut self, geometry: NodeResource<Geometry>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_shader(mut self, shader: NodeResource<Shader>) -> Self {
        self.shader = Some(shader);
        self
    }

    pub fn with_texture(mut self, texture: NodeResource<Texture>) -> Self {
        self.textures.push(texture);
        self
    }

    /// Swap in a new geometry variant, releasing the old one if the node owned it.
    pub fn replace_geometry(
        &mut self,
        device: &mut dyn GpuDevice,
        geometry: Option<NodeResource<Geometry>>,
    ) {
        if let Some(old) = std::mem::replace(&mut self.geometry, geometry) {
            old.release(device);
        }
    }

    /// Point the texture bound on `unit` at `handle` (shared), replacing any previous binding.
    pub fn bind_shared_texture(
        &mut self,
        device: &mut dyn GpuDevice,
        handle: TextureHandle,
        unit: u32,
    ) {
        self.unbind_texture(device, unit);
        self.textures
            .push(NodeResource::Shared(Rc::new(Texture { handle, unit })));
    }

    /// Drop whatever is bound on `unit`, releasing it if the node owned it.
    pub fn unbind_texture(&mut self, device: &mut dyn GpuDevice, unit: u32) {
        if let Some(pos) = self.textures.iter().position(|t| t.unit == unit) {
            self.textures.remove(pos).release(device);
        }
    }

    /// Set a uniform uploaded on every render.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        match self.uniforms.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.uniforms.push((name.to_string(), value)),
        }
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// Push, apply own transform, bind textures, activate shader, draw, pop.
    pub fn render(&self, device: &mut dyn GpuDevice, stack: &mut TransformStack, dt: f32) {
        stack.push();
        self.transform.transform(stack);

        for texture in &self.textures {
            device.bind_texture(texture.unit, texture.handle);
        }

        if let Some(shader) = &self.shader {
            let builtins = [
                (UNIFORM_MVP, UniformValue::Mat4(stack.mvp())),
                (UNIFORM_DT, UniformValue::Float(dt)),
            ];
            let custom = self.uniforms.iter().map(|(n, v)| (n.as_str(), *v));
            shader.activate(device, builtins.into_iter().chain(custom));
        }

        if let Some(geometry) = &self.geometry {
            geometry.draw(device);
        }

        stack.pop();
    }

    /// Release owned sub-resources; shared ones are left to their owner.
    pub fn destroy(self, device: &mut dyn GpuDevice) {
        if let Some(g) = self.geometry {
            g.release(device);
        }
        if let Some(s) = self.shader {
            s.release(device);
        }
        for t in self.textures {
            t.release(device);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/node.rs"]
mod tests;
