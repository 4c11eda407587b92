use std::num::NonZeroU32;

use crate::foundation::core::{Mat4, Vec3, Vec4};
use crate::foundation::error::{FxError, FxResult};

macro_rules! gpu_handle {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Raw device-side id.
            pub fn raw(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gpu_handle!(
    /// Device texture id.
    TextureHandle
);
gpu_handle!(
    /// Device vertex buffer id.
    BufferHandle
);
gpu_handle!(
    /// Device shader program id.
    ProgramHandle
);

/// Uniform slot inside a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// Primitive assembly for a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Triangles,
    TriangleStrip,
    TriangleFan,
    Lines,
}

/// Texture layout and texel data.
#[derive(Clone, Copy, Debug)]
pub enum TextureData<'a> {
    /// 2-D straight-alpha RGBA8.
    Rgba8 {
        width: u32,
        height: u32,
        texels: &'a [u8],
    },
    /// 1-D lookup of `size` RGB32F entries.
    Lut1d { size: u32, rgb: &'a [f32] },
    /// 3-D lookup of `size³` RGB32F entries, red varying fastest.
    Lut3d { size: u32, rgb: &'a [f32] },
}

impl TextureData<'_> {
    fn expected_len(&self) -> usize {
        match *self {
            TextureData::Rgba8 { width, height, .. } => width as usize * height as usize * 4,
            TextureData::Lut1d { size, .. } => size as usize * 3,
            TextureData::Lut3d { size, .. } => (size as usize).pow(3) * 3,
        }
    }

    fn actual_len(&self) -> usize {
        match *self {
            TextureData::Rgba8 { texels, .. } => texels.len(),
            TextureData::Lut1d { rgb, .. } | TextureData::Lut3d { rgb, .. } => rgb.len(),
        }
    }
}

/// Value uploaded to a uniform slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec3(Vec3),
    Vec4(Vec4),
    Int(i32),
    Float(f32),
}

/// Shader program source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

/// The GPU seam. Every method runs on the render thread.
pub trait GpuDevice {
    fn create_texture(&mut self, data: TextureData<'_>) -> FxResult<TextureHandle>;

    fn delete_texture(&mut self, texture: TextureHandle);

    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> FxResult<BufferHandle>;

    fn delete_buffer(&mut self, buffer: BufferHandle);

    fn create_program(&mut self, source: &ShaderSource) -> FxResult<ProgramHandle>;

    fn delete_program(&mut self, program: ProgramHandle);

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    fn use_program(&mut self, program: ProgramHandle);

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    fn clear(&mut self, rgba: [u8; 4]);

    fn draw(&mut self, buffer: BufferHandle, mode: DrawMode, first: u32, count: u32);
}

impl<D: GpuDevice + ?Sized> GpuDevice for &mut D {
    fn create_texture(&mut self, data: TextureData<'_>) -> FxResult<TextureHandle> {
        (**self).create_texture(data)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        (**self).delete_texture(texture)
    }

    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> FxResult<BufferHandle> {
        (**self).create_vertex_buffer(vertices)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        (**self).delete_buffer(buffer)
    }

    fn create_program(&mut self, source: &ShaderSource) -> FxResult<ProgramHandle> {
        (**self).create_program(source)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        (**self).delete_program(program)
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        (**self).uniform_location(program, name)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        (**self).bind_texture(unit, texture)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        (**self).use_program(program)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        (**self).set_uniform(location, value)
    }

    fn clear(&mut self, rgba: [u8; 4]) {
        (**self).clear(rgba)
    }

    fn draw(&mut self, buffer: BufferHandle, mode: DrawMode, first: u32, count: u32) {
        (**self).draw(buffer, mode, first, count)
    }
}

/// One command observed by [`RecordingDevice`].
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCommand {
    CreateTexture {
        texture: TextureHandle,
        dims: [u32; 3],
    },
    DeleteTexture(TextureHandle),
    CreateBuffer(BufferHandle),
    DeleteBuffer(BufferHandle),
    CreateProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    BindTexture {
        unit: u32,
        texture: TextureHandle,
    },
    UseProgram(ProgramHandle),
    SetUniform {
        location: UniformLocation,
        value: UniformValue,
    },
    Clear([u8; 4]),
    Draw {
        buffer: BufferHandle,
        mode: DrawMode,
        first: u32,
        count: u32,
    },
}

/// Headless device that hands out sequential ids and records every command.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: u32,
    commands: Vec<DeviceCommand>,
    uniform_names: Vec<(ProgramHandle, String)>,
    live_textures: usize,
    live_buffers: usize,
    live_programs: usize,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::Draw { .. }))
            .count()
    }

    /// Objects created and not yet deleted: (textures, buffers, programs).
    pub fn live_objects(&self) -> (usize, usize, usize) {
        (self.live_textures, self.live_buffers, self.live_programs)
    }

    /// Name a uniform location was handed out for, if any.
    pub fn uniform_name(&self, location: UniformLocation) -> Option<&str> {
        usize::try_from(location.0)
            .ok()
            .and_then(|i| self.uniform_names.get(i))
            .map(|(_, n)| n.as_str())
    }

    /// Most recent value uploaded to the named uniform.
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.commands.iter().rev().find_map(|c| match c {
            DeviceCommand::SetUniform { location, value }
                if self.uniform_name(*location) == Some(name) =>
            {
                Some(*value)
            }
            _ => None,
        })
    }

    fn alloc(&mut self) -> FxResult<NonZeroU32> {
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| FxError::device("device id space exhausted"))?;
        NonZeroU32::new(self.next_id).ok_or_else(|| FxError::device("device id overflow"))
    }
}

impl GpuDevice for RecordingDevice {
    fn create_texture(&mut self, data: TextureData<'_>) -> FxResult<TextureHandle> {
        if data.expected_len() != data.actual_len() {
            return Err(FxError::device(format!(
                "texture data length {} does not match layout ({} expected)",
                data.actual_len(),
                data.expected_len()
            )));
        }
        let dims = match data {
            TextureData::Rgba8 { width, height, .. } => [width, height, 1],
            TextureData::Lut1d { size, .. } => [size, 1, 1],
            TextureData::Lut3d { size, .. } => [size, size, size],
        };
        let texture = TextureHandle(self.alloc()?);
        self.live_textures += 1;
        self.commands
            .push(DeviceCommand::CreateTexture { texture, dims });
        Ok(texture)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.live_textures = self.live_textures.saturating_sub(1);
        self.commands.push(DeviceCommand::DeleteTexture(texture));
    }

    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> FxResult<BufferHandle> {
        if vertices.is_empty() {
            return Err(FxError::device("vertex buffer must be non-empty"));
        }
        let buffer = BufferHandle(self.alloc()?);
        self.live_buffers += 1;
        self.commands.push(DeviceCommand::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.live_buffers = self.live_buffers.saturating_sub(1);
        self.commands.push(DeviceCommand::DeleteBuffer(buffer));
    }

    fn create_program(&mut self, source: &ShaderSource) -> FxResult<ProgramHandle> {
        if source.vertex.trim().is_empty() || source.fragment.trim().is_empty() {
            return Err(FxError::device("shader stages must be non-empty"));
        }
        let program = ProgramHandle(self.alloc()?);
        self.live_programs += 1;
        self.commands.push(DeviceCommand::CreateProgram(program));
        Ok(program)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.live_programs = self.live_programs.saturating_sub(1);
        self.commands.push(DeviceCommand::DeleteProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if let Some(i) = self
            .uniform_names
            .iter()
            .position(|(p, n)| *p == program && n == name)
        {
            return i32::try_from(i).ok().map(UniformLocation);
        }
        let loc = i32::try_from(self.uniform_names.len()).ok()?;
        self.uniform_names.push((program, name.to_string()));
        Some(UniformLocation(loc))
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.commands
            .push(DeviceCommand::BindTexture { unit, texture });
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.commands.push(DeviceCommand::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.commands
            .push(DeviceCommand::SetUniform { location, value });
    }

    fn clear(&mut self, rgba: [u8; 4]) {
        self.commands.push(DeviceCommand::Clear(rgba));
    }

    fn draw(&mut self, buffer: BufferHandle, mode: DrawMode, first: u32, count: u32) {
        self.commands.push(DeviceCommand::Draw {
            buffer,
            mode,
            first,
            count,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/device.rs"]
mod tests;
