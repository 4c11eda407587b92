pub use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

/// Output frame index on the timeline.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Output surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Orthographic projection mapping pixel space (origin top-left, y down) to clip space.
    pub fn ortho_projection(self) -> Mat4 {
        Mat4::orthographic_rh_gl(0.0, self.width as f32, self.height as f32, 0.0, -1.0, 1.0)
    }
}

/// Straight-alpha RGBA multiplier folded from colour-transform effects.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColourMul(pub [f32; 4]);

impl Default for ColourMul {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColourMul {
    pub const IDENTITY: Self = Self([1.0; 4]);

    /// Component-wise product; non-finite or negative results clamp to zero.
    pub fn fold(self, other: Self) -> Self {
        let mut out = [0.0f32; 4];
        for (i, o) in out.iter_mut().enumerate() {
            let v = self.0[i] * other.0[i];
            *o = if v.is_finite() && v > 0.0 { v } else { 0.0 };
        }
        Self(out)
    }

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::from_array(self.0)
    }
}
