//! Position / rotation / scale node deriving a model matrix.

use crate::foundation::core::{EulerRot, Mat4, Quat, Vec3};
use crate::transform::stack::TransformStack;

/// Euler convention used for rotation input and the derived display value.
pub const EULER_ORDER: EulerRot = EulerRot::XYZ;

/// Spatial transform with an eagerly derived `translate · rotate · scale` matrix.
///
/// Every setter re-derives the matrix, so [`TransformNode::matrix`] is always current.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformNode {
    position: Vec3,
    rotation: Quat,
    euler_deg: Vec3,
    scale: Vec3,
    matrix: Mat4,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            euler_deg: Vec3::ZERO,
            scale: Vec3::ONE,
            matrix: Mat4::IDENTITY,
        }
    }
}

impl TransformNode {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let mut node = Self {
            position,
            scale,
            ..Self::default()
        };
        node.set_rotation(rotation);
        node
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Euler angles in degrees, derived from the quaternion. Display only.
    pub fn euler_degrees(&self) -> Vec3 {
        self.euler_deg
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_matrix();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.update_matrix();
    }

    /// Set rotation from a quaternion. Degenerate (zero or non-finite) quaternions become identity.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = normalize_quat(rotation);
        self.update_rotation_cache();
    }

    /// Set rotation from an angle (radians) around `axis`. A zero axis means identity.
    pub fn set_rotation_axis_angle(&mut self, angle_rad: f32, axis: Vec3) {
        let q = axis
            .try_normalize()
            .map_or(Quat::IDENTITY, |a| Quat::from_axis_angle(a, angle_rad));
        self.set_rotation(q);
    }

    /// Set rotation from Euler angles in degrees ([`EULER_ORDER`]).
    pub fn set_rotation_euler_degrees(&mut self, euler_deg: Vec3) {
        let q = Quat::from_euler(
            EULER_ORDER,
            euler_deg.x.to_radians(),
            euler_deg.y.to_radians(),
            euler_deg.z.to_radians(),
        );
        self.set_rotation(q);
    }

    /// Multiply this node's matrix into the top of `stack`.
    ///
    /// Must run inside a push/pop pair owned by the caller.
    pub fn transform(&self, stack: &mut TransformStack) {
        stack.multiply_matrix(self.matrix);
    }

    fn update_rotation_cache(&mut self) {
        let (x, y, z) = self.rotation.to_euler(EULER_ORDER);
        self.euler_deg = Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees());
        self.update_matrix();
    }

    fn update_matrix(&mut self) {
        // Order is fixed: T * R * S.
        self.matrix = Mat4::from_translation(self.position)
            * Mat4::from_quat(self.rotation)
            * Mat4::from_scale(self.scale);
    }
}

fn normalize_quat(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if !len_sq.is_finite() || len_sq <= f32::EPSILON {
        return Quat::IDENTITY;
    }
    q.normalize()
}

#[cfg(test)]
#[path = "../../tests/unit/transform/node.rs"]
mod tests;
