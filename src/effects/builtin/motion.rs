use crate::compose::queue::FrameItem;
use crate::effects::params;
use crate::effects::protocol::{EffectLifecycle, SpatialTransform};
use crate::foundation::core::{FrameIndex, Mat4, Vec3};
use crate::foundation::error::{FxError, FxResult};
use crate::transform::node::TransformNode;

/// Spatial effect: `{position: [x,y,z], rotation_deg: [x,y,z], scale: s | [x,y,z]}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Motion;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    pub position: Vec3,
    pub rotation_deg: Vec3,
    pub scale: Vec3,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_deg: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl MotionParams {
    pub fn to_node(self) -> TransformNode {
        let mut node = TransformNode::default();
        node.set_position(self.position);
        node.set_rotation_euler_degrees(self.rotation_deg);
        node.set_scale(self.scale);
        node
    }
}

pub fn parse_motion_params(value: &serde_json::Value) -> FxResult<MotionParams> {
    const NAME: &str = "motion";
    let p = params::object(NAME, value)?;
    let mut out = MotionParams::default();
    if let Some(v) = params::array::<3>(NAME, p, "position")? {
        out.position = Vec3::from(v);
    }
    if let Some(v) = params::array::<3>(NAME, p, "rotation_deg")? {
        out.rotation_deg = Vec3::from(v);
    }
    let uniform_scale = p
        .and_then(|p| p.get("scale"))
        .is_some_and(serde_json::Value::is_number);
    if uniform_scale {
        if let Some(s) = params::number(NAME, p, "scale")? {
            out.scale = Vec3::splat(s);
        }
    } else if let Some(v) = params::array::<3>(NAME, p, "scale")? {
        out.scale = Vec3::from(v);
    }
    if out.scale.cmpeq(Vec3::ZERO).any() {
        return Err(FxError::validation("motion.scale components must be non-zero"));
    }
    Ok(out)
}

impl EffectLifecycle for Motion {}

impl SpatialTransform for Motion {
    fn chained_spatial_transform(
        &mut self,
        item: &FrameItem,
        _frame: FrameIndex,
    ) -> FxResult<Mat4> {
        Ok(parse_motion_params(&item.params)?.to_node().matrix())
    }
}
