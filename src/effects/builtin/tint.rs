use crate::compose::queue::FrameItem;
use crate::effects::params;
use crate::effects::protocol::{ColourTransform, EffectLifecycle};
use crate::foundation::core::{ColourMul, FrameIndex};
use crate::foundation::error::{FxError, FxResult};

/// Colour effect: `{rgba: [r,g,b,a]}` and/or `{opacity: a}`; opacity scales alpha.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tint;

pub fn parse_tint_params(value: &serde_json::Value) -> FxResult<ColourMul> {
    const NAME: &str = "tint";
    let p = params::object(NAME, value)?;
    let mut rgba = params::array::<4>(NAME, p, "rgba")?.unwrap_or([1.0; 4]);
    if let Some(opacity) = params::number(NAME, p, "opacity")? {
        rgba[3] *= opacity;
    }
    if rgba.iter().any(|c| *c < 0.0) {
        return Err(FxError::validation("tint components must be >= 0"));
    }
    Ok(ColourMul(rgba))
}

impl EffectLifecycle for Tint {}

impl ColourTransform for Tint {
    fn chained_colour(&mut self, item: &FrameItem, _frame: FrameIndex) -> FxResult<ColourMul> {
        parse_tint_params(&item.params)
    }
}
