use crate::effects::protocol::Effect;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FxError, FxResult};
use crate::render::context::RenderScope;

/// Index of a registered effect.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct EffectId(pub u32);

/// Named effects, indexed by [`EffectId`] in registration order.
#[derive(Debug, Default)]
pub struct EffectRegistry {
    effects: Vec<(String, Effect)>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, effect: Effect) -> FxResult<EffectId> {
        let name = name.into().trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(FxError::validation("effect name must be non-empty"));
        }
        if self.id_of(&name).is_some() {
            return Err(FxError::validation(format!(
                "effect '{name}' is already registered"
            )));
        }
        let id = EffectId(
            u32::try_from(self.effects.len())
                .map_err(|_| FxError::validation("effect id overflow"))?,
        );
        self.effects.push((name, effect));
        Ok(id)
    }

    /// Case-insensitive lookup by name.
    pub fn id_of(&self, name: &str) -> Option<EffectId> {
        let name = name.trim().to_ascii_lowercase();
        self.effects
            .iter()
            .position(|(n, _)| *n == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(EffectId)
    }

    pub fn name(&self, id: EffectId) -> Option<&str> {
        self.effects.get(id.0 as usize).map(|(n, _)| n.as_str())
    }

    pub fn get_mut(&mut self, id: EffectId) -> FxResult<&mut Effect> {
        self.effects
            .get_mut(id.0 as usize)
            .map(|(_, e)| e)
            .ok_or_else(|| FxError::validation(format!("unknown effect id {}", id.0)))
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Initialize every effect in order. On failure the effects already initialized are
    /// destroyed again, newest first, before the error is returned.
    pub(crate) fn init_all(&mut self, scope: &mut RenderScope<'_>) -> FxResult<()> {
        for i in 0..self.effects.len() {
            let (name, effect) = &mut self.effects[i];
            if let Err(err) = effect.init_render_objects(scope) {
                tracing::error!(effect = %name, error = %err, "init_render_objects failed");
                for (_, done) in self.effects[..i].iter_mut().rev() {
                    done.destroy_render_objects(scope);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    pub(crate) fn end_frame_all(&mut self, frame: FrameIndex) {
        for (_, effect) in &mut self.effects {
            effect.end_frame(frame);
        }
    }

    pub(crate) fn destroy_all(&mut self, scope: &mut RenderScope<'_>) {
        for (_, effect) in self.effects.iter_mut().rev() {
            effect.destroy_render_objects(scope);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/registry.rs"]
mod tests;
