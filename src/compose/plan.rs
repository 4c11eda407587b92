//! JSON description of one output frame: tracks, their sources and their effect queues.

use std::path::Path;

use anyhow::Context;

use crate::compose::queue::{ChainedQueue, FrameItem, SourceFrame, TrackQueue};
use crate::effects::registry::EffectRegistry;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{FxError, FxResult};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// One output frame to compose.
pub struct FramePlan {
    pub canvas: Canvas,
    #[serde(default)]
    pub frame: FrameIndex,
    pub tracks: Vec<PlanTrack>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A track's source and its chained effects, front first.
pub struct PlanTrack {
    pub name: String,
    pub source: PlanSource,
    #[serde(default)]
    pub items: Vec<PlanItem>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
/// Size of the clip frame the track composites.
pub struct PlanSource {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Effect instance scheduled on a track, referenced by registered name.
pub struct PlanItem {
    pub effect: String,
    #[serde(default)]
    pub instance: u64,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl FramePlan {
    pub fn from_json_str(s: &str) -> FxResult<Self> {
        let plan: Self = serde_json::from_str(s)
            .map_err(|e| FxError::validation(format!("invalid frame plan: {e}")))?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn from_json_file(path: &Path) -> FxResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read frame plan '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> FxResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(FxError::validation("canvas width/height must be > 0"));
        }
        for track in &self.tracks {
            if track.name.trim().is_empty() {
                return Err(FxError::validation("track name must be non-empty"));
            }
            if track.source.width == 0 || track.source.height == 0 {
                return Err(FxError::validation(format!(
                    "track '{}' source width/height must be > 0",
                    track.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve effect names against `registry` and build one queue per track, in plan order.
    pub fn build_tracks(&self, registry: &EffectRegistry) -> FxResult<Vec<TrackQueue>> {
        self.tracks
            .iter()
            .map(|track| {
                let queue = track
                    .items
                    .iter()
                    .map(|item| {
                        let id = registry.id_of(&item.effect).ok_or_else(|| {
                            FxError::validation(format!(
                                "track '{}': unknown effect '{}'",
                                track.name, item.effect
                            ))
                        })?;
                        Ok(FrameItem::new(id, item.instance, item.params.clone()))
                    })
                    .collect::<FxResult<ChainedQueue>>()?;
                Ok(TrackQueue {
                    name: track.name.clone(),
                    source: SourceFrame {
                        texture: None,
                        width: track.source.width,
                        height: track.source.height,
                    },
                    queue,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/plan.rs"]
mod tests;
