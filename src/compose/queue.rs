use std::collections::VecDeque;

use crate::effects::registry::EffectId;
use crate::render::device::TextureHandle;

/// One scheduled effect instance for the current output frame on one track.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameItem {
    pub effect: EffectId,
    /// Stable id of the effect instance on the timeline; survives across frames.
    #[serde(default)]
    pub instance: u64,
    /// Per-instance parameter block; `null` means "no attached data".
    #[serde(default)]
    pub params: serde_json::Value,
}

impl FrameItem {
    pub fn new(effect: EffectId, instance: u64, params: serde_json::Value) -> Self {
        Self {
            effect,
            instance,
            params,
        }
    }
}

/// Per-track items awaiting composition, consumed strictly front to back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChainedQueue {
    items: VecDeque<FrameItem>,
}

impl ChainedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: FrameItem) {
        self.items.push_back(item);
    }

    pub fn front(&self) -> Option<&FrameItem> {
        self.items.front()
    }

    pub fn pop_front(&mut self) -> Option<FrameItem> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Discard what is left, returning how many items were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }
}

impl FromIterator<FrameItem> for ChainedQueue {
    fn from_iter<I: IntoIterator<Item = FrameItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// The clip frame a track composites this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceFrame {
    pub texture: Option<TextureHandle>,
    pub width: u32,
    pub height: u32,
}

/// Everything one track contributes to an output frame.
#[derive(Clone, Debug)]
pub struct TrackQueue {
    pub name: String,
    pub source: SourceFrame,
    pub queue: ChainedQueue,
}
