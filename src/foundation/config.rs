use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{FxError, FxResult};

/// What the LUT cache does with an entry whose reference count drops to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LutEviction {
    /// Keep the entry (and its GPU texture) until the cache tears down.
    #[default]
    Retain,
    /// Drop the entry; a realized texture is destroyed on the next render-thread garbage pass.
    EvictAtZero,
}

/// What happens when a LUT fails to decode during realization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LutFailure {
    /// Refuse that one asset: the consuming track is skipped for the frame.
    #[default]
    Refuse,
    /// Treat a malformed LUT as fatal for the process.
    Abort,
}

/// Engine-wide settings, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed transform stack depth.
    pub stack_depth: usize,
    /// Spatial-transform folds allowed per track pass.
    pub max_spatial_folds: usize,
    pub lut_eviction: LutEviction,
    pub lut_failure: LutFailure,
    /// If set, the device clears to this RGBA8 colour at frame start.
    pub clear_rgba: Option<[u8; 4]>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stack_depth: 32,
            max_spatial_folds: 1,
            lut_eviction: LutEviction::Retain,
            lut_failure: LutFailure::Refuse,
            clear_rgba: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> FxResult<()> {
        if self.stack_depth < 2 {
            return Err(FxError::validation("stack_depth must be >= 2"));
        }
        if self.max_spatial_folds == 0 {
            return Err(FxError::validation("max_spatial_folds must be >= 1"));
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> FxResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| FxError::validation(format!("invalid engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> FxResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read engine config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}
