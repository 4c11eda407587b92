//! Lazily realized, reference-counted colour lookup tables.
//!
//! Acquisition (create / increment / mark pending) may happen on any thread holding a
//! [`LutCache`] clone. Realization needs a [`GpuDevice`], which only the render context
//! owns, so the texture handle of an entry has exactly one writer.

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::assets::cube::{CubeLut, LutDim};
use crate::foundation::config::{LutEviction, LutFailure};
use crate::foundation::error::{FxError, FxResult};
use crate::render::device::{GpuDevice, TextureHandle};

/// Decodes the asset behind a cache key.
pub type LutLoader = dyn Fn(&str) -> FxResult<CubeLut> + Send + Sync;

/// GPU-side result of realizing an entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RealizedLut {
    pub texture: TextureHandle,
    pub dim: LutDim,
    pub size: u32,
    pub domain_min: [f32; 3],
    pub domain_max: [f32; 3],
}

/// Snapshot of one entry for inspection outside the render thread.
#[derive(Clone, Debug, PartialEq)]
pub struct LutEntryInfo {
    pub ref_count: usize,
    pub pending: bool,
    pub realized: bool,
    pub refused: Option<String>,
}

#[derive(Debug)]
struct Slot {
    ref_count: usize,
    pending: bool,
    realized: Option<RealizedLut>,
    refused: Option<String>,
}

impl Slot {
    fn new() -> Self {
        Self {
            ref_count: 1,
            pending: true,
            realized: None,
            refused: None,
        }
    }
}

struct Shared {
    entries: Mutex<HashMap<Arc<str>, Slot>>,
    garbage: Mutex<Vec<TextureHandle>>,
    closed: AtomicBool,
    eviction: LutEviction,
    failure: LutFailure,
    loader: Box<LutLoader>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn release(&self, path: &Arc<str>) {
        let mut entries = lock(&self.entries);
        let Some(slot) = entries.get_mut(path) else {
            return;
        };
        slot.ref_count = slot.ref_count.saturating_sub(1);
        if slot.ref_count > 0 || self.eviction == LutEviction::Retain {
            return;
        }
        if let Some(slot) = entries.remove(path) {
            tracing::debug!(path = %path, "evicting unreferenced lut");
            if let Some(realized) = slot.realized {
                lock(&self.garbage).push(realized.texture);
            }
        }
    }
}

/// Cache of LUT entries keyed by exact path string.
///
/// Cloning the cache clones a handle to the same entries.
#[derive(Clone)]
pub struct LutCache {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for LutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LutCache")
            .field("entries", &self.len())
            .field("closed", &self.is_closed())
            .field("eviction", &self.shared.eviction)
            .field("failure", &self.shared.failure)
            .finish()
    }
}

impl LutCache {
    /// Cache that reads `.cube` files from the filesystem.
    pub fn new(eviction: LutEviction, failure: LutFailure) -> Self {
        Self::with_loader(eviction, failure, |path| CubeLut::load(Path::new(path)))
    }

    pub fn with_loader(
        eviction: LutEviction,
        failure: LutFailure,
        loader: impl Fn(&str) -> FxResult<CubeLut> + Send + Sync + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(HashMap::new()),
                garbage: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
                eviction,
                failure,
                loader: Box::new(loader),
            }),
        }
    }

    /// Register interest in `path`: bump an existing entry or create a pending one.
    pub fn acquire(&self, path: &str) -> FxResult<LutRef> {
        if path.trim().is_empty() {
            return Err(FxError::validation("lut path must be non-empty"));
        }
        let mut entries = lock(&self.shared.entries);
        let key = match entries.get_key_value(path) {
            Some((key, _)) => Arc::clone(key),
            None => Arc::<str>::from(path),
        };
        entries
            .entry(Arc::clone(&key))
            .and_modify(|slot| slot.ref_count += 1)
            .or_insert_with(|| {
                tracing::debug!(path, "registering lut");
                Slot::new()
            });
        Ok(LutRef {
            shared: Arc::clone(&self.shared),
            path: key,
        })
    }

    /// Number of entries currently in the map (including zero-count retained ones).
    pub fn len(&self) -> usize {
        lock(&self.shared.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once [`LutCache::teardown`] has run.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    pub fn info(&self, path: &str) -> Option<LutEntryInfo> {
        lock(&self.shared.entries).get(path).map(|slot| LutEntryInfo {
            ref_count: slot.ref_count,
            pending: slot.pending,
            realized: slot.realized.is_some(),
            refused: slot.refused.clone(),
        })
    }

    /// Realize `lut` on first use; later calls return the stored texture.
    ///
    /// Render thread only (the device is the proof). A decode failure is handled per the
    /// cache's [`LutFailure`] policy: `Refuse` records the failure and returns it on every
    /// call, `Abort` panics. After teardown every call fails.
    #[tracing::instrument(skip(self, lut, device), fields(path = %lut.path()))]
    pub fn realize(&self, lut: &LutRef, device: &mut dyn GpuDevice) -> FxResult<RealizedLut> {
        if !Arc::ptr_eq(&self.shared, &lut.shared) {
            return Err(FxError::asset(format!(
                "lut '{}' belongs to a different cache",
                lut.path()
            )));
        }
        if self.is_closed() {
            return Err(FxError::asset(format!(
                "lut '{}' requested after the cache was torn down",
                lut.path()
            )));
        }
        {
            let entries = lock(&self.shared.entries);
            let slot = entries
                .get(&lut.path)
                .ok_or_else(|| FxError::asset(format!("unknown lut '{}'", lut.path())))?;
            if let Some(realized) = slot.realized {
                return Ok(realized);
            }
            if let Some(reason) = &slot.refused {
                return Err(FxError::asset(format!(
                    "lut '{}' was refused: {reason}",
                    lut.path()
                )));
            }
        }

        let decoded = (self.shared.loader)(lut.path()).and_then(|cube| {
            let texture = device.create_texture(cube.texture_data())?;
            Ok(RealizedLut {
                texture,
                dim: cube.dim,
                size: cube.size,
                domain_min: cube.domain_min,
                domain_max: cube.domain_max,
            })
        });

        let mut entries = lock(&self.shared.entries);
        let slot = entries
            .get_mut(&lut.path)
            .ok_or_else(|| FxError::asset(format!("unknown lut '{}'", lut.path())))?;
        match decoded {
            Ok(realized) => {
                debug_assert!(slot.realized.is_none(), "lut texture written twice");
                slot.realized = Some(realized);
                slot.pending = false;
                tracing::debug!(
                    texture = realized.texture.raw(),
                    size = realized.size,
                    "lut realized"
                );
                Ok(realized)
            }
            Err(err) => {
                if self.shared.failure == LutFailure::Abort {
                    panic!("malformed lut '{}': {err}", lut.path());
                }
                tracing::warn!(error = %err, "refusing lut");
                slot.refused = Some(err.to_string());
                Err(FxError::asset(format!("lut '{}' was refused: {err}", lut.path())))
            }
        }
    }

    /// Destroy textures of evicted entries. Render thread only.
    pub fn collect_garbage(&self, device: &mut dyn GpuDevice) -> usize {
        let garbage = std::mem::take(&mut *lock(&self.shared.garbage));
        for texture in &garbage {
            device.delete_texture(*texture);
        }
        garbage.len()
    }

    /// Destroy every realized texture and close the cache.
    ///
    /// Entries and reference counts stay inspectable and `LutRef`s may still be dropped, but
    /// no handle is ever written again: later `realize` calls fail. Build a new cache for a
    /// new render context.
    pub fn teardown(&self, device: &mut dyn GpuDevice) {
        self.shared.closed.store(true, Ordering::Release);
        self.collect_garbage(device);
        let mut entries = lock(&self.shared.entries);
        for slot in entries.values_mut() {
            if let Some(realized) = slot.realized.take() {
                device.delete_texture(realized.texture);
            }
        }
    }
}

/// A consumer's counted reference to one cache entry. Dropping it releases the count.
pub struct LutRef {
    shared: Arc<Shared>,
    path: Arc<str>,
}

impl LutRef {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.shared.entries)
            .get(&self.path)
            .is_some_and(|s| s.pending)
    }

    pub fn ref_count(&self) -> usize {
        lock(&self.shared.entries)
            .get(&self.path)
            .map_or(0, |s| s.ref_count)
    }

    /// Point this consumer at `path`: acquire the new entry, then release the old one.
    pub fn repoint(&mut self, path: &str) -> FxResult<()> {
        if *self.path == *path {
            return Ok(());
        }
        let cache = LutCache {
            shared: Arc::clone(&self.shared),
        };
        let next = cache.acquire(path)?;
        // Dropping the old value releases its count.
        *self = next;
        Ok(())
    }
}

impl Clone for LutRef {
    fn clone(&self) -> Self {
        let mut entries = lock(&self.shared.entries);
        if let Some(slot) = entries.get_mut(&self.path) {
            slot.ref_count += 1;
        }
        Self {
            shared: Arc::clone(&self.shared),
            path: Arc::clone(&self.path),
        }
    }
}

impl Drop for LutRef {
    fn drop(&mut self) {
        self.shared.release(&self.path);
    }
}

impl std::fmt::Debug for LutRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LutRef").field("path", &self.path).finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/lut_cache.rs"]
mod tests;
