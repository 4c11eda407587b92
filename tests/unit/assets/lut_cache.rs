use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::render::device::{DeviceCommand, RecordingDevice};

const TINY_3D: &str = "LUT_3D_SIZE 2\n0 0 0\n1 0 0\n0 1 0\n1 1 0\n0 0 1\n1 0 1\n0 1 1\n1 1 1\n";

fn counting_cache(eviction: LutEviction, loads: Arc<AtomicUsize>) -> LutCache {
    LutCache::with_loader(eviction, LutFailure::Refuse, move |path| {
        loads.fetch_add(1, Ordering::SeqCst);
        if path.starts_with("bad") {
            return Ok(CubeLut::parse("LUT_3D_SIZE 1\n")?);
        }
        Ok(CubeLut::parse(TINY_3D)?)
    })
}

#[test]
fn same_path_shares_one_entry() {
    let cache = counting_cache(LutEviction::Retain, Arc::default());
    let a = cache.acquire("looks/warm.cube").unwrap();
    let b = cache.acquire("looks/warm.cube").unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(a.ref_count(), 2);
    assert_eq!(b.ref_count(), 2);
}

#[test]
fn distinct_paths_have_independent_pending_flags() {
    let cache = counting_cache(LutEviction::Retain, Arc::default());
    let mut dev = RecordingDevice::new();
    let a = cache.acquire("a.cube").unwrap();
    let b = cache.acquire("b.cube").unwrap();
    assert_eq!(cache.len(), 2);
    assert!(a.is_pending() && b.is_pending());

    cache.realize(&a, &mut dev).unwrap();
    assert!(!a.is_pending());
    assert!(b.is_pending());
    assert_eq!(b.ref_count(), 1);
}

#[test]
fn realization_happens_once_and_pending_never_returns() {
    let loads = Arc::new(AtomicUsize::new(0));
    let cache = counting_cache(LutEviction::Retain, Arc::clone(&loads));
    let mut dev = RecordingDevice::new();
    let lut = cache.acquire("a.cube").unwrap();

    let first = cache.realize(&lut, &mut dev).unwrap();
    let second = cache.realize(&lut, &mut dev).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.dim, LutDim::ThreeD);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(!lut.is_pending());

    let again = cache.acquire("a.cube").unwrap();
    assert!(!again.is_pending());
    assert_eq!(
        dev.commands()
            .iter()
            .filter(|c| matches!(c, DeviceCommand::CreateTexture { dims: [2, 2, 2], .. }))
            .count(),
        1
    );
}

#[test]
fn drop_and_clone_track_reference_count() {
    let cache = counting_cache(LutEviction::Retain, Arc::default());
    let a = cache.acquire("a.cube").unwrap();
    let b = a.clone();
    assert_eq!(a.ref_count(), 2);
    drop(b);
    assert_eq!(a.ref_count(), 1);
    drop(a);
    // Retained with a zero count.
    assert_eq!(cache.info("a.cube").unwrap().ref_count, 0);
}

#[test]
fn repoint_moves_the_count() {
    let cache = counting_cache(LutEviction::Retain, Arc::default());
    let keep = cache.acquire("old.cube").unwrap();
    let mut lut = cache.acquire("old.cube").unwrap();
    lut.repoint("new.cube").unwrap();
    assert_eq!(lut.path(), "new.cube");
    assert_eq!(keep.ref_count(), 1);
    assert_eq!(lut.ref_count(), 1);
    assert!(lut.is_pending());
    lut.repoint("new.cube").unwrap();
    assert_eq!(lut.ref_count(), 1);
}

#[test]
fn evict_at_zero_queues_texture_for_render_thread() {
    let cache = counting_cache(LutEviction::EvictAtZero, Arc::default());
    let mut dev = RecordingDevice::new();
    let lut = cache.acquire("a.cube").unwrap();
    cache.realize(&lut, &mut dev).unwrap();
    assert_eq!(dev.live_objects().0, 1);

    drop(lut);
    assert!(cache.is_empty());
    assert_eq!(dev.live_objects().0, 1);
    assert_eq!(cache.collect_garbage(&mut dev), 1);
    assert_eq!(dev.live_objects().0, 0);
}

#[test]
fn malformed_lut_is_refused_and_remembered() {
    let loads = Arc::new(AtomicUsize::new(0));
    let cache = counting_cache(LutEviction::Retain, Arc::clone(&loads));
    let mut dev = RecordingDevice::new();
    let lut = cache.acquire("bad.cube").unwrap();

    let err = cache.realize(&lut, &mut dev).unwrap_err();
    assert!(err.to_string().contains("refused"));
    assert!(cache.realize(&lut, &mut dev).is_err());
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(lut.is_pending());
    assert!(cache.info("bad.cube").unwrap().refused.is_some());
}

#[test]
#[should_panic(expected = "malformed lut")]
fn abort_policy_is_fatal() {
    let cache = LutCache::with_loader(LutEviction::Retain, LutFailure::Abort, |_| {
        Ok(CubeLut::parse("LUT_1D_SIZE 2\nLUT_3D_SIZE 2\n")?)
    });
    let mut dev = RecordingDevice::new();
    let lut = cache.acquire("x.cube").unwrap();
    let _ = cache.realize(&lut, &mut dev);
}

#[test]
fn teardown_destroys_textures_and_closes_the_cache() {
    let cache = counting_cache(LutEviction::Retain, Arc::default());
    let mut dev = RecordingDevice::new();
    let lut = cache.acquire("a.cube").unwrap();
    let never_used = cache.acquire("b.cube").unwrap();
    cache.realize(&lut, &mut dev).unwrap();
    cache.teardown(&mut dev);

    assert!(cache.is_closed());
    assert_eq!(dev.live_objects().0, 0);
    assert!(!lut.is_pending(), "pending never returns once realized");
    assert_eq!(lut.ref_count(), 1);

    let creates_before = dev
        .commands()
        .iter()
        .filter(|c| matches!(c, DeviceCommand::CreateTexture { .. }))
        .count();
    let err = cache.realize(&lut, &mut dev).unwrap_err();
    assert!(err.to_string().contains("torn down"));
    assert!(cache.realize(&never_used, &mut dev).is_err());
    let creates_after = dev
        .commands()
        .iter()
        .filter(|c| matches!(c, DeviceCommand::CreateTexture { .. }))
        .count();
    assert_eq!(creates_before, creates_after, "no second handle is written");
}

#[test]
fn acquisition_from_another_thread_is_visible() {
    let cache = counting_cache(LutEviction::Retain, Arc::default());
    let control = cache.clone();
    let handle = std::thread::spawn(move || control.acquire("shared.cube").unwrap());
    let from_control = handle.join().unwrap();
    let local = cache.acquire("shared.cube").unwrap();
    assert_eq!(local.ref_count(), 2);
    assert_eq!(from_control.path(), "shared.cube");
}

#[test]
fn rejects_empty_path_and_foreign_refs() {
    let cache = counting_cache(LutEviction::Retain, Arc::default());
    assert!(cache.acquire("  ").is_err());

    let other = counting_cache(LutEviction::Retain, Arc::default());
    let foreign = other.acquire("a.cube").unwrap();
    let mut dev = RecordingDevice::new();
    assert!(cache.realize(&foreign, &mut dev).is_err());
}
