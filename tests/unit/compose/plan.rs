use super::*;
use crate::assets::lut_cache::LutCache;
use crate::effects::builtin::register_builtins;
use crate::foundation::config::{LutEviction, LutFailure};

const PLAN: &str = r#"{
  "canvas": { "width": 320, "height": 180 },
  "frame": 12,
  "tracks": [
    {
      "name": "v1",
      "source": { "width": 320, "height": 180 },
      "items": [
        { "effect": "Motion", "instance": 4, "params": { "position": [10, 0, 0] } },
        { "effect": "passthrough" }
      ]
    },
    { "name": "v2", "source": { "width": 16, "height": 16 } }
  ]
}"#;

fn registry() -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    register_builtins(
        &mut registry,
        &LutCache::new(LutEviction::Retain, LutFailure::Refuse),
    )
    .unwrap();
    registry
}

#[test]
fn builds_queues_in_plan_order() {
    let plan = FramePlan::from_json_str(PLAN).unwrap();
    assert_eq!(plan.frame, FrameIndex(12));
    let tracks = plan.build_tracks(&registry()).unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].name, "v1");
    assert_eq!(tracks[0].queue.len(), 2);
    let front = tracks[0].queue.front().unwrap();
    assert_eq!(front.instance, 4);
    assert_eq!(registry().name(front.effect), Some("motion"));
    assert!(tracks[1].queue.is_empty());
    assert_eq!(tracks[1].source.width, 16);
}

#[test]
fn unknown_effect_name_is_rejected() {
    let plan = FramePlan::from_json_str(
        r#"{"canvas":{"width":1,"height":1},"tracks":[
            {"name":"v1","source":{"width":1,"height":1},"items":[{"effect":"sparkle"}]}]}"#,
    )
    .unwrap();
    let err = plan.build_tracks(&registry()).unwrap_err();
    assert!(err.to_string().contains("unknown effect 'sparkle'"));
}

#[test]
fn zero_sized_canvas_is_rejected() {
    let err = FramePlan::from_json_str(r#"{"canvas":{"width":0,"height":1},"tracks":[]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("canvas"));
}
