use super::*;
use crate::assets::cube::CubeLut;
use crate::foundation::config::{LutEviction, LutFailure};
use crate::render::device::{DeviceCommand, RecordingDevice};

fn cache() -> LutCache {
    LutCache::with_loader(LutEviction::Retain, LutFailure::Refuse, |_| {
        Ok(CubeLut::parse("LUT_1D_SIZE 2\n0 0 0\n1 1 1\n")?)
    })
}

#[test]
fn enter_creates_shared_quad_and_composite_shader() {
    let mut effects = EffectRegistry::new();
    let ctx = RenderContext::enter(
        RecordingDevice::new(),
        cache(),
        EngineConfig::default(),
        &mut effects,
    )
    .unwrap();
    assert_eq!(ctx.device().live_objects(), (0, 1, 1));
    assert_eq!(ctx.stack().depth(), 1);
}

#[test]
fn enter_rejects_invalid_config() {
    let mut effects = EffectRegistry::new();
    let config = EngineConfig {
        stack_depth: 1,
        ..EngineConfig::default()
    };
    let err = RenderContext::enter(RecordingDevice::new(), cache(), config, &mut effects)
        .unwrap_err();
    assert!(err.to_string().contains("stack_depth"));
}

#[test]
fn begin_frame_resets_projection_and_clears_when_configured() {
    let mut effects = EffectRegistry::new();
    let config = EngineConfig {
        clear_rgba: Some([0, 0, 0, 255]),
        ..EngineConfig::default()
    };
    let mut ctx =
        RenderContext::enter(RecordingDevice::new(), cache(), config, &mut effects).unwrap();
    let canvas = Canvas {
        width: 640,
        height: 360,
    };
    ctx.begin_frame(canvas);
    assert_eq!(ctx.stack().projection(), canvas.ortho_projection());
    assert_eq!(ctx.stack().top(), Mat4::IDENTITY);
    assert_eq!(
        ctx.device().commands().last(),
        Some(&DeviceCommand::Clear([0, 0, 0, 255]))
    );
}

#[test]
fn teardown_releases_shared_objects_and_lut_textures() {
    let luts = cache();
    let mut effects = EffectRegistry::new();
    let mut ctx = RenderContext::enter(
        RecordingDevice::new(),
        luts.clone(),
        EngineConfig::default(),
        &mut effects,
    )
    .unwrap();
    let lut = luts.acquire("a.cube").unwrap();
    luts.realize(&lut, ctx.device_mut()).unwrap();
    assert_eq!(ctx.device().live_objects(), (1, 1, 1));

    let dev = ctx.teardown(&mut effects);
    assert_eq!(dev.live_objects(), (0, 0, 0));
    assert!(!lut.is_pending());
    assert!(luts.is_closed());
    assert_eq!(lut.ref_count(), 1);
}

#[test]
fn scope_counts_only_nodes_with_geometry() {
    let mut effects = EffectRegistry::new();
    let mut ctx = RenderContext::enter(
        RecordingDevice::new(),
        cache(),
        EngineConfig::default(),
        &mut effects,
    )
    .unwrap();
    let mut scope = ctx.scope();
    let quad = RenderNode::new().with_geometry(crate::render::node::NodeResource::Shared(
        Rc::clone(&scope.shared.quad),
    ));
    scope.draw_node(&RenderNode::new());
    scope.draw_node(&quad);
    assert_eq!(scope.draws(), 1);
    assert_eq!(scope.stack.depth(), 1);
    drop(quad);
    assert_eq!(ctx.device().draw_count(), 1);
}

struct FailingInit;

impl crate::effects::protocol::EffectLifecycle for FailingInit {
    fn init_render_objects(&mut self, _scope: &mut RenderScope<'_>) -> FxResult<()> {
        Err(crate::foundation::error::FxError::device("no program slots left"))
    }
}

impl crate::effects::protocol::ColourTransform for FailingInit {
    fn chained_colour(
        &mut self,
        _item: &crate::compose::queue::FrameItem,
        _frame: crate::foundation::core::FrameIndex,
    ) -> FxResult<crate::foundation::core::ColourMul> {
        Ok(crate::foundation::core::ColourMul::IDENTITY)
    }
}

#[test]
fn failed_enter_releases_everything_created_so_far() {
    let luts = cache();
    let mut effects = EffectRegistry::new();
    crate::effects::builtin::register_builtins(&mut effects, &luts).unwrap();
    effects
        .register(
            "broken",
            crate::effects::protocol::Effect::Colour(Box::new(FailingInit)),
        )
        .unwrap();

    let mut dev = RecordingDevice::new();
    let err =
        RenderContext::enter(&mut dev, luts, EngineConfig::default(), &mut effects).unwrap_err();
    assert!(err.to_string().contains("no program slots left"));
    // shared quad + composite, plus the two lut programs created before the failure
    let programs = dev
        .commands()
        .iter()
        .filter(|c| matches!(c, DeviceCommand::CreateProgram(_)))
        .count();
    assert!(programs >= 3);
    assert_eq!(dev.live_objects(), (0, 0, 0));
}
