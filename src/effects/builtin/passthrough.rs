use std::rc::Rc;

use crate::compose::queue::{ChainedQueue, FrameItem, SourceFrame};
use crate::effects::protocol::{EffectLifecycle, PassState, PixelEffect};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::FxResult;
use crate::render::context::RenderScope;
use crate::render::node::{NodeResource, RenderNode};

/// Terminal pixel effect: one draw of the source with the folded transform and colour.
#[derive(Debug, Default)]
pub struct Passthrough {
    node: Option<RenderNode>,
}

impl Passthrough {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EffectLifecycle for Passthrough {
    fn init_render_objects(&mut self, scope: &mut RenderScope<'_>) -> FxResult<()> {
        let shader = NodeResource::Shared(Rc::clone(&scope.shared.composite));
        self.node = Some(super::quad_node(scope, shader));
        Ok(())
    }

    fn destroy_render_objects(&mut self, scope: &mut RenderScope<'_>) {
        if let Some(node) = self.node.take() {
            node.destroy(scope.device);
        }
    }
}

impl PixelEffect for Passthrough {
    fn render(
        &mut self,
        scope: &mut RenderScope<'_>,
        pass: &PassState,
        source: &SourceFrame,
        _item: &FrameItem,
        _frame: FrameIndex,
        _queue: &mut ChainedQueue,
    ) -> FxResult<()> {
        let Some(node) = self.node.as_mut() else {
            panic!("passthrough rendered before init_render_objects");
        };
        super::prepare_source_draw(node, scope, pass, source);
        scope.draw_node(node);
        Ok(())
    }
}
