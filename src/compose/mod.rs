//! Per-frame composition: the chained-effects queues and the pass that folds them.

pub mod compositor;
pub mod plan;
pub mod queue;
