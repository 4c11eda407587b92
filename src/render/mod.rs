//! Render-thread state: the GPU seam, drawable nodes and the context that owns them.

pub mod context;
pub mod device;
pub mod node;
pub mod shaders;
