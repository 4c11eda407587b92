//! Spatial transform model: per-node matrices and the push/pop stack they feed.

pub mod node;
pub mod stack;
