//! Colour lookup tables: the Cube parser and the reference-counted GPU cache.

pub mod cube;
pub mod lut_cache;
