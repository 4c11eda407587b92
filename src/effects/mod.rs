//! Effect kinds, the registry, and the built-in effects.

pub mod builtin;
pub mod params;
pub mod protocol;
pub mod registry;
