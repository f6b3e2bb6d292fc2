mod component_cache;
mod domain;

pub use component_cache::*;
pub use domain::*;
