mod attribute;
mod component_context;
mod definition;
mod reference;

pub use attribute::*;
pub use component_context::*;
pub use definition::*;
pub use reference::*;
