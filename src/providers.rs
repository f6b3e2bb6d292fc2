//! Providers bind components to the interfaces they are requested through.

mod component;
mod constant;
mod interface;
#[allow(clippy::module_inception)]
mod providers;

pub use component::*;
pub use constant::*;
pub use interface::*;
pub use providers::*;
