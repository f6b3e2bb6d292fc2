mod cycle;
mod deferred;
#[allow(clippy::module_inception)]
mod graph;
mod node;
mod path;
mod traversal;

pub use cycle::*;
pub(crate) use deferred::*;
pub use graph::*;
pub use node::*;
pub(crate) use path::*;
pub use traversal::*;
