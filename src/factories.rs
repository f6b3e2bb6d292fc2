mod constructors;
mod factory;
mod fallible;
mod fields;

pub use constructors::*;
pub use factory::*;
pub use fallible::*;
pub use fields::*;
