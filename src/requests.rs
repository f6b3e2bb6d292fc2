mod qualified;
mod request;

pub use qualified::*;
pub use request::*;
