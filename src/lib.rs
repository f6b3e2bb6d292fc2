//! # Runtime component composition.
//!
//! Components are wired together at runtime from the bindings registered
//! with a [`Container`]. Resolution happens in two phases. First the
//! component graph is walked, every dependency site is bound to a node, and
//! the context each component is created under is worked out. Then the
//! nodes are instantiated, reusing cached instances where their context
//! allows it.
//!
//! Instances are held in thread-safe [`Svc<T>`] pointers, which are always
//! [`Arc<T>`](std::sync::Arc).
//!
//! ## Contexts
//!
//! Dependency sites can be qualified with user-defined [`Qualifier`]s. A
//! component only sees the qualifiers it declares it accepts, and is cached
//! once per distinct set of them. A component also depends on every
//! qualifier its own dependencies were affected by, so that it is never
//! shared between contexts that would give it different dependencies.
//!
//! ## Interfaces and cycles
//!
//! Components can be requested through interfaces, which are trait objects
//! marked with the [`interface!`] macro. When a dependency cycle passes
//! through an interface whose methods the macro knows about, the cycle is
//! broken with a [`Deferred`] placeholder that resolves the real component
//! on first use. Every other cycle is reported as a
//! [`ResolutionError::CircularReference`].
//!
//! ## Component lifetimes
//!
//! Lifetimes of components are controlled by the provider they are bound
//! with:
//!
//! - **[Singleton](crate::IntoSingleton):** A component is created once per
//!   domain and context, then reused for each future request.
//! - **[Transient](crate::IntoTransient):** A new component is created for
//!   every dependency site that requests it.
//! - **[Constant](crate::ConstantProvider):** A component created before the
//!   container is built, provided as-is.
//!
//! Custom providers can be created by implementing either the
//! [`TypedProvider`] or [`Provider`] trait.
//!
//! ## Logging
//!
//! Resolution decisions are reported through [`tracing`] at the `trace` and
//! `debug` levels. No subscriber is installed by this crate.
//!
//! ## Example
//!
//! ```
//! use runtime_composition::{
//!     constant, define_module, interface, Component, Container,
//!     IntoSingleton, IntoTransient, Svc,
//! };
//! use std::error::Error;
//!
//! struct User(String);
//!
//! trait DataService: Component {
//!     fn get_user(&self, user_id: &str) -> Option<User>;
//! }
//!
//! interface! {
//!     dyn DataService {
//!         fn get_user(&self, user_id: &str) -> Option<User>;
//!     }
//! }
//!
//! #[derive(Default)]
//! struct MockDataService;
//! impl DataService for MockDataService {
//!     fn get_user(&self, user_id: &str) -> Option<User> {
//!         Some(User(user_id.to_owned()))
//!     }
//! }
//!
//! struct UserService {
//!     data_service: Svc<dyn DataService>,
//!     page_size: Svc<usize>,
//! }
//!
//! impl UserService {
//!     pub fn new(data_service: Svc<dyn DataService>, page_size: Svc<usize>) -> Self {
//!         UserService {
//!             data_service,
//!             page_size,
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let module = define_module! {
//!         services = [
//!             UserService::new.transient(),
//!             constant(50usize),
//!         ],
//!         interfaces = {
//!             dyn DataService = [MockDataService::default.singleton()],
//!         },
//!     };
//!
//!     let mut builder = Container::builder();
//!     builder.add_module(&module);
//!
//!     let container = builder.build();
//!     let user_service: Svc<UserService> = container.get()?;
//!     let user = user_service.data_service.get_user("john");
//!     assert_eq!("john", user.unwrap().0);
//!     assert_eq!(50, *user_service.page_size);
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![warn(missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::needless_doctest_main
)]

mod builder;
mod cache;
mod components;
mod container;
mod context;
mod discovery;
mod factories;
mod graph;
mod guard;
mod injector;
mod module;
mod providers;
mod requests;

pub use builder::*;
pub use cache::*;
pub use components::*;
pub use container::*;
pub use context::*;
pub use discovery::*;
pub use factories::*;
pub use graph::*;
pub use guard::*;
pub use injector::*;
pub use module::*;
pub use providers::*;
pub use requests::*;

#[cfg(test)]
mod tests;
