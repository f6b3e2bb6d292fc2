use crate::{Component, ComponentInfo, Interface};
use std::collections::HashMap;

/// Finds the components that provide a capability.
///
/// Group dependencies (`Vec<Svc<dyn I>>`) are resolved by asking discovery
/// for the candidates of `dyn I`, then resolving each candidate through its
/// binding. The order of the candidates is the order of the group.
pub trait Discovery: Component {
    /// Returns the candidates providing `capability`, in order.
    fn find_candidates(&self, capability: ComponentInfo) -> Vec<ComponentInfo>;
}

/// A fixed table of candidates per capability.
///
/// ## Example
///
/// ```
/// use runtime_composition::{
///     interface, Component, Container, IntoSingleton, StaticDiscovery, Svc,
///     WithInterface,
/// };
///
/// trait Plugin: Component {}
/// interface!(dyn Plugin);
///
/// struct First;
/// impl Plugin for First {}
///
/// struct Second;
/// impl Plugin for Second {}
///
/// let mut builder = Container::builder();
/// builder.provide((|| First).singleton().with_interface::<dyn Plugin>());
/// builder.provide((|| Second).singleton().with_interface::<dyn Plugin>());
/// builder.discovery(StaticDiscovery::new().register::<dyn Plugin, Second>());
///
/// let container = builder.build();
/// let plugins: Vec<Svc<dyn Plugin>> = container.get().unwrap();
/// assert_eq!(1, plugins.len());
/// ```
#[derive(Clone, Debug, Default)]
pub struct StaticDiscovery {
    candidates: HashMap<ComponentInfo, Vec<ComponentInfo>>,
}

impl StaticDiscovery {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        StaticDiscovery::default()
    }

    /// Adds `T` as the next candidate for interface `I`.
    #[must_use]
    pub fn register<I, T>(mut self) -> Self
    where
        I: ?Sized + Interface,
        T: Component,
    {
        let candidates = self.candidates.entry(ComponentInfo::of::<I>()).or_default();
        let candidate = ComponentInfo::of::<T>();
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }

        self
    }
}

impl Discovery for StaticDiscovery {
    fn find_candidates(&self, capability: ComponentInfo) -> Vec<ComponentInfo> {
        self.candidates.get(&capability).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Foo;
    struct Bar;

    /// Candidates are returned in registration order without duplicates.
    #[test]
    fn candidates_keep_registration_order() {
        let discovery = StaticDiscovery::new()
            .register::<u8, Bar>()
            .register::<u8, Foo>()
            .register::<u8, Bar>();

        assert_eq!(
            vec![ComponentInfo::of::<Bar>(), ComponentInfo::of::<Foo>()],
            discovery.find_candidates(ComponentInfo::of::<u8>())
        );
        assert!(discovery.find_candidates(ComponentInfo::of::<u16>()).is_empty());
    }
}
