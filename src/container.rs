use crate::{
    inject, AccessGuard, ComponentInfo, ContainerBuilder, ContextDefinition,
    DependencyInjector, Discovery, Domain, Graph, GroupNode, Instantiation,
    NodeRef, Provider, ProviderMap, Reference, Request, ResolutionError,
    ResolutionResult, Svc, Traversal,
};
use std::{
    fmt::{Debug, Formatter},
    sync::Weak,
};
use tracing::{debug, trace};

/// The shared state of a container. This is the graph traversals walk, so
/// placeholders can hold it weakly without keeping the container alive.
struct ContainerInner {
    providers: ProviderMap,
    root: ContextDefinition,
    domain: Option<Domain>,
    discovery: Option<Svc<dyn Discovery>>,
    this: Weak<ContainerInner>,
}

/// A runtime composition container. This holds the bindings between
/// interfaces and the providers of their components, and resolves requests
/// against them.
///
/// Containers are cheap to clone. Clones share their bindings, and every
/// component is cached by its provider under the container's [`Domain`].
///
/// ## Example
///
/// ```
/// use runtime_composition::{Container, IntoSingleton, IntoTransient, Svc};
///
/// struct Config(u16);
/// struct Server(Svc<Config>);
///
/// let mut builder = Container::builder();
/// builder.provide((|| Config(8080)).singleton());
/// builder.provide(Server.transient());
///
/// let container = builder.build();
/// let server: Svc<Server> = container.get().unwrap();
/// assert_eq!(8080, server.0 .0);
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Svc<ContainerInner>,
}

impl Container {
    /// Creates a builder for a container.
    #[must_use]
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    pub(crate) fn new_from_parts(
        providers: ProviderMap,
        root: ContextDefinition,
        domain: Option<Domain>,
        discovery: Option<Svc<dyn Discovery>>,
    ) -> Self {
        Container {
            inner: Svc::new_cyclic(|this| ContainerInner {
                providers,
                root,
                domain,
                discovery,
                this: this.clone(),
            }),
        }
    }

    /// The domain instances created by this container are cached under.
    #[must_use]
    pub fn domain(&self) -> Option<&Domain> {
        self.inner.domain.as_ref()
    }

    /// The definition requests made through [`Container::get()`] start from.
    #[must_use]
    pub fn root_definition(&self) -> &ContextDefinition {
        &self.inner.root
    }

    /// Finds the components providing an interface, in order. Without a
    /// [`Discovery`], these are the components bound to the interface in
    /// registration order.
    #[must_use]
    pub fn find_candidates(&self, interface: ComponentInfo) -> Vec<ComponentInfo> {
        self.inner.find_candidates(interface)
    }

    /// Starts a traversal of this container's component graph.
    #[must_use]
    pub fn traversal(&self) -> Traversal {
        Traversal::new(self.inner.clone())
    }

    /// Performs a request for a component, a group of components, or any
    /// other [`Request`].
    ///
    /// ## Example
    ///
    /// ```
    /// use runtime_composition::{Container, IntoSingleton, Svc};
    ///
    /// struct Foo;
    ///
    /// let mut builder = Container::builder();
    /// builder.provide((|| Foo).singleton());
    ///
    /// let container = builder.build();
    /// let _foo: Svc<Foo> = container.get().unwrap();
    /// let missing: Option<Svc<u32>> = container.get().unwrap();
    /// assert!(missing.is_none());
    /// ```
    pub fn get<R: Request>(&self) -> ResolutionResult<R> {
        self.get_in(self.inner.root.clone())
    }

    /// Performs a request starting from a custom context definition instead
    /// of the container's root definition.
    pub fn get_in<R: Request>(&self, definition: ContextDefinition) -> ResolutionResult<R> {
        trace!(request = std::any::type_name::<R>(), "resolving request");

        let mut traversal = self.traversal();
        let resolved = {
            let mut injector = DependencyInjector::top_level(&mut traversal, &definition);
            R::resolve(&mut injector)?
        };

        let context = definition.create();
        let guard = AccessGuard::enabled(self.clone());
        let mut instantiation = Instantiation::new(&mut traversal, &context, &guard);
        resolved.materialize(&mut instantiation)
    }
}

impl ContainerInner {
    fn container(&self, component: ComponentInfo) -> ResolutionResult<Container> {
        self.this
            .upgrade()
            .map(|inner| Container { inner })
            .ok_or(ResolutionError::ContainerDropped { component })
    }

    fn providers_for(&self, interface: ComponentInfo) -> &[Svc<dyn Provider>] {
        self.providers.get(&interface).map_or(&[], Vec::as_slice)
    }

    fn find_candidates(&self, interface: ComponentInfo) -> Vec<ComponentInfo> {
        if let Some(discovery) = &self.discovery {
            return discovery.find_candidates(interface);
        }

        let mut candidates = Vec::new();
        for provider in self.providers_for(interface) {
            let result = provider.result();
            if !candidates.contains(&result) {
                candidates.push(result);
            }
        }

        candidates
    }
}

impl Graph for ContainerInner {
    fn resolve_component(
        &self,
        reference: &Reference,
        definition: &mut ContextDefinition,
        traversal: &mut Traversal,
    ) -> ResolutionResult<Option<NodeRef>> {
        let component = reference.component();
        match self.providers_for(component) {
            [] => Ok(None),
            [provider] => {
                let container = self.container(component)?;
                inject(&container, provider, definition, traversal).map(Some)
            }
            _ => Err(ResolutionError::MultipleBindings { component }),
        }
    }

    fn resolve_group(
        &self,
        reference: &Reference,
        definition: &mut ContextDefinition,
        traversal: &mut Traversal,
    ) -> ResolutionResult<Option<NodeRef>> {
        let interface = reference.component();
        let container = self.container(interface)?;
        let providers = self.providers_for(interface);

        let mut members = Vec::new();
        let mut children = Vec::new();
        for candidate in self.find_candidates(interface) {
            let provider = match providers.iter().find(|provider| provider.result() == candidate) {
                Some(provider) => provider,
                None => {
                    debug!(%interface, %candidate, "candidate has no binding, skipping");
                    continue;
                }
            };

            let mut child = definition.clone();
            members.push(inject(&container, provider, &mut child, traversal)?);
            children.push(child);
        }

        if members.is_empty() {
            return Ok(None);
        }

        definition.collect(&children);
        let context = definition.create();
        Ok(Some(Svc::new(GroupNode::new(interface, members, context))))
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("interfaces", &self.inner.providers.keys().collect::<Vec<_>>())
            .field("domain", &self.inner.domain)
            .finish()
    }
}
