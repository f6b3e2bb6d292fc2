use crate::{
    Attribute, ComponentInfo, Container, ContextDefinition, Discovery, Domain,
    Module, Provider, Qualifier, Svc,
};
use indexmap::IndexMap;

/// Providers bound to each interface, in registration order.
pub(crate) type ProviderMap = IndexMap<ComponentInfo, Vec<Svc<dyn Provider>>>;

/// A builder for a [`Container`].
#[derive(Default)]
pub struct ContainerBuilder {
    providers: ProviderMap,
    root: ContextDefinition,
    domain: Option<Domain>,
    discovery: Option<Svc<dyn Discovery>>,
}

impl ContainerBuilder {
    /// Binds a provider to its interface. Multiple providers can be bound to
    /// the same interface, in which case the interface can only be requested
    /// as a group.
    pub fn provide<P: Provider>(&mut self, provider: P) {
        self.add_provider(Svc::new(provider));
    }

    /// Adds a provider to the container.
    pub fn add_provider(&mut self, provider: Svc<dyn Provider>) {
        self.providers
            .entry(provider.interface())
            .or_default()
            .push(provider);
    }

    /// Removes all providers bound to an interface.
    pub fn remove_providers(
        &mut self,
        interface: ComponentInfo,
    ) -> Option<Vec<Svc<dyn Provider>>> {
        self.providers.shift_remove(&interface)
    }

    /// Adds all the providers registered in a module. This may cause
    /// multiple providers to be bound to the same interface.
    ///
    /// Providers are shared with the module, so containers built from the
    /// same module share their providers' caches. Use different
    /// [`Domain`]s to keep their instances apart.
    pub fn add_module(&mut self, module: &Module) {
        for provider in module.providers() {
            self.add_provider(provider.clone());
        }
    }

    /// Sets the domain instances of the container are cached under.
    pub fn domain(&mut self, domain: Domain) {
        self.domain = Some(domain);
    }

    /// Sets the discovery used to find the members of groups.
    pub fn discovery(&mut self, discovery: impl Discovery) {
        self.discovery = Some(Svc::new(discovery));
    }

    /// Adds a qualifier to the root definition every request starts from.
    pub fn root_qualifier<Q: Qualifier>(&mut self, qualifier: Q) {
        self.root.expand([Attribute::new(qualifier)]);
    }

    /// Borrows the root [`ContextDefinition`] that will be used by calls to
    /// [`Container::get()`].
    #[must_use]
    pub fn root_definition(&self) -> &ContextDefinition {
        &self.root
    }

    /// Mutably borrows the root [`ContextDefinition`] that will be used by
    /// calls to [`Container::get()`].
    #[must_use]
    pub fn root_definition_mut(&mut self) -> &mut ContextDefinition {
        &mut self.root
    }

    /// Builds the container.
    #[must_use]
    pub fn build(self) -> Container {
        Container::new_from_parts(self.providers, self.root, self.domain, self.discovery)
    }
}
