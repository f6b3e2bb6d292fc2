use crate::{
    erase, Acceptance, Attribute, Component, ComponentCache, ComponentInfo,
    DependencyInjector, DynSvc, Instantiation, InterfaceFor, Qualifier,
    ResolutionResult, Svc,
};

/// What a binding declares about its component's context.
#[derive(Clone, Debug, Default)]
pub struct Descriptor {
    acceptance: Acceptance,
    qualifiers: Vec<Attribute>,
}

impl Descriptor {
    /// The attribute kinds the component accepts.
    #[must_use]
    pub fn acceptance(&self) -> &Acceptance {
        &self.acceptance
    }

    /// The qualifiers added to the component's context.
    #[must_use]
    pub fn qualifiers(&self) -> &[Attribute] {
        &self.qualifiers
    }

    /// Accepts qualifiers of type `Q`.
    pub fn accept<Q: Qualifier>(&mut self) {
        self.acceptance = std::mem::take(&mut self.acceptance).accept::<Q>();
    }

    /// Accepts the reference the component is requested through.
    pub fn accept_reference(&mut self) {
        self.acceptance = std::mem::take(&mut self.acceptance).typed();
    }

    /// Adds a qualifier to the component's context.
    pub fn qualify(&mut self, qualifier: Attribute) {
        self.qualifiers.push(qualifier);
    }
}

/// Weakly typed component provider.
///
/// A provider binds a component to an interface. It resolves the
/// component's dependencies while the graph is being resolved, and creates
/// instances through its own [`ComponentCache`]. This is automatically
/// implemented for all types that implement [`TypedProvider`], and
/// [`TypedProvider`] should be preferred for custom providers.
pub trait Provider: Component {
    /// The interface this provider is bound to.
    fn interface(&self) -> ComponentInfo;

    /// The [`ComponentInfo`] which describes the type returned by this
    /// provider.
    fn result(&self) -> ComponentInfo;

    /// What the component declares about its context.
    fn descriptor(&self) -> &Descriptor;

    /// The cache instances are created through.
    fn cache(&self) -> &ComponentCache;

    /// The instance of the component as its interface, if it exists before
    /// anything is resolved. Such components are neither prepared nor
    /// cached.
    fn constant(&self) -> Option<DynSvc>;

    /// Resolves the dependencies of the component.
    fn prepare(&self, injector: &mut DependencyInjector<'_>) -> ResolutionResult<DynSvc>;

    /// Creates an instance of the component as its interface.
    fn instantiate(
        &self,
        prepared: &DynSvc,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<DynSvc>;
}

impl<T> Provider for T
where
    T: TypedProvider,
{
    fn interface(&self) -> ComponentInfo {
        ComponentInfo::of::<T::Interface>()
    }

    fn result(&self) -> ComponentInfo {
        ComponentInfo::of::<T::Result>()
    }

    fn descriptor(&self) -> &Descriptor {
        TypedProvider::descriptor(self)
    }

    fn cache(&self) -> &ComponentCache {
        TypedProvider::cache(self)
    }

    fn constant(&self) -> Option<DynSvc> {
        self.constant_typed()
            .map(|component| erase(T::Interface::from_svc(component)))
    }

    fn prepare(&self, injector: &mut DependencyInjector<'_>) -> ResolutionResult<DynSvc> {
        self.prepare_typed(injector)
    }

    fn instantiate(
        &self,
        prepared: &DynSvc,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<DynSvc> {
        let component = self.provide_typed(prepared, instantiation)?;
        Ok(erase(T::Interface::from_svc(component)))
    }
}

/// A strongly-typed component provider.
///
/// Types which implement this trait can provide strongly-typed instances of
/// a particular component type. [`Provider`] is automatically implemented
/// for all types which implement [`TypedProvider`].
///
/// ## Example
///
/// ```
/// use runtime_composition::{
///     ComponentCache, Container, DependencyInjector, Descriptor, DynSvc,
///     Instantiation, ResolutionResult, Sharing, Svc, TypedProvider,
/// };
///
/// struct Foo;
///
/// struct FooProvider {
///     descriptor: Descriptor,
///     cache: ComponentCache,
/// }
///
/// impl TypedProvider for FooProvider {
///     type Interface = Foo;
///     type Result = Foo;
///
///     fn descriptor(&self) -> &Descriptor {
///         &self.descriptor
///     }
///
///     fn cache(&self) -> &ComponentCache {
///         &self.cache
///     }
///
///     fn prepare_typed(
///         &self,
///         _injector: &mut DependencyInjector<'_>,
///     ) -> ResolutionResult<DynSvc> {
///         Ok(Svc::new(()))
///     }
///
///     fn provide_typed(
///         &self,
///         _prepared: &DynSvc,
///         _instantiation: &mut Instantiation<'_>,
///     ) -> ResolutionResult<Svc<Self::Result>> {
///         Ok(Svc::new(Foo))
///     }
/// }
///
/// let mut builder = Container::builder();
/// builder.provide(FooProvider {
///     descriptor: Descriptor::default(),
///     cache: ComponentCache::new(Sharing::Stateless),
/// });
///
/// let container = builder.build();
/// let _foo: Svc<Foo> = container.get().unwrap();
/// ```
pub trait TypedProvider: Sized + Component {
    /// The interface this provider is bound to.
    type Interface: ?Sized + InterfaceFor<Self::Result>;

    /// The type of component this can provide.
    type Result: Component;

    /// What the component declares about its context.
    fn descriptor(&self) -> &Descriptor;

    /// The cache instances are created through.
    fn cache(&self) -> &ComponentCache;

    /// The instance of the component, if it exists before anything is
    /// resolved.
    fn constant_typed(&self) -> Option<Svc<Self::Result>> {
        None
    }

    /// Resolves the dependencies of the component. The result is handed back
    /// to [`provide_typed`](TypedProvider::provide_typed).
    fn prepare_typed(&self, injector: &mut DependencyInjector<'_>) -> ResolutionResult<DynSvc>;

    /// Creates an instance of the component from its prepared dependencies.
    fn provide_typed(
        &self,
        prepared: &DynSvc,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<Svc<Self::Result>>;
}
