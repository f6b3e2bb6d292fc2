use crate::{
    Attribute, Component, ComponentCache, ComponentFactory, ComponentInfo,
    DependencyInjector, Descriptor, DynSvc, Instantiation, Qualifier,
    ResolutionError, ResolutionResult, Sharing, Svc, TypedProvider,
};
use std::marker::PhantomData;

/// A provider that creates its component with a [`ComponentFactory`].
///
/// Singleton providers share one instance per domain and context. Transient
/// providers create a new instance for every dependency site.
pub struct ComponentProvider<D, R, F>
where
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    factory: F,
    descriptor: Descriptor,
    cache: ComponentCache,
    marker: PhantomData<fn(D) -> R>,
}

impl<D, R, F> ComponentProvider<D, R, F>
where
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    /// Creates a new [`ComponentProvider`] using a component factory.
    #[must_use]
    pub fn new(factory: F, sharing: Sharing) -> Self {
        ComponentProvider {
            factory,
            descriptor: Descriptor::default(),
            cache: ComponentCache::new(sharing),
            marker: PhantomData,
        }
    }

    /// Makes qualifiers of type `Q` visible to the component. The component
    /// is cached separately for every distinct set of them.
    #[must_use]
    pub fn accepts<Q: Qualifier>(mut self) -> Self {
        self.descriptor.accept::<Q>();
        self
    }

    /// Makes the reference the component is requested through visible to
    /// the component.
    #[must_use]
    pub fn typed(mut self) -> Self {
        self.descriptor.accept_reference();
        self
    }

    /// Adds a qualifier to the context the component and its dependencies
    /// are resolved in.
    #[must_use]
    pub fn qualified<Q: Qualifier>(mut self, qualifier: Q) -> Self {
        self.descriptor.qualify(Attribute::new(qualifier));
        self
    }
}

impl<D, R, F> TypedProvider for ComponentProvider<D, R, F>
where
    D: 'static,
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    type Interface = R;
    type Result = R;

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn cache(&self) -> &ComponentCache {
        &self.cache
    }

    fn prepare_typed(&self, injector: &mut DependencyInjector<'_>) -> ResolutionResult<DynSvc> {
        Ok(Svc::new(self.factory.resolve(injector)?))
    }

    fn provide_typed(
        &self,
        prepared: &DynSvc,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<Svc<Self::Result>> {
        let dependencies = prepared
            .downcast_ref::<F::Dependencies>()
            .ok_or(ResolutionError::InvalidInstance {
                component: ComponentInfo::of::<R>(),
            })?;
        let component = self.factory.invoke(dependencies, instantiation)?;
        Ok(Svc::new(component))
    }
}

/// Defines a conversion into a singleton provider. This trait is
/// automatically implemented for all component factories.
pub trait IntoSingleton<D, R, F>
where
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    /// Creates a singleton provider. Singleton providers create their values
    /// only once per domain and context, when first requested, and reuse
    /// that value for each future request.
    ///
    /// ## Example
    ///
    /// ```
    /// use runtime_composition::{Container, IntoSingleton, Svc};
    ///
    /// #[derive(Default)]
    /// struct Foo;
    ///
    /// let mut builder = Container::builder();
    /// builder.provide(Foo::default.singleton());
    ///
    /// let container = builder.build();
    /// let foo1: Svc<Foo> = container.get().unwrap();
    /// let foo2: Svc<Foo> = container.get().unwrap();
    ///
    /// assert!(Svc::ptr_eq(&foo1, &foo2));
    /// ```
    #[must_use]
    fn singleton(self) -> ComponentProvider<D, R, F>;
}

impl<D, R, F> IntoSingleton<D, R, F> for F
where
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    fn singleton(self) -> ComponentProvider<D, R, F> {
        ComponentProvider::new(self, Sharing::Stateless)
    }
}

/// Defines a conversion into a transient provider. This trait is
/// automatically implemented for all component factories.
pub trait IntoTransient<D, R, F>
where
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    /// Creates a transient provider. Transient providers create a new
    /// instance for every dependency site that requests them.
    ///
    /// ## Example
    ///
    /// ```
    /// use runtime_composition::{Container, IntoTransient, Svc};
    ///
    /// #[derive(Default)]
    /// struct Foo;
    ///
    /// let mut builder = Container::builder();
    /// builder.provide(Foo::default.transient());
    ///
    /// let container = builder.build();
    /// let foo1: Svc<Foo> = container.get().unwrap();
    /// let foo2: Svc<Foo> = container.get().unwrap();
    ///
    /// assert!(!Svc::ptr_eq(&foo1, &foo2));
    /// ```
    #[must_use]
    fn transient(self) -> ComponentProvider<D, R, F>;
}

impl<D, R, F> IntoTransient<D, R, F> for F
where
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    fn transient(self) -> ComponentProvider<D, R, F> {
        ComponentProvider::new(self, Sharing::Stateful)
    }
}
