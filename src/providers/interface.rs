use crate::{
    ComponentCache, DependencyInjector, Descriptor, DynSvc, Instantiation,
    InterfaceFor, ResolutionResult, Svc, TypedProvider,
};
use std::marker::PhantomData;

/// Provides a component as an implementation of an interface. See
/// [`WithInterface::with_interface()`] for more information.
pub struct InterfaceProvider<I, P>
where
    P: TypedProvider,
    I: ?Sized + InterfaceFor<P::Result>,
{
    inner: P,
    marker: PhantomData<fn(P::Result) -> Box<I>>,
}

impl<I, P> TypedProvider for InterfaceProvider<I, P>
where
    P: TypedProvider,
    I: ?Sized + InterfaceFor<P::Result>,
{
    type Interface = I;
    type Result = P::Result;

    fn descriptor(&self) -> &Descriptor {
        self.inner.descriptor()
    }

    fn cache(&self) -> &ComponentCache {
        self.inner.cache()
    }

    fn constant_typed(&self) -> Option<Svc<Self::Result>> {
        self.inner.constant_typed()
    }

    fn prepare_typed(&self, injector: &mut DependencyInjector<'_>) -> ResolutionResult<DynSvc> {
        self.inner.prepare_typed(injector)
    }

    fn provide_typed(
        &self,
        prepared: &DynSvc,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<Svc<Self::Result>> {
        self.inner.provide_typed(prepared, instantiation)
    }
}

/// Defines a conversion into an interface provider. This trait is
/// automatically implemented for all types that implement [`TypedProvider`].
pub trait WithInterface: TypedProvider {
    /// Provides this component as an implementation of a particular
    /// interface. Rather than requesting this component with its concrete
    /// type, it is instead requested by its interface type, and it can no
    /// longer be requested through its concrete type.
    ///
    /// ## Example
    ///
    /// ```
    /// use runtime_composition::{
    ///     interface, Component, Container, IntoSingleton, Svc, WithInterface,
    /// };
    ///
    /// trait Fooable: Component {
    ///     fn bar(&self) -> i32;
    /// }
    ///
    /// interface! {
    ///     dyn Fooable {
    ///         fn bar(&self) -> i32;
    ///     }
    /// }
    ///
    /// #[derive(Default)]
    /// struct Foo;
    /// impl Fooable for Foo {
    ///     fn bar(&self) -> i32 {
    ///         4
    ///     }
    /// }
    ///
    /// let mut builder = Container::builder();
    /// builder.provide(Foo::default.singleton().with_interface::<dyn Fooable>());
    ///
    /// let container = builder.build();
    /// let fooable: Svc<dyn Fooable> = container.get().unwrap();
    /// assert_eq!(4, fooable.bar());
    ///
    /// assert!(container.get::<Svc<Foo>>().is_err());
    /// ```
    fn with_interface<I: ?Sized + InterfaceFor<Self::Result>>(
        self,
    ) -> InterfaceProvider<I, Self>;
}

impl<P> WithInterface for P
where
    P: TypedProvider,
{
    fn with_interface<I: ?Sized + InterfaceFor<Self::Result>>(
        self,
    ) -> InterfaceProvider<I, Self> {
        InterfaceProvider {
            inner: self,
            marker: PhantomData,
        }
    }
}
