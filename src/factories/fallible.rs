use crate::{
    Component, ComponentFactory, ComponentInfo, DependencyInjector,
    Instantiation, ResolutionError, ResolutionResult, Svc,
};
use std::{error::Error, marker::PhantomData};

/// A component factory that may fail during creation with a custom error
/// type. On failure, [`ResolutionError::ActivationFailed`] is returned.
pub struct FallibleFactory<D, R, E, F>
where
    R: Component,
    E: Component + Error,
    F: ComponentFactory<D, Result = Result<R, E>>,
{
    inner: F,
    marker: PhantomData<fn(D) -> Result<R, E>>,
}

impl<D, R, E, F> ComponentFactory<D> for FallibleFactory<D, R, E, F>
where
    D: 'static,
    R: Component,
    E: Component + Error,
    F: ComponentFactory<D, Result = Result<R, E>>,
{
    type Result = R;
    type Dependencies = F::Dependencies;

    fn arity(&self) -> usize {
        self.inner.arity()
    }

    fn resolve(
        &self,
        injector: &mut DependencyInjector<'_>,
    ) -> ResolutionResult<Self::Dependencies> {
        self.inner.resolve(injector)
    }

    fn invoke(
        &self,
        dependencies: &Self::Dependencies,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<Self::Result> {
        match self.inner.invoke(dependencies, instantiation)? {
            Ok(result) => Ok(result),
            Err(error) => Err(ResolutionError::ActivationFailed {
                component: ComponentInfo::of::<R>(),
                inner: Svc::new(error),
            }),
        }
    }
}

/// Defines a conversion into a fallible component factory. This trait is
/// automatically implemented for all component factories that return a
/// [`Result<T, E>`] with an error type that implements [`Error`] and
/// [`Component`].
pub trait IntoFallible<D, R, E, F>
where
    R: Component,
    E: Component + Error,
    F: ComponentFactory<D, Result = Result<R, E>>,
{
    /// Marks a component factory as being able to fail. On failure, a
    /// resolution error is returned during activation. On success, the
    /// component is injected unwrapped from the result.
    ///
    /// ## Example
    ///
    /// ```
    /// use runtime_composition::{
    ///     Container, IntoFallible, IntoTransient, ResolutionError,
    ///     ResolutionResult, Svc,
    /// };
    /// use std::{
    ///     error::Error,
    ///     fmt::{Display, Formatter},
    /// };
    ///
    /// #[derive(Debug)]
    /// struct FooError;
    ///
    /// impl Error for FooError {}
    /// impl Display for FooError {
    ///     fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    ///         write!(f, "An error occurred while creating a Foo")
    ///     }
    /// }
    ///
    /// struct Foo;
    /// fn make_foo() -> Result<Foo, FooError> {
    ///     Err(FooError)
    /// }
    ///
    /// let mut builder = Container::builder();
    /// builder.provide(make_foo.fallible().transient());
    ///
    /// let container = builder.build();
    /// let foo: ResolutionResult<Svc<Foo>> = container.get();
    /// assert!(matches!(foo, Err(ResolutionError::ActivationFailed { .. })));
    /// ```
    #[must_use]
    fn fallible(self) -> FallibleFactory<D, R, E, F>;
}

impl<D, R, E, F> IntoFallible<D, R, E, F> for F
where
    R: Component,
    E: Component + Error,
    F: ComponentFactory<D, Result = Result<R, E>>,
{
    fn fallible(self) -> FallibleFactory<D, R, E, F> {
        FallibleFactory {
            inner: self,
            marker: PhantomData,
        }
    }
}
