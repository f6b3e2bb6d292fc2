use crate::{
    ComponentCache, Component, DependencyInjector, Descriptor, DynSvc,
    Instantiation, ResolutionResult, Sharing, Svc, TypedProvider,
};

/// A provider which returns a constant, predetermined value. Note that this
/// is technically a singleton provider, but one whose instance is created
/// before the container is built. Constants resolve straight to their value
/// and never go through the cache.
pub struct ConstantProvider<R: Component> {
    value: Svc<R>,
    descriptor: Descriptor,
    cache: ComponentCache,
}

impl<R: Component> ConstantProvider<R> {
    /// Creates a new [`ConstantProvider`] using a predetermined value.
    #[must_use]
    pub fn new(value: R) -> Self {
        ConstantProvider {
            value: Svc::new(value),
            descriptor: Descriptor::default(),
            cache: ComponentCache::new(Sharing::Stateless),
        }
    }
}

impl<R: Component> TypedProvider for ConstantProvider<R> {
    type Interface = R;
    type Result = R;

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn cache(&self) -> &ComponentCache {
        &self.cache
    }

    fn constant_typed(&self) -> Option<Svc<Self::Result>> {
        Some(self.value.clone())
    }

    fn prepare_typed(&self, _injector: &mut DependencyInjector<'_>) -> ResolutionResult<DynSvc> {
        Ok(Svc::new(()))
    }

    fn provide_typed(
        &self,
        _prepared: &DynSvc,
        _instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<Svc<Self::Result>> {
        Ok(self.value.clone())
    }
}

impl<R: Component> From<R> for ConstantProvider<R> {
    fn from(value: R) -> Self {
        ConstantProvider::new(value)
    }
}

/// Create a provider from a constant value. While the function itself is
/// unnecessary, it makes it more readable when registering constants.
///
/// ## Example
///
/// ```
/// use runtime_composition::{constant, Container, Svc};
///
/// let mut builder = Container::builder();
/// builder.provide(constant(8i32));
///
/// let container = builder.build();
/// let value: Svc<i32> = container.get().unwrap();
///
/// assert_eq!(8, *value);
/// ```
#[must_use]
pub fn constant<R: Component>(value: R) -> ConstantProvider<R> {
    ConstantProvider::new(value)
}
