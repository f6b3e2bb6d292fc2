use crate::{
    unerase, ComponentInfo, DeferredResolution, Interface, ResolutionResult,
    Svc,
};
use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
};

/// A lazily-resolving stand-in for a component that could not be created yet
/// because it is part of a dependency cycle.
///
/// Nothing is instantiated when the placeholder is created. The real
/// component is resolved the first time [`Deferred::get()`] (or a forwarded
/// interface method) is called, and every later call reuses it.
///
/// Forwarding implementations are generated by the [`interface!`] macro, so
/// this type is rarely named directly.
///
/// [`interface!`]: crate::interface
pub struct Deferred<I>
where
    I: ?Sized + Interface,
{
    resolution: Svc<DeferredResolution>,
    marker: PhantomData<fn() -> Svc<I>>,
}

impl<I> Deferred<I>
where
    I: ?Sized + Interface,
{
    pub(crate) fn new(resolution: Svc<DeferredResolution>) -> Self {
        Deferred {
            resolution,
            marker: PhantomData,
        }
    }

    /// Resolves the real component, creating it if needed.
    pub fn get(&self) -> ResolutionResult<Svc<I>> {
        let instance = self.resolution.resolve()?;
        unerase::<I>(&instance, ComponentInfo::of::<I>())
    }

    /// Returns `true` once the real component has been resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_resolved()
    }

    /// Resolves the real component for a forwarded method call.
    ///
    /// # Panics
    ///
    /// Panics if the component cannot be resolved. Forwarded methods have no
    /// way of reporting the failure to their caller, so the resolution error
    /// is raised at the first use of the placeholder instead.
    #[must_use]
    pub fn force(this: &Self) -> Svc<I> {
        match this.get() {
            Ok(instance) => instance,
            Err(error) => panic!(
                "deferred resolution of {} failed: {}",
                ComponentInfo::of::<I>(),
                error
            ),
        }
    }
}

impl<I> Debug for Deferred<I>
where
    I: ?Sized + Interface,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("interface", &ComponentInfo::of::<I>())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
