mod component;
mod deferred;
mod interface;

pub use component::*;
pub use deferred::*;
pub use interface::*;

/// Wraps a typed component pointer into a type-erased instance.
pub(crate) fn erase<I>(component: Svc<I>) -> DynSvc
where
    I: ?Sized + Component,
{
    Svc::new(component)
}

/// Recovers a typed component pointer from a type-erased instance.
pub(crate) fn unerase<I>(
    instance: &DynSvc,
    component: ComponentInfo,
) -> ResolutionResult<Svc<I>>
where
    I: ?Sized + Component,
{
    instance
        .downcast_ref::<Svc<I>>()
        .cloned()
        .ok_or(ResolutionError::InvalidInstance { component })
}
