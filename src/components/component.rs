use crate::CycleError;
use derive_more::Display;
use downcast_rs::impl_downcast;
use std::{
    any::{Any, TypeId},
    error::Error,
    fmt::{Display as FmtDisplay, Formatter},
};

/// A reference-counted pointer holding a component instance. Components are
/// shared between threads, so this is always [`Arc<T>`](std::sync::Arc).
pub type Svc<T> = std::sync::Arc<T>;

/// A component pointer holding an instance of `dyn Component`.
pub type DynSvc = Svc<dyn Component>;

/// Implemented automatically on types that are capable of being a component.
pub trait Component: downcast_rs::DowncastSync {}
impl<T: ?Sized + downcast_rs::DowncastSync> Component for T {}

impl_downcast!(sync Component);

/// A result from attempting to resolve or instantiate a component.
pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Type information about a component or capability interface.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Display)]
#[display(fmt = "{}", name)]
pub struct ComponentInfo {
    id: TypeId,
    name: &'static str,
}

impl ComponentInfo {
    /// Creates a [`ComponentInfo`] for the given type.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        ComponentInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Gets the [`TypeId`] for this component.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Gets the type name of this component.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Names of the constructors that were considered when constructor selection
/// failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidates(pub Vec<&'static str>);

impl FmtDisplay for Candidates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// An error that has occurred while resolving or instantiating a component.
///
/// Errors are cheap to clone so the same failure can be handed to every
/// caller waiting on a cached instantiation.
#[derive(Clone, Debug, Display)]
#[non_exhaustive]
pub enum ResolutionError {
    /// No binding exists for the requested component.
    #[display(fmt = "{} has no binding", component)]
    Unresolvable {
        /// The component that was requested.
        component: ComponentInfo,
    },

    /// A required dependency of a component has no binding.
    #[display(fmt = "{} has no binding (required by {})", dependency, component)]
    MissingDependency {
        /// The component being resolved.
        component: ComponentInfo,

        /// The dependency that could not be resolved.
        dependency: ComponentInfo,
    },

    /// More than one binding exists where exactly one was expected.
    #[display(
        fmt = "{} has multiple bindings (did you mean to request a Vec<Svc<T>> instead?)",
        component
    )]
    MultipleBindings {
        /// The component that was requested.
        component: ComponentInfo,
    },

    /// No single constructor could be chosen for a component.
    #[display(
        fmt = "unable to choose a constructor for {} among {}",
        component,
        candidates
    )]
    AmbiguousConstructor {
        /// The component being constructed.
        component: ComponentInfo,

        /// The constructors that were considered.
        candidates: Candidates,
    },

    /// A dependency cycle could not be broken.
    #[display(fmt = "{}", _0)]
    CircularReference(CycleError),

    /// A cache factory completed without producing an instance.
    #[display(fmt = "{} created no instance of {}", source, component)]
    NullInstance {
        /// The component that was being instantiated.
        component: ComponentInfo,

        /// The site that requested the instantiation.
        source: String,
    },

    /// A component was requested again while its own instance was still
    /// being created on the same thread.
    #[display(fmt = "{} was requested while it was being created", component)]
    ReentrantInstantiation {
        /// The component being created.
        component: ComponentInfo,
    },

    /// A guarded capability was accessed before it was enabled.
    #[display(
        fmt = "{} cannot be accessed before the component graph is fully wired",
        capability
    )]
    AccessDenied {
        /// The capability that was accessed.
        capability: ComponentInfo,
    },

    /// A type variable of a reference could not be bound to a concrete type.
    #[display(
        fmt = "type variable #{} of {} cannot be resolved",
        index,
        component
    )]
    UnresolvedTypeVariable {
        /// The referenced component.
        component: ComponentInfo,

        /// Index of the unresolved variable in the enclosing reference.
        index: usize,
    },

    /// A node produced an instance of an unexpected type.
    #[display(fmt = "the instance provided for {} has the wrong type", component)]
    InvalidInstance {
        /// The component that was requested.
        component: ComponentInfo,
    },

    /// A placeholder was used after the container it came from was dropped.
    #[display(fmt = "{} was deferred by a container that has been dropped", component)]
    ContainerDropped {
        /// The component behind the placeholder.
        component: ComponentInfo,
    },

    /// The factory of a component returned an error.
    #[display(fmt = "an error occurred during activation of {}", component)]
    ActivationFailed {
        /// The component that was being created.
        component: ComponentInfo,

        /// The error returned by the factory.
        inner: Svc<dyn Error + Send + Sync>,
    },
}

impl Error for ResolutionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ResolutionError::ActivationFailed { inner, .. } => {
                Some(inner.as_ref())
            }
            _ => None,
        }
    }
}
