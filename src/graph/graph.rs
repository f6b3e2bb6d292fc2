use crate::{
    erase, ComponentInfo, ContextDefinition, Deferred, DeferredResolution,
    DynSvc, Interface, NodeRef, ResolutionResult, Svc, Traversal,
    TypeArgument,
};
use std::fmt::{Debug, Formatter};

/// A source of component nodes.
///
/// The graph is asked for a node whenever a [`Traversal`] follows a
/// reference that is not already being resolved along the current path.
/// Implementations may follow further references through the traversal to
/// resolve dependencies.
pub trait Graph: Send + Sync {
    /// Resolves the single component bound to the reference.
    ///
    /// Returns `Ok(None)` if nothing is bound to it.
    fn resolve_component(
        &self,
        reference: &Reference,
        definition: &mut ContextDefinition,
        traversal: &mut Traversal,
    ) -> ResolutionResult<Option<NodeRef>>;

    /// Resolves every component that provides the reference's capability.
    ///
    /// Returns `Ok(None)` if nothing provides it.
    fn resolve_group(
        &self,
        reference: &Reference,
        definition: &mut ContextDefinition,
        traversal: &mut Traversal,
    ) -> ResolutionResult<Option<NodeRef>>;
}

/// Whether a reference asks for one component or all of them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ReferenceKind {
    /// Exactly one component.
    Component,

    /// Every component providing a capability.
    Group,
}

/// A request for a component through one of its interfaces.
#[derive(Clone)]
pub struct Reference {
    component: ComponentInfo,
    arguments: Vec<TypeArgument>,
    kind: ReferenceKind,
    defer: fn(Svc<DeferredResolution>) -> Option<DynSvc>,
}

impl Reference {
    /// Creates a reference to a single component through interface `I`.
    #[must_use]
    pub fn of<I: ?Sized + Interface>() -> Self {
        Reference {
            component: ComponentInfo::of::<I>(),
            arguments: Vec::new(),
            kind: ReferenceKind::Component,
            defer: defer_as::<I>,
        }
    }

    /// Turns this into a reference to every component providing the
    /// interface.
    #[must_use]
    pub fn into_group(mut self) -> Self {
        self.kind = ReferenceKind::Group;
        self
    }

    /// Sets the type arguments of this reference.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<TypeArgument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// The referenced interface.
    #[must_use]
    pub fn component(&self) -> ComponentInfo {
        self.component
    }

    /// The type arguments of this reference.
    #[must_use]
    pub fn arguments(&self) -> &[TypeArgument] {
        &self.arguments
    }

    /// Whether this reference asks for one component or all of them.
    #[must_use]
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Wraps a deferred resolution into a placeholder, if the interface
    /// supports forwarding. Groups never do.
    pub(crate) fn defer(&self, resolution: Svc<DeferredResolution>) -> Option<DynSvc> {
        match self.kind {
            ReferenceKind::Component => (self.defer)(resolution),
            ReferenceKind::Group => None,
        }
    }
}

impl Debug for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reference")
            .field("component", &self.component)
            .field("arguments", &self.arguments)
            .field("kind", &self.kind)
            .finish()
    }
}

fn defer_as<I>(resolution: Svc<DeferredResolution>) -> Option<DynSvc>
where
    I: ?Sized + Interface,
{
    I::defer(Deferred::new(resolution)).map(erase)
}
