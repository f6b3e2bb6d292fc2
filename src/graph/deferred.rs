use crate::{
    ComponentContext, ComponentInfo, ContextDefinition, CycleError, DynSvc,
    Graph, Node, Outcome, Reference, ResolutionError, ResolutionResult, Svc,
    Traversal,
};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::{
    collections::HashSet,
    sync::Weak,
    thread::{self, ThreadId},
};
use tracing::debug;

/// Deferred resolutions currently running, by thread and interface.
pub(crate) type Deferrals = Svc<Mutex<HashSet<(ThreadId, ComponentInfo)>>>;

/// Everything needed to resolve a deferred reference later, on a fresh
/// path. The graph is held weakly, since placeholders end up in instances
/// cached by the graph itself.
pub(crate) struct DeferredResolution {
    graph: Weak<dyn Graph>,
    deferrals: Deferrals,
    definition: ContextDefinition,
    reference: Reference,
    resolved: OnceCell<DynSvc>,
}

impl DeferredResolution {
    pub fn new(
        graph: Weak<dyn Graph>,
        deferrals: Deferrals,
        definition: ContextDefinition,
        reference: Reference,
    ) -> Self {
        DeferredResolution {
            graph,
            deferrals,
            definition,
            reference,
            resolved: OnceCell::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Resolves and instantiates the reference.
    ///
    /// Successful results are kept. Failures are not, so a placeholder that
    /// was used too early can still succeed once the graph is fully wired.
    pub fn resolve(&self) -> ResolutionResult<DynSvc> {
        if let Some(instance) = self.resolved.get() {
            return Ok(instance.clone());
        }

        let component = self.reference.component();
        let graph = self
            .graph
            .upgrade()
            .ok_or(ResolutionError::ContainerDropped { component })?;
        let _in_flight = InFlight::enter(&self.deferrals, component)?;
        debug!(%component, "resolving deferred reference");

        let mut traversal = Traversal::with_deferrals(graph, self.deferrals.clone());
        let mut definition = self.definition.clone();
        let instance = match traversal.follow(&mut definition, &self.reference)? {
            Outcome::Resolved(node) => node.instance(&mut traversal)?,
            Outcome::Deferred(_) => {
                return Err(ResolutionError::CircularReference(
                    CycleError::new(component, vec![component, component]).unroll(),
                ))
            }
            Outcome::Absent => return Err(ResolutionError::Unresolvable { component }),
        };

        Ok(self.resolved.get_or_init(|| instance).clone())
    }
}

/// Marks a deferred resolution as running on the current thread until
/// dropped.
struct InFlight<'a> {
    deferrals: &'a Deferrals,
    key: (ThreadId, ComponentInfo),
}

impl<'a> InFlight<'a> {
    fn enter(deferrals: &'a Deferrals, component: ComponentInfo) -> ResolutionResult<Self> {
        let key = (thread::current().id(), component);
        if !deferrals.lock().insert(key) {
            return Err(ResolutionError::CircularReference(
                CycleError::new(component, vec![component, component]).unroll(),
            ));
        }

        Ok(InFlight { deferrals, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.deferrals.lock().remove(&self.key);
    }
}

/// A node yielding a forwarding placeholder for a cyclic reference.
pub(crate) struct DeferredNode {
    component: ComponentInfo,
    placeholder: DynSvc,
}

impl DeferredNode {
    pub fn new(component: ComponentInfo, placeholder: DynSvc) -> Self {
        DeferredNode {
            component,
            placeholder,
        }
    }
}

impl Node for DeferredNode {
    fn component(&self) -> ComponentInfo {
        self.component
    }

    fn context(&self) -> ComponentContext {
        ComponentContext::default()
    }

    fn instance(&self, _traversal: &mut Traversal) -> ResolutionResult<DynSvc> {
        Ok(self.placeholder.clone())
    }
}
