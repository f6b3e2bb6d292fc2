use crate::{
    ComponentContext, ComponentInfo, ContextDefinition, CycleError,
    DeferredNode, DeferredResolution, Deferrals, DynSvc, Graph, Node,
    NodeRef, Outcome, Path, PathElement, Reference, ReferenceKind,
    ResolutionError, ResolutionResult, Svc,
};
use tracing::{debug, trace};

/// Walks the component graph for a single top-level request.
///
/// A traversal keeps track of the path of references currently being
/// followed. A reference that repeats a component already on the path
/// closes a cycle. Cycles through forwardable interfaces are broken with a
/// deferred placeholder, every other cycle is reported as an error.
///
/// Traversals are not shared between threads. Each top-level request and
/// each deferred resolution starts its own.
pub struct Traversal {
    graph: Svc<dyn Graph>,
    path: Path,
    deferrals: Deferrals,
}

impl Traversal {
    /// Starts a traversal of the given graph.
    #[must_use]
    pub fn new(graph: Svc<dyn Graph>) -> Self {
        Traversal::with_deferrals(graph, Deferrals::default())
    }

    pub(crate) fn with_deferrals(graph: Svc<dyn Graph>, deferrals: Deferrals) -> Self {
        Traversal {
            graph,
            path: Path::default(),
            deferrals,
        }
    }

    /// The number of references currently being followed.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// The interfaces currently being followed, outermost first.
    #[must_use]
    pub fn path(&self) -> Vec<ComponentInfo> {
        self.path.keys()
    }

    /// Follows a reference to its node.
    ///
    /// The path is the same after this returns as it was before, whether or
    /// not resolution succeeded.
    pub fn follow(
        &mut self,
        definition: &mut ContextDefinition,
        reference: &Reference,
    ) -> ResolutionResult<Outcome> {
        let element = Svc::new(PathElement::new(reference.component()));
        let descent = self.path.descend(element.clone());
        let outcome = match descent.repeating {
            Some(previous) => self.repeat(&previous, definition, reference),
            None => self.resolve(&element, definition, reference),
        };
        self.path.ascend();

        outcome
    }

    fn repeat(
        &mut self,
        previous: &Svc<PathElement>,
        definition: &mut ContextDefinition,
        reference: &Reference,
    ) -> ResolutionResult<Outcome> {
        if let Some(node) = previous.node() {
            trace!(
                component = %reference.component(),
                implementation = ?previous.implementation(),
                "reusing node from the current path"
            );
            return Ok(Outcome::Resolved(Svc::new(PathNode {
                element: previous.clone(),
                inner: node,
            })));
        }

        let cycle = CycleError::new(reference.component(), self.path.keys());
        match self.defer(definition, reference) {
            Some(outcome) => Ok(outcome),
            None => Err(ResolutionError::CircularReference(cycle)),
        }
    }

    fn resolve(
        &mut self,
        element: &Svc<PathElement>,
        definition: &mut ContextDefinition,
        reference: &Reference,
    ) -> ResolutionResult<Outcome> {
        let graph = self.graph.clone();
        let resolved = match reference.kind() {
            ReferenceKind::Component => graph.resolve_component(reference, definition, self),
            ReferenceKind::Group => graph.resolve_group(reference, definition, self),
        };

        match resolved {
            Ok(Some(node)) => {
                element.resolve(node.clone());
                Ok(Outcome::Resolved(Svc::new(PathNode {
                    element: element.clone(),
                    inner: node,
                })))
            }
            Ok(None) => Ok(Outcome::Absent),
            Err(ResolutionError::CircularReference(cycle))
                if cycle.is_live_at(reference.component()) =>
            {
                let cycle = cycle.unroll();
                match self.defer(definition, reference) {
                    Some(outcome) => Ok(outcome),
                    None => Err(ResolutionError::CircularReference(cycle)),
                }
            }
            Err(error) => Err(error),
        }
    }

    fn defer(
        &self,
        definition: &ContextDefinition,
        reference: &Reference,
    ) -> Option<Outcome> {
        let resolution = Svc::new(DeferredResolution::new(
            Svc::downgrade(&self.graph),
            self.deferrals.clone(),
            definition.clone(),
            reference.clone(),
        ));
        let placeholder = reference.defer(resolution)?;

        debug!(
            component = %reference.component(),
            path = ?self.path.keys(),
            "breaking circular reference with a deferred placeholder"
        );
        Some(Outcome::Deferred(Svc::new(DeferredNode::new(
            reference.component(),
            placeholder,
        ))))
    }

    /// Instantiates a node that was resolved at `element`, with the element
    /// back on the path while its dependencies are instantiated.
    fn instantiate(
        &mut self,
        element: &Svc<PathElement>,
        node: &NodeRef,
    ) -> ResolutionResult<DynSvc> {
        if let Some(instance) = element.instance() {
            return Ok(instance);
        }

        let descent = self.path.descend(element.clone());
        let instance = node.instance(self);
        self.path.ascend();

        let instance = instance?;
        if descent.repeating.is_some() && !descent.tip {
            element.short_circuit(instance.clone());
        }

        Ok(instance)
    }
}

/// A node resolved while its element was on the path.
struct PathNode {
    element: Svc<PathElement>,
    inner: NodeRef,
}

impl Node for PathNode {
    fn component(&self) -> ComponentInfo {
        self.inner.component()
    }

    fn context(&self) -> ComponentContext {
        self.inner.context()
    }

    fn instance(&self, traversal: &mut Traversal) -> ResolutionResult<DynSvc> {
        traversal.instantiate(&self.element, &self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Component, ConstantNode};
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// A graph of fixed instances.
    #[derive(Default)]
    struct FixedGraph {
        instances: HashMap<ComponentInfo, DynSvc>,
    }

    impl Graph for FixedGraph {
        fn resolve_component(
            &self,
            reference: &Reference,
            _definition: &mut ContextDefinition,
            _traversal: &mut Traversal,
        ) -> ResolutionResult<Option<NodeRef>> {
            Ok(self.instances.get(&reference.component()).map(|instance| {
                let node: NodeRef = Svc::new(ConstantNode::new(
                    reference.component(),
                    instance.clone(),
                    ComponentContext::default(),
                ));
                node
            }))
        }

        fn resolve_group(
            &self,
            _reference: &Reference,
            _definition: &mut ContextDefinition,
            _traversal: &mut Traversal,
        ) -> ResolutionResult<Option<NodeRef>> {
            Ok(None)
        }
    }

    #[test]
    fn follow_resolves_bound_components() {
        let instance: DynSvc = Svc::new(7u32);
        let mut graph = FixedGraph::default();
        graph
            .instances
            .insert(ComponentInfo::of::<u32>(), instance.clone());

        let mut traversal = Traversal::new(Svc::new(graph));
        let mut definition = ContextDefinition::new();
        let node = traversal
            .follow(&mut definition, &Reference::of::<u32>())
            .unwrap()
            .node()
            .unwrap();

        assert_eq!(ComponentInfo::of::<u32>(), node.component());
        assert!(Svc::ptr_eq(&instance, &node.instance(&mut traversal).unwrap()));
        assert_eq!(0, traversal.depth());
    }

    #[test]
    fn follow_reports_absent_components() {
        let mut traversal = Traversal::new(Svc::new(FixedGraph::default()));
        let mut definition = ContextDefinition::new();
        let outcome = traversal
            .follow(&mut definition, &Reference::of::<u32>())
            .unwrap();

        assert!(matches!(outcome, Outcome::Absent));
        let outcome = traversal
            .follow(&mut definition, &Reference::of::<u32>().into_group())
            .unwrap();
        assert!(matches!(outcome, Outcome::Absent));
    }

    /// A node that follows more references the first time it is
    /// instantiated.
    struct FollowingNode {
        component: ComponentInfo,
        follows: Vec<Reference>,
        instance: DynSvc,
        calls: AtomicUsize,
    }

    impl FollowingNode {
        fn new<T: Component>(value: T, follows: Vec<Reference>) -> Svc<Self> {
            Svc::new(FollowingNode {
                component: ComponentInfo::of::<T>(),
                follows,
                instance: Svc::new(value),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Node for FollowingNode {
        fn component(&self) -> ComponentInfo {
            self.component
        }

        fn context(&self) -> ComponentContext {
            ComponentContext::default()
        }

        fn instance(&self, traversal: &mut Traversal) -> ResolutionResult<DynSvc> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                for reference in &self.follows {
                    let node = traversal
                        .follow(&mut ContextDefinition::new(), reference)?
                        .node()
                        .ok_or(ResolutionError::Unresolvable {
                            component: reference.component(),
                        })?;
                    node.instance(traversal)?;
                }
            }

            Ok(self.instance.clone())
        }
    }

    #[derive(Default)]
    struct NodeGraph {
        nodes: HashMap<ComponentInfo, NodeRef>,
    }

    impl Graph for NodeGraph {
        fn resolve_component(
            &self,
            reference: &Reference,
            _definition: &mut ContextDefinition,
            _traversal: &mut Traversal,
        ) -> ResolutionResult<Option<NodeRef>> {
            Ok(self.nodes.get(&reference.component()).cloned())
        }

        fn resolve_group(
            &self,
            _reference: &Reference,
            _definition: &mut ContextDefinition,
            _traversal: &mut Traversal,
        ) -> ResolutionResult<Option<NodeRef>> {
            Ok(None)
        }
    }

    /// A reference back to a component whose node is already resolved
    /// reuses that node, and its instance is kept for later references on
    /// the same path.
    #[test]
    fn repeated_resolved_reference_reuses_node() {
        let outer = FollowingNode::new(1u8, vec![Reference::of::<u16>()]);
        let inner = FollowingNode::new(
            2u16,
            vec![Reference::of::<u8>(), Reference::of::<u8>()],
        );

        let mut graph = NodeGraph::default();
        graph.nodes.insert(ComponentInfo::of::<u8>(), outer.clone());
        graph.nodes.insert(ComponentInfo::of::<u16>(), inner.clone());

        let mut traversal = Traversal::new(Svc::new(graph));
        let node = traversal
            .follow(&mut ContextDefinition::new(), &Reference::of::<u8>())
            .unwrap()
            .node()
            .unwrap();
        let instance = node.instance(&mut traversal).unwrap();

        assert_eq!(Some(&1u8), instance.downcast_ref::<u8>());
        assert_eq!(2, outer.calls.load(Ordering::SeqCst));
        assert_eq!(1, inner.calls.load(Ordering::SeqCst));
        assert_eq!(0, traversal.depth());
    }
}
