use crate::{
    ComponentContext, ComponentInfo, DynSvc, ResolutionResult, Svc, Traversal,
};

/// A resolved node of the component graph.
///
/// Nodes are produced while following references, and instantiated once the
/// whole graph below them has been resolved.
pub trait Node: Send + Sync {
    /// The component this node produces.
    fn component(&self) -> ComponentInfo;

    /// The context this node is cached under.
    fn context(&self) -> ComponentContext;

    /// Gets or creates the instance of this node.
    fn instance(&self, traversal: &mut Traversal) -> ResolutionResult<DynSvc>;
}

/// A shared pointer to a node.
pub type NodeRef = Svc<dyn Node>;

/// The result of following a reference.
#[derive(Clone)]
pub enum Outcome {
    /// The reference resolved to a node.
    Resolved(NodeRef),

    /// The reference closes a cycle and resolved to a forwarding
    /// placeholder.
    Deferred(NodeRef),

    /// Nothing is bound to the reference.
    Absent,
}

impl Outcome {
    /// The resolved or deferred node, if any.
    #[must_use]
    pub fn node(self) -> Option<NodeRef> {
        match self {
            Outcome::Resolved(node) | Outcome::Deferred(node) => Some(node),
            Outcome::Absent => None,
        }
    }

    /// Whether the reference was deferred.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Outcome::Deferred(_))
    }
}

/// A node holding an existing instance.
pub struct ConstantNode {
    component: ComponentInfo,
    instance: DynSvc,
    context: ComponentContext,
}

impl ConstantNode {
    /// Creates a node that always yields `instance`.
    #[must_use]
    pub fn new(component: ComponentInfo, instance: DynSvc, context: ComponentContext) -> Self {
        ConstantNode {
            component,
            instance,
            context,
        }
    }
}

impl Node for ConstantNode {
    fn component(&self) -> ComponentInfo {
        self.component
    }

    fn context(&self) -> ComponentContext {
        self.context.clone()
    }

    fn instance(&self, _traversal: &mut Traversal) -> ResolutionResult<DynSvc> {
        Ok(self.instance.clone())
    }
}

/// A node collecting the nodes of every component providing a capability.
///
/// Its instance is a `Vec<DynSvc>` with one instance per member, in
/// discovery order.
pub struct GroupNode {
    component: ComponentInfo,
    members: Vec<NodeRef>,
    context: ComponentContext,
}

impl GroupNode {
    /// Creates a group of the given members.
    #[must_use]
    pub fn new(component: ComponentInfo, members: Vec<NodeRef>, context: ComponentContext) -> Self {
        GroupNode {
            component,
            members,
            context,
        }
    }
}

impl Node for GroupNode {
    fn component(&self) -> ComponentInfo {
        self.component
    }

    fn context(&self) -> ComponentContext {
        self.context.clone()
    }

    fn instance(&self, traversal: &mut Traversal) -> ResolutionResult<DynSvc> {
        let instances = self
            .members
            .iter()
            .map(|member| member.instance(traversal))
            .collect::<ResolutionResult<Vec<DynSvc>>>()?;
        Ok(Svc::new(instances))
    }
}
