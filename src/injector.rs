use crate::{
    AccessGuard, Attribute, ComponentContext, ComponentInfo, ConstantNode,
    Container, ContextDefinition, DynSvc, Node, NodeRef, Outcome, Provider, Reference,
    Request, ResolutionError, ResolutionResult, Resolved, Svc, Traversal,
    TypeArgument,
};
use tracing::{debug, trace};

/// Resolves the dependencies of one component.
///
/// An injector is handed to a [`ComponentFactory`] while its component is
/// being resolved. Every dependency gets its own copy of the component's
/// context definition, so siblings never see each other's narrowing. Once
/// every dependency is resolved, what they were affected by is collected
/// back into the component's definition to form its cache key.
///
/// [`ComponentFactory`]: crate::ComponentFactory
pub struct DependencyInjector<'a> {
    traversal: &'a mut Traversal,
    definition: &'a ContextDefinition,
    consumer: ComponentInfo,
    top_level: bool,
    site: Vec<Attribute>,
    arguments: Option<Vec<TypeArgument>>,
    children: Vec<ContextDefinition>,
}

impl<'a> DependencyInjector<'a> {
    pub(crate) fn new(
        traversal: &'a mut Traversal,
        definition: &'a ContextDefinition,
        consumer: ComponentInfo,
    ) -> Self {
        DependencyInjector {
            traversal,
            definition,
            consumer,
            top_level: false,
            site: Vec::new(),
            arguments: None,
            children: Vec::new(),
        }
    }

    /// An injector for a request made directly against the container.
    /// Missing components are reported as [`ResolutionError::Unresolvable`].
    pub(crate) fn top_level(
        traversal: &'a mut Traversal,
        definition: &'a ContextDefinition,
    ) -> Self {
        DependencyInjector {
            top_level: true,
            ..DependencyInjector::new(traversal, definition, ComponentInfo::of::<Container>())
        }
    }

    /// The component whose dependencies are being resolved.
    #[must_use]
    pub fn consumer(&self) -> ComponentInfo {
        self.consumer
    }

    /// The definition dependencies are resolved from.
    #[must_use]
    pub fn definition(&self) -> &ContextDefinition {
        self.definition
    }

    /// Resolves a dependency site.
    ///
    /// A required component that has no binding is reported as a missing
    /// dependency of the consumer.
    pub fn resolve<R: Request>(&mut self) -> ResolutionResult<Resolved<R>> {
        trace!(
            consumer = %self.consumer,
            request = std::any::type_name::<R>(),
            kind = ?R::KIND,
            "resolving dependency"
        );

        if self.top_level {
            return R::resolve(self);
        }

        let consumer = self.consumer;
        R::resolve(self).map_err(|error| match error {
            ResolutionError::Unresolvable { component } => {
                ResolutionError::MissingDependency {
                    component: consumer,
                    dependency: component,
                }
            }
            error => error,
        })
    }

    /// Follows a reference from this component.
    ///
    /// The reference sees the component's definition, expanded with the
    /// current site attributes and the reference itself.
    pub fn follow(&mut self, reference: Reference) -> ResolutionResult<Outcome> {
        let reference = match &self.arguments {
            Some(arguments) => reference.with_arguments(arguments.clone()),
            None => reference,
        };

        let mut child = self.definition.clone();
        child.expand(self.site.iter().cloned());
        child.expand_reference(reference.component(), reference.arguments())?;

        let outcome = self.traversal.follow(&mut child, &reference)?;
        if let Outcome::Resolved(_) = outcome {
            self.children.push(child);
        }

        Ok(outcome)
    }

    /// Runs `resolve` with extra attributes and type arguments applied to
    /// every reference it follows.
    pub fn qualified<T, F>(
        &mut self,
        attributes: Vec<Attribute>,
        arguments: Option<Vec<TypeArgument>>,
        resolve: F,
    ) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        let depth = self.site.len();
        self.site.extend(attributes);
        let previous = match arguments {
            Some(arguments) => self.arguments.replace(arguments),
            None => self.arguments.clone(),
        };

        let result = resolve(self);

        self.site.truncate(depth);
        self.arguments = previous;
        result
    }

    fn into_children(self) -> Vec<ContextDefinition> {
        self.children
    }
}

/// The state available while a component's dependencies are instantiated.
pub struct Instantiation<'a> {
    traversal: &'a mut Traversal,
    context: &'a ComponentContext,
    container: &'a AccessGuard<Container>,
}

impl<'a> Instantiation<'a> {
    pub(crate) fn new(
        traversal: &'a mut Traversal,
        context: &'a ComponentContext,
        container: &'a AccessGuard<Container>,
    ) -> Self {
        Instantiation {
            traversal,
            context,
            container,
        }
    }

    /// The traversal used to instantiate dependency nodes.
    pub fn traversal(&mut self) -> &mut Traversal {
        self.traversal
    }

    /// The context of the component being instantiated.
    #[must_use]
    pub fn context(&self) -> &ComponentContext {
        self.context
    }

    /// The container, guarded until the component is wired.
    #[must_use]
    pub fn container(&self) -> &AccessGuard<Container> {
        self.container
    }
}

/// Resolves a provider's component under `definition`.
///
/// The definition is expanded with the provider's qualifiers and narrowed to
/// what the component accepts, which is the context the component receives.
/// The context it is cached under additionally contains everything its
/// dependencies were affected by.
pub(crate) fn inject(
    container: &Container,
    provider: &Svc<dyn Provider>,
    definition: &mut ContextDefinition,
    traversal: &mut Traversal,
) -> ResolutionResult<NodeRef> {
    let descriptor = provider.descriptor();
    definition.expand(descriptor.qualifiers().iter().cloned());
    definition.accept(descriptor.acceptance());
    let injected = definition.create();

    if let Some(instance) = provider.constant() {
        trace!(component = %provider.result(), context = ?injected, "resolved constant");
        return Ok(Svc::new(ConstantNode::new(provider.result(), instance, injected)));
    }

    let mut injector = DependencyInjector::new(traversal, definition, provider.result());
    let prepared = provider.prepare(&mut injector)?;
    let children = injector.into_children();

    definition.collect(&children);
    let context = definition.create();
    trace!(
        component = %provider.result(),
        ?context,
        "resolved component"
    );

    Ok(Svc::new(ProviderNode {
        container: container.clone(),
        provider: provider.clone(),
        prepared,
        injected,
        context,
    }))
}

/// A component resolved from a provider, waiting to be instantiated.
struct ProviderNode {
    container: Container,
    provider: Svc<dyn Provider>,
    prepared: DynSvc,
    injected: ComponentContext,
    context: ComponentContext,
}

impl Node for ProviderNode {
    fn component(&self) -> ComponentInfo {
        self.provider.result()
    }

    fn context(&self) -> ComponentContext {
        self.context.clone()
    }

    fn instance(&self, traversal: &mut Traversal) -> ResolutionResult<DynSvc> {
        let source = self.provider.interface().name();
        let factory = || -> ResolutionResult<Option<DynSvc>> {
            let guard = AccessGuard::new(self.container.clone());
            let mut instantiation = Instantiation::new(traversal, &self.injected, &guard);
            let instance = self.provider.instantiate(&self.prepared, &mut instantiation)?;

            guard.enable();
            debug!(component = %self.provider.result(), "container access enabled");
            Ok(Some(instance))
        };

        self.provider
            .cache()
            .lookup(
                self.container.domain(),
                source,
                &self.context,
                self.provider.result(),
                Some(factory),
            )?
            .ok_or_else(|| ResolutionError::NullInstance {
                component: self.provider.result(),
                source: source.to_owned(),
            })
    }
}
