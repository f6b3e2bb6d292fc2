use crate::{
    unerase, AccessGuard, ComponentContext, ComponentInfo, Container,
    DependencyInjector, DynSvc, Instantiation, Interface, Reference,
    ResolutionError, ResolutionResult, Svc,
};

/// How a dependency site is satisfied.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DependencyKind {
    /// The context the component was created under.
    Context,

    /// The container itself, guarded until the component is wired.
    Container,

    /// A component resolved through the graph.
    Component,
}

/// A resolved dependency site, ready to be instantiated.
pub struct Resolved<T> {
    materialize: Svc<dyn Fn(&mut Instantiation<'_>) -> ResolutionResult<T> + Send + Sync>,
}

impl<T> Resolved<T> {
    /// Creates a resolved site from its instantiation step.
    pub fn new<F>(materialize: F) -> Self
    where
        F: Fn(&mut Instantiation<'_>) -> ResolutionResult<T> + Send + Sync + 'static,
    {
        Resolved {
            materialize: Svc::new(materialize),
        }
    }

    /// Instantiates the dependency.
    pub fn materialize(&self, instantiation: &mut Instantiation<'_>) -> ResolutionResult<T> {
        (self.materialize)(instantiation)
    }
}

impl<T> Clone for Resolved<T> {
    fn clone(&self) -> Self {
        Resolved {
            materialize: self.materialize.clone(),
        }
    }
}

/// A dependency site of a component.
///
/// Requests are resolved in two steps. [`Request::resolve`] runs while the
/// component graph is being resolved and follows any references the request
/// needs. The returned [`Resolved`] value is materialized once the
/// component is actually instantiated.
///
/// ## Grouping requests
///
/// Requests can be grouped together by using tuples. Since factories support
/// at most 12 parameters, tuples can also be used to get around that limit.
///
/// ```
/// use runtime_composition::{Container, IntoSingleton, Svc};
///
/// struct Bar;
/// struct Baz;
/// struct Foo(Svc<Bar>, Svc<Baz>);
///
/// impl Foo {
///     pub fn new((bar, baz): (Svc<Bar>, Svc<Baz>)) -> Self {
///         Foo(bar, baz)
///     }
/// }
///
/// let mut builder = Container::builder();
/// builder.provide(Foo::new.singleton());
/// builder.provide((|| Bar).singleton());
/// builder.provide((|| Baz).singleton());
///
/// let container = builder.build();
/// let _foo: Svc<Foo> = container.get().unwrap();
/// ```
pub trait Request: Sized + 'static {
    /// How this request is satisfied.
    const KIND: DependencyKind = DependencyKind::Component;

    /// Resolves this request for the component being injected.
    fn resolve(injector: &mut DependencyInjector<'_>) -> ResolutionResult<Resolved<Self>>;
}

/// Requests the context the component is created under.
impl Request for ComponentContext {
    const KIND: DependencyKind = DependencyKind::Context;

    fn resolve(_injector: &mut DependencyInjector<'_>) -> ResolutionResult<Resolved<Self>> {
        Ok(Resolved::new(|instantiation| Ok(instantiation.context().clone())))
    }
}

/// Requests the container. It can only be accessed after the requesting
/// component has been created.
impl Request for AccessGuard<Container> {
    const KIND: DependencyKind = DependencyKind::Container;

    fn resolve(_injector: &mut DependencyInjector<'_>) -> ResolutionResult<Resolved<Self>> {
        Ok(Resolved::new(|instantiation| Ok(instantiation.container().clone())))
    }
}

/// Requests a component through an interface. This fails if there is not
/// exactly one binding for it.
impl<I: ?Sized + Interface> Request for Svc<I> {
    fn resolve(injector: &mut DependencyInjector<'_>) -> ResolutionResult<Resolved<Self>> {
        let node = injector
            .follow(Reference::of::<I>())?
            .node()
            .ok_or(ResolutionError::Unresolvable {
                component: ComponentInfo::of::<I>(),
            })?;

        Ok(Resolved::new(move |instantiation| {
            let instance = node.instance(instantiation.traversal())?;
            unerase::<I>(&instance, ComponentInfo::of::<I>())
        }))
    }
}

/// Requests a component if it has a binding. This still fails if there are
/// multiple bindings or if the component's own dependencies cannot be
/// resolved.
impl<I: ?Sized + Interface> Request for Option<Svc<I>> {
    fn resolve(injector: &mut DependencyInjector<'_>) -> ResolutionResult<Resolved<Self>> {
        let node = match injector.follow(Reference::of::<I>())?.node() {
            Some(node) => node,
            None => return Ok(Resolved::new(|_| Ok(None))),
        };

        Ok(Resolved::new(move |instantiation| {
            let instance = node.instance(instantiation.traversal())?;
            unerase::<I>(&instance, ComponentInfo::of::<I>()).map(Some)
        }))
    }
}

/// Requests every component providing an interface, in discovery order. If
/// nothing provides it, the result is empty.
impl<I: ?Sized + Interface> Request for Vec<Svc<I>> {
    fn resolve(injector: &mut DependencyInjector<'_>) -> ResolutionResult<Resolved<Self>> {
        let node = match injector.follow(Reference::of::<I>().into_group())?.node() {
            Some(node) => node,
            None => return Ok(Resolved::new(|_| Ok(Vec::new()))),
        };

        Ok(Resolved::new(move |instantiation| {
            let component = ComponentInfo::of::<I>();
            let instance = node.instance(instantiation.traversal())?;
            instance
                .downcast_ref::<Vec<DynSvc>>()
                .ok_or(ResolutionError::InvalidInstance { component })?
                .iter()
                .map(|member| unerase::<I>(member, component))
                .collect()
        }))
    }
}

macro_rules! impl_tuple_request {
    () => {
        impl_tuple_request!(@impl ());
    };
    ($first:ident $(, $rest:ident)*) => {
        impl_tuple_request!(@impl ($first $(, $rest)*));
        impl_tuple_request!($($rest),*);
    };
    (@impl ($($type_name:ident),*)) => {
        /// Requests each element of the tuple.
        impl<$($type_name),*> Request for ($($type_name,)*)
        where
            $($type_name: Request,)*
        {
            #[allow(unused_variables, non_snake_case)]
            fn resolve(
                injector: &mut DependencyInjector<'_>,
            ) -> ResolutionResult<Resolved<Self>> {
                $(let $type_name = injector.resolve::<$type_name>()?;)*
                Ok(Resolved::new(move |instantiation| {
                    Ok(($($type_name.materialize(instantiation)?,)*))
                }))
            }
        }
    };
}

impl_tuple_request!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
