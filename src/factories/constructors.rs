use crate::{
    Candidates, Component, ComponentFactory, ComponentInfo,
    DependencyInjector, DynSvc, Instantiation, ResolutionError,
    ResolutionResult, Svc,
};
use std::marker::PhantomData;
use tracing::debug;

/// Whether a constructor can be called from outside the component's module.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Visibility {
    /// Callable from anywhere.
    Public,

    /// Only callable from inside the component's own module.
    Private,
}

trait ErasedConstructor<R>: Component {
    fn resolve(&self, injector: &mut DependencyInjector<'_>) -> ResolutionResult<DynSvc>;
    fn invoke(
        &self,
        dependencies: &DynSvc,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<R>;
}

struct TypedConstructor<D, F> {
    factory: F,
    marker: PhantomData<fn(D)>,
}

impl<D, F> ErasedConstructor<F::Result> for TypedConstructor<D, F>
where
    D: 'static,
    F: ComponentFactory<D>,
{
    fn resolve(&self, injector: &mut DependencyInjector<'_>) -> ResolutionResult<DynSvc> {
        Ok(Svc::new(self.factory.resolve(injector)?))
    }

    fn invoke(
        &self,
        dependencies: &DynSvc,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<F::Result> {
        let dependencies = dependencies
            .downcast_ref::<F::Dependencies>()
            .ok_or(ResolutionError::InvalidInstance {
                component: ComponentInfo::of::<F::Result>(),
            })?;
        self.factory.invoke(dependencies, instantiation)
    }
}

/// One way of creating a component, as described by its metadata.
pub struct Constructor<R> {
    name: &'static str,
    arity: usize,
    visibility: Visibility,
    injectable: bool,
    factory: Box<dyn ErasedConstructor<R>>,
}

impl<R: Component> Constructor<R> {
    /// Describes a private, unmarked constructor.
    #[must_use]
    pub fn new<D, F>(name: &'static str, factory: F) -> Self
    where
        D: 'static,
        F: ComponentFactory<D, Result = R>,
    {
        Constructor {
            name,
            arity: factory.arity(),
            visibility: Visibility::Private,
            injectable: false,
            factory: Box::new(TypedConstructor {
                factory,
                marker: PhantomData,
            }),
        }
    }

    /// Marks this constructor as callable from anywhere.
    #[must_use]
    pub fn public(mut self) -> Self {
        self.visibility = Visibility::Public;
        self
    }

    /// Marks this constructor as the one meant for injection.
    #[must_use]
    pub fn injectable(mut self) -> Self {
        self.injectable = true;
        self
    }

    /// The name of this constructor.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The number of parameters of this constructor.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The visibility of this constructor.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether this constructor is marked for injection.
    #[must_use]
    pub fn is_injectable(&self) -> bool {
        self.injectable
    }
}

/// Marker for the dependencies of a [`Constructors`] factory.
pub struct ConstructorSelection;

/// A component factory choosing among the constructors of a component.
///
/// The constructor is chosen as follows:
/// 1. If exactly one constructor is marked [`injectable`], it is used. If
///    several are, the choice is ambiguous.
/// 2. If there is exactly one constructor, it is used.
/// 3. If there are exactly two and one of them takes no parameters, the
///    other one is used.
/// 4. Rules 2 and 3 are repeated with only the public constructors.
///
/// Anything else fails with [`ResolutionError::AmbiguousConstructor`].
///
/// [`injectable`]: Constructor::injectable
///
/// ## Example
///
/// ```
/// use runtime_composition::{
///     Constructor, Constructors, Container, IntoSingleton, Svc,
/// };
///
/// struct Config;
/// struct Server(Option<Svc<Config>>);
///
/// impl Server {
///     fn new() -> Self {
///         Server(None)
///     }
///
///     fn with_config(config: Svc<Config>) -> Self {
///         Server(Some(config))
///     }
/// }
///
/// let constructors = Constructors::new()
///     .with(Constructor::new("new", Server::new).public())
///     .with(Constructor::new("with_config", Server::with_config).public());
///
/// let mut builder = Container::builder();
/// builder.provide(constructors.singleton());
/// builder.provide((|| Config).singleton());
///
/// let container = builder.build();
/// let server: Svc<Server> = container.get().unwrap();
/// assert!(server.0.is_some());
/// ```
pub struct Constructors<R> {
    candidates: Vec<Constructor<R>>,
}

impl<R: Component> Constructors<R> {
    /// Creates an empty set of constructors.
    #[must_use]
    pub fn new() -> Self {
        Constructors {
            candidates: Vec::new(),
        }
    }

    /// Adds a constructor.
    #[must_use]
    pub fn with(mut self, constructor: Constructor<R>) -> Self {
        self.candidates.push(constructor);
        self
    }

    /// Chooses the constructor to inject.
    pub fn select(&self) -> ResolutionResult<(usize, &Constructor<R>)> {
        let all: Vec<_> = self.candidates.iter().enumerate().collect();
        let marked: Vec<_> = all
            .iter()
            .copied()
            .filter(|(_, constructor)| constructor.injectable)
            .collect();
        let public: Vec<_> = all
            .iter()
            .copied()
            .filter(|(_, constructor)| constructor.visibility == Visibility::Public)
            .collect();

        let selected = match marked.as_slice() {
            [only] => Some(*only),
            [] => choose(&all).or_else(|| choose(&public)),
            _ => None,
        };

        match selected {
            Some((index, constructor)) => {
                debug!(
                    component = %ComponentInfo::of::<R>(),
                    constructor = constructor.name,
                    "selected constructor"
                );
                Ok((index, constructor))
            }
            None => Err(ResolutionError::AmbiguousConstructor {
                component: ComponentInfo::of::<R>(),
                candidates: Candidates(
                    self.candidates.iter().map(Constructor::name).collect(),
                ),
            }),
        }
    }
}

fn choose<'a, R>(
    candidates: &[(usize, &'a Constructor<R>)],
) -> Option<(usize, &'a Constructor<R>)> {
    match candidates {
        [only] => Some(*only),
        [first, second] if first.1.arity == 0 => Some(*second),
        [first, second] if second.1.arity == 0 => Some(*first),
        _ => None,
    }
}

impl<R: Component> Default for Constructors<R> {
    fn default() -> Self {
        Constructors::new()
    }
}

impl<R: Component> ComponentFactory<ConstructorSelection> for Constructors<R> {
    type Result = R;
    type Dependencies = (usize, DynSvc);

    fn arity(&self) -> usize {
        self.select().map_or(0, |(_, constructor)| constructor.arity)
    }

    fn resolve(
        &self,
        injector: &mut DependencyInjector<'_>,
    ) -> ResolutionResult<Self::Dependencies> {
        let (index, constructor) = self.select()?;
        Ok((index, constructor.factory.resolve(injector)?))
    }

    fn invoke(
        &self,
        dependencies: &Self::Dependencies,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<Self::Result> {
        let (index, dependencies) = dependencies;
        let constructor =
            self.candidates
                .get(*index)
                .ok_or(ResolutionError::InvalidInstance {
                    component: ComponentInfo::of::<R>(),
                })?;
        constructor.factory.invoke(dependencies, instantiation)
    }
}
