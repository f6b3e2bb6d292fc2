use crate::{
    Component, ComponentFactory, DependencyInjector, Instantiation, Request,
    ResolutionResult, Svc,
};
use std::marker::PhantomData;

type Assignment<R> =
    Svc<dyn Fn(&mut R, &mut Instantiation<'_>) -> ResolutionResult<()> + Send + Sync>;

type FieldSite<R> = Box<
    dyn Fn(&mut DependencyInjector<'_>) -> ResolutionResult<Assignment<R>> + Send + Sync,
>;

/// Marker for the dependencies of a [`Fields`] factory.
pub struct FieldInjection<D>(PhantomData<fn(D)>);

/// Injects fields of a component after it has been constructed.
///
/// The base factory creates the component. Each injected field is then
/// resolved as its own dependency site and assigned through a setter, in the
/// order the fields were added. Fields requested as `Option<Svc<T>>` are
/// set to `None` when nothing is bound to them.
///
/// ## Example
///
/// ```
/// use runtime_composition::{Container, Fields, IntoSingleton, Svc};
///
/// struct Logger;
/// struct Metrics;
///
/// #[derive(Default)]
/// struct Handler {
///     logger: Option<Svc<Logger>>,
///     metrics: Option<Svc<Metrics>>,
/// }
///
/// let factory = Fields::new(Handler::default)
///     .inject(|handler: &mut Handler, logger: Svc<Logger>| {
///         handler.logger = Some(logger);
///     })
///     .inject(|handler: &mut Handler, metrics: Option<Svc<Metrics>>| {
///         handler.metrics = metrics;
///     });
///
/// let mut builder = Container::builder();
/// builder.provide(factory.singleton());
/// builder.provide((|| Logger).singleton());
///
/// let container = builder.build();
/// let handler: Svc<Handler> = container.get().unwrap();
/// assert!(handler.logger.is_some());
/// assert!(handler.metrics.is_none());
/// ```
pub struct Fields<D, R, F>
where
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    base: F,
    fields: Vec<FieldSite<R>>,
    marker: PhantomData<fn(D) -> R>,
}

impl<D, R, F> Fields<D, R, F>
where
    D: 'static,
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    /// Creates a factory that injects no fields yet.
    #[must_use]
    pub fn new(base: F) -> Self {
        Fields {
            base,
            fields: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Adds a field, assigned by `setter` from the value of request `T`.
    #[must_use]
    pub fn inject<T, S>(mut self, setter: S) -> Self
    where
        T: Request,
        S: Fn(&mut R, T) + Send + Sync + 'static,
    {
        let setter = Svc::new(setter);
        self.fields.push(Box::new(
            move |injector: &mut DependencyInjector<'_>| -> ResolutionResult<Assignment<R>> {
                let resolved = injector.resolve::<T>()?;
                let setter = setter.clone();
                let assignment: Assignment<R> = Svc::new(
                    move |component: &mut R,
                          instantiation: &mut Instantiation<'_>|
                          -> ResolutionResult<()> {
                        setter(component, resolved.materialize(instantiation)?);
                        Ok(())
                    },
                );
                Ok(assignment)
            },
        ));
        self
    }
}

impl<D, R, F> ComponentFactory<FieldInjection<D>> for Fields<D, R, F>
where
    D: 'static,
    R: Component,
    F: ComponentFactory<D, Result = R>,
{
    type Result = R;
    type Dependencies = (F::Dependencies, Vec<Assignment<R>>);

    fn arity(&self) -> usize {
        self.base.arity()
    }

    fn resolve(
        &self,
        injector: &mut DependencyInjector<'_>,
    ) -> ResolutionResult<Self::Dependencies> {
        let base = self.base.resolve(injector)?;
        let fields = self
            .fields
            .iter()
            .map(|field| field(injector))
            .collect::<ResolutionResult<Vec<_>>>()?;
        Ok((base, fields))
    }

    fn invoke(
        &self,
        dependencies: &Self::Dependencies,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<Self::Result> {
        let (base, fields) = dependencies;
        let mut component = self.base.invoke(base, instantiation)?;
        for assign in fields {
            assign(&mut component, instantiation)?;
        }

        Ok(component)
    }
}
