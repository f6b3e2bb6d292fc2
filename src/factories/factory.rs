use crate::{
    Component, DependencyInjector, Instantiation, Request, ResolutionResult,
    Resolved,
};

/// A factory for creating instances of a component.
///
/// Creating a component happens in two phases. While the component graph is
/// being resolved, [`resolve`](ComponentFactory::resolve) resolves every
/// dependency of the component. Once the graph is complete,
/// [`invoke`](ComponentFactory::invoke) instantiates those dependencies and
/// creates the component.
///
/// All functions of arity 12 or less are automatically component factories
/// if their arguments are valid [`Request`]s and their return value is a
/// valid component type.
///
/// ## Type parameters
/// * `D` - Tuple of this component's dependencies.
pub trait ComponentFactory<D>: Component {
    /// The component created by this factory.
    type Result: Component;

    /// The resolved dependencies of the component.
    type Dependencies: Component;

    /// The number of constructor parameters this factory injects.
    fn arity(&self) -> usize;

    /// Resolves the dependencies of the component.
    fn resolve(
        &self,
        injector: &mut DependencyInjector<'_>,
    ) -> ResolutionResult<Self::Dependencies>;

    /// Instantiates the resolved dependencies and creates the component.
    fn invoke(
        &self,
        dependencies: &Self::Dependencies,
        instantiation: &mut Instantiation<'_>,
    ) -> ResolutionResult<Self::Result>;
}

macro_rules! count {
    () => { 0usize };
    ($first:ident $($rest:ident)*) => { 1usize + count!($($rest)*) };
}

macro_rules! impl_component_function {
    () => {
        impl_component_function!(@impl ());
    };
    ($first:ident $(, $rest:ident)*) => {
        impl_component_function!(@impl ($first $(, $rest)*));
        impl_component_function!($($rest),*);
    };
    (@impl ($($type_name:ident),*)) => {
        impl<F, R $(, $type_name)*> ComponentFactory<($($type_name,)*)> for F
        where
            F: Component + Fn($($type_name),*) -> R,
            R: Component,
            $($type_name: Request,)*
        {
            type Result = R;
            type Dependencies = ($(Resolved<$type_name>,)*);

            fn arity(&self) -> usize {
                count!($($type_name)*)
            }

            #[allow(unused_variables)]
            fn resolve(
                &self,
                injector: &mut DependencyInjector<'_>,
            ) -> ResolutionResult<Self::Dependencies> {
                Ok(($(injector.resolve::<$type_name>()?,)*))
            }

            #[allow(unused_variables, non_snake_case)]
            fn invoke(
                &self,
                dependencies: &Self::Dependencies,
                instantiation: &mut Instantiation<'_>,
            ) -> ResolutionResult<Self::Result> {
                let ($($type_name,)*) = dependencies;
                Ok(self($($type_name.materialize(instantiation)?),*))
            }
        }
    };
}

impl_component_function!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
