use crate::{Provider, Svc};

/// A collection of providers that can be added all at once to a
/// [`ContainerBuilder`](crate::ContainerBuilder). Modules can be used to
/// group together related components and configure the container in pieces
/// rather than all at once.
///
/// Cloning a module shares its providers. For creating a module easily via a
/// domain specific language, see [`define_module!`].
#[derive(Clone, Default)]
pub struct Module {
    providers: Vec<Svc<dyn Provider>>,
}

impl Module {
    /// Creates an empty module.
    #[must_use]
    pub fn new() -> Self {
        Module::default()
    }

    /// Binds a provider to its interface.
    pub fn provide<P: Provider>(&mut self, provider: P) {
        self.providers.push(Svc::new(provider));
    }

    /// The providers in this module, in registration order.
    #[must_use]
    pub fn providers(&self) -> &[Svc<dyn Provider>] {
        &self.providers
    }
}

/// Defines a new module using a domain specific language.
///
/// ## Example
///
/// ```
/// use runtime_composition::{
///     define_module, interface, Component, Container, IntoSingleton, Svc,
/// };
///
/// struct Foo;
/// struct Bar;
/// struct Baz(Vec<Svc<dyn Fooable>>);
/// #[cfg(test)]
/// struct Quux;
///
/// trait Fooable: Component {}
/// impl Fooable for Foo {}
/// impl Fooable for Bar {}
/// #[cfg(test)]
/// impl Fooable for Quux {}
/// interface!(dyn Fooable);
///
/// let module = define_module! {
///     services = [
///         Baz.singleton(),
///     ],
///     interfaces = {
///         dyn Fooable = [
///             (|| Foo).singleton(),
///             (|| Bar).singleton(),
///         ],
///     },
///
///     // Definitions of the same kind are merged together, so providers can
///     // be registered only in certain environments.
///     #[cfg(test)]
///     interfaces = {
///         dyn Fooable = [
///             (|| Quux).singleton(),
///         ],
///     },
/// };
///
/// let mut builder = Container::builder();
/// builder.add_module(&module);
///
/// let container = builder.build();
/// let baz: Svc<Baz> = container.get().unwrap();
///
/// #[cfg(not(test))]
/// assert_eq!(2, baz.0.len());
/// #[cfg(test)]
/// assert_eq!(3, baz.0.len());
/// ```
#[macro_export]
macro_rules! define_module {
    {
        $(
            $(#[$($attr:meta),*])*
            $key:ident = $value:tt
        ),*
        $(,)?
    } => {
        {
            #[allow(unused_mut)]
            let mut module = <$crate::Module as ::std::default::Default>::default();
            $(
                $(#[$($attr),*])*
                $crate::define_module!(@provide &mut module, $key = $value);
            )*
            module
        }
    };
    (
        @provide $module:expr,
        services = [
            $($service:expr),*
            $(,)?
        ]
    ) => {
        $($module.provide($service);)*
    };
    (
        @provide $module:expr,
        interfaces = {
            $($interface:ty = [
                $($implementation:expr),*
                $(,)?
            ]),*
            $(,)?
        }
    ) => {
        $(
            $($module.provide($crate::WithInterface::with_interface::<$interface>($implementation));)*
        )*
    };
}

#[cfg(test)]
mod tests {
    use crate::{Container, Domain, IntoSingleton, Svc};

    struct Foo;

    /// Containers sharing a module reuse instances only within a domain.
    #[test]
    fn shared_module_is_segregated_by_domain() {
        let module = define_module! {
            services = [(|| Foo).singleton()],
        };

        let build = |domain: &Domain| {
            let mut builder = Container::builder();
            builder.add_module(&module);
            builder.domain(domain.clone());
            builder.build()
        };

        let first = Domain::new("first");
        let second = Domain::new("second");
        let a: Svc<Foo> = build(&first).get().unwrap();
        let b: Svc<Foo> = build(&first).get().unwrap();
        let c: Svc<Foo> = build(&second).get().unwrap();

        assert!(Svc::ptr_eq(&a, &b));
        assert!(!Svc::ptr_eq(&a, &c));
    }
}
