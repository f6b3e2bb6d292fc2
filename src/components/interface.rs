use crate::{Component, Deferred, Svc};

/// A capability contract components can be requested through.
///
/// Every sized component is its own interface. Trait objects become
/// interfaces through the [`interface!`] macro.
///
/// Only interfaces whose capability set can be forwarded through a
/// [`Deferred`] handle are able to break dependency cycles. Sized types can
/// never be forwarded, so a cycle through one is always fatal.
pub trait Interface: Component {
    /// Wraps a deferred handle into an instance of this interface, if the
    /// interface supports forwarding.
    #[doc(hidden)]
    fn defer(deferred: Deferred<Self>) -> Option<Svc<Self>> {
        drop(deferred);
        None
    }
}

impl<T: Component> Interface for T {}

/// Marker trait that indicates that a type is an interface for another type.
///
/// Each `dyn Trait` is an interface for the types that implement it. This
/// trait should usually be implemented by the [`interface!`] macro.
pub trait InterfaceFor<T>: Interface
where
    T: Component,
{
    #[doc(hidden)]
    fn from_svc(component: Svc<T>) -> Svc<Self>;
}

impl<T: Component> InterfaceFor<T> for T {
    fn from_svc(component: Svc<T>) -> Svc<Self> {
        component
    }
}

/// Marks a trait as being an interface for its implementations.
///
/// The trait must be a subtrait of [`Component`].
///
/// When the trait's methods are listed, a forwarding implementation of the
/// trait is generated for [`Deferred<dyn Trait>`](crate::Deferred). This
/// lets the container break dependency cycles through the interface by
/// handing out a placeholder that resolves the real component on first use.
/// Only `&self` methods without generic parameters can be forwarded.
///
/// ## Example
///
/// ```
/// use runtime_composition::{interface, Component};
///
/// trait Greeter: Component {
///     fn greet(&self, name: &str) -> String;
/// }
///
/// // Cycles through `dyn Greeter` can be broken
/// interface! {
///     dyn Greeter {
///         fn greet(&self, name: &str) -> String;
///     }
/// }
///
/// trait Clock: Component {}
///
/// // Cycles through `dyn Clock` are reported as errors
/// interface!(dyn Clock);
/// ```
#[macro_export]
macro_rules! interface {
    (dyn $interface:ident) => {
        impl $crate::Interface for dyn $interface {}

        $crate::interface!(@convert $interface);
    };
    (
        dyn $interface:ident {
            $(
                fn $method:ident(&self $(, $arg:ident: $arg_ty:ty)* $(,)?) $(-> $ret:ty)?;
            )*
        }
    ) => {
        impl $crate::Interface for dyn $interface {
            fn defer(
                deferred: $crate::Deferred<Self>,
            ) -> ::std::option::Option<$crate::Svc<Self>> {
                ::std::option::Option::Some($crate::Svc::new(deferred))
            }
        }

        impl $interface for $crate::Deferred<dyn $interface> {
            $(
                fn $method(&self $(, $arg: $arg_ty)*) $(-> $ret)? {
                    $crate::Deferred::force(self).$method($($arg),*)
                }
            )*
        }

        $crate::interface!(@convert $interface);
    };
    (@convert $interface:ident) => {
        impl<T: $interface> $crate::InterfaceFor<T> for dyn $interface {
            fn from_svc(component: $crate::Svc<T>) -> $crate::Svc<Self> {
                component
            }
        }
    };
}
