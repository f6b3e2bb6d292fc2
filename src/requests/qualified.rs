use crate::{
    Attribute, DependencyInjector, DependencyKind, Request, ResolutionResult,
    Resolved, TypeArgument,
};
use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
    ops::Deref,
};

/// A set of attributes to apply at a dependency site.
///
/// ## Example
///
/// ```
/// use runtime_composition::{Attribute, Qualifier, Qualifiers};
///
/// #[derive(Debug, PartialEq, Eq, Hash)]
/// struct Region(&'static str);
/// impl Qualifier for Region {}
///
/// struct Europe;
/// impl Qualifiers for Europe {
///     fn attributes() -> Vec<Attribute> {
///         vec![Attribute::new(Region("eu"))]
///     }
/// }
/// ```
pub trait Qualifiers: 'static {
    /// The attributes added to the context of the dependency.
    fn attributes() -> Vec<Attribute>;

    /// The type arguments of the reference, if it has any.
    fn type_arguments() -> Option<Vec<TypeArgument>> {
        None
    }
}

/// A dependency requested with extra attributes.
///
/// The attributes in `Q` are added to the context every reference made by
/// `R` is resolved under. Components that accept them can read them from
/// their [`ComponentContext`], and are cached separately for each distinct
/// value.
///
/// [`ComponentContext`]: crate::ComponentContext
pub struct Qualified<R, Q> {
    inner: R,
    marker: PhantomData<fn() -> Q>,
}

impl<R, Q> Qualified<R, Q> {
    /// Wraps a value.
    pub fn new(inner: R) -> Self {
        Qualified {
            inner,
            marker: PhantomData,
        }
    }

    /// Unwraps the requested value.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R, Q> Deref for Qualified<R, Q> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<R: Debug, Q> Debug for Qualified<R, Q> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Qualified").field(&self.inner).finish()
    }
}

impl<R, Q> Request for Qualified<R, Q>
where
    R: Request,
    Q: Qualifiers,
{
    const KIND: DependencyKind = R::KIND;

    fn resolve(injector: &mut DependencyInjector<'_>) -> ResolutionResult<Resolved<Self>> {
        let resolved =
            injector.qualified(Q::attributes(), Q::type_arguments(), |injector| {
                R::resolve(injector)
            })?;

        Ok(Resolved::new(move |instantiation| {
            resolved.materialize(instantiation).map(Qualified::new)
        }))
    }
}
