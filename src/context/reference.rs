use crate::{AttributeKind, ComponentInfo, Qualifier};
use std::fmt::{Display, Formatter};

/// A generic argument of a reference as it is written at an injection site.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypeArgument {
    /// A concrete type.
    Concrete(ComponentInfo),

    /// The argument at the given index of the enclosing reference. This lets
    /// a generic component forward its own type arguments to its
    /// dependencies.
    Variable(usize),
}

impl TypeArgument {
    /// A concrete argument of the given type.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeArgument::Concrete(ComponentInfo::of::<T>())
    }
}

/// The fully resolved reference a component was requested through.
///
/// This is stored in a context under its own attribute kind, and is only
/// visible to components that accept it.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeReference {
    component: ComponentInfo,
    arguments: Vec<ComponentInfo>,
}

impl TypeReference {
    pub(crate) fn new(component: ComponentInfo, arguments: Vec<ComponentInfo>) -> Self {
        TypeReference {
            component,
            arguments,
        }
    }

    /// The kind under which references are stored in a context.
    #[must_use]
    pub fn kind() -> AttributeKind {
        AttributeKind::of::<TypeReference>()
    }

    /// The requested component.
    #[must_use]
    pub fn component(&self) -> ComponentInfo {
        self.component
    }

    /// The concrete type arguments of the reference.
    #[must_use]
    pub fn arguments(&self) -> &[ComponentInfo] {
        &self.arguments
    }
}

impl Qualifier for TypeReference {}

impl Display for TypeReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.component)?;
        if let Some((first, rest)) = self.arguments.split_first() {
            write!(f, "<{first}")?;
            for argument in rest {
                write!(f, ", {argument}")?;
            }
            write!(f, ">")?;
        }

        Ok(())
    }
}
