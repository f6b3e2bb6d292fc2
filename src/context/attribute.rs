use crate::{Component, Svc};
use derive_more::Display;
use downcast_rs::Downcast;
use indexmap::IndexMap;
use std::{
    any::TypeId,
    collections::hash_map::DefaultHasher,
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
};

/// A qualifier attached to a component binding or an injection site.
///
/// Qualifiers are matched by value: two attributes of the same kind only
/// match if they compare equal.
pub trait Qualifier: Component + Debug + Eq + Hash {
    /// Attribute kinds that are dropped from a context when this qualifier
    /// is added to it.
    fn ignored_kinds(&self) -> Vec<AttributeKind> {
        Vec::new()
    }

    /// Internal qualifiers only influence which kinds are dropped. They are
    /// never added to a context themselves.
    fn is_internal(&self) -> bool {
        false
    }
}

/// Identifies a type of qualifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display)]
#[display(fmt = "{}", name)]
pub struct AttributeKind {
    id: TypeId,
    name: &'static str,
}

impl AttributeKind {
    /// Gets the kind of the given qualifier type.
    #[must_use]
    pub fn of<Q: Qualifier>() -> Self {
        AttributeKind {
            id: TypeId::of::<Q>(),
            name: std::any::type_name::<Q>(),
        }
    }

    /// Gets the [`TypeId`] of the qualifier type.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Gets the type name of the qualifier type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

trait DynQualifier: Component + Debug {
    fn ignored_kinds(&self) -> Vec<AttributeKind>;
    fn is_internal(&self) -> bool;
    fn eq_dyn(&self, other: &dyn DynQualifier) -> bool;
    fn hash_dyn(&self, state: &mut dyn Hasher);
}

impl<Q: Qualifier> DynQualifier for Q {
    fn ignored_kinds(&self) -> Vec<AttributeKind> {
        Qualifier::ignored_kinds(self)
    }

    fn is_internal(&self) -> bool {
        Qualifier::is_internal(self)
    }

    fn eq_dyn(&self, other: &dyn DynQualifier) -> bool {
        Downcast::as_any(other)
            .downcast_ref::<Q>()
            .is_some_and(|other| self == other)
    }

    fn hash_dyn(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}

/// A type-erased qualifier value.
#[derive(Clone)]
pub struct Attribute {
    kind: AttributeKind,
    value: Svc<dyn DynQualifier>,
}

impl Attribute {
    /// Wraps a qualifier value.
    #[must_use]
    pub fn new<Q: Qualifier>(qualifier: Q) -> Self {
        Attribute {
            kind: AttributeKind::of::<Q>(),
            value: Svc::new(qualifier),
        }
    }

    /// Gets the kind of this attribute.
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Gets the qualifier value if it has the given type.
    #[must_use]
    pub fn downcast_ref<Q: Qualifier>(&self) -> Option<&Q> {
        Downcast::as_any(self.value.as_ref()).downcast_ref()
    }

    /// Attribute kinds that adding this attribute drops from a context.
    #[must_use]
    pub fn ignored_kinds(&self) -> Vec<AttributeKind> {
        self.value.ignored_kinds()
    }

    /// Whether this attribute is kept out of contexts.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.value.is_internal()
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value.eq_dyn(other.value.as_ref())
    }
}

impl Eq for Attribute {}

impl Hash for Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.value.hash_dyn(state);
    }
}

impl Debug for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.value, f)
    }
}

pub(crate) type AttributeMap = IndexMap<AttributeKind, Vec<Attribute>>;

/// Compares two attribute maps, ignoring the order of kinds and of the values
/// within each kind.
pub(crate) fn attributes_eq(left: &AttributeMap, right: &AttributeMap) -> bool {
    left.len() == right.len()
        && left.iter().all(|(kind, values)| {
            right.get(kind).is_some_and(|other| {
                values.len() == other.len()
                    && values.iter().all(|value| other.contains(value))
            })
        })
}

/// Hashes an attribute map consistently with [`attributes_eq`].
pub(crate) fn hash_attributes<H: Hasher>(attributes: &AttributeMap, state: &mut H) {
    let combined = attributes
        .iter()
        .flat_map(|(kind, values)| values.iter().map(move |value| (kind, value)))
        .map(|entry| {
            let mut hasher = DefaultHasher::new();
            entry.hash(&mut hasher);
            hasher.finish()
        })
        .fold(0u64, u64::wrapping_add);
    state.write_usize(attributes.len());
    state.write_u64(combined);
}
