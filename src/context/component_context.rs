use crate::{
    attributes_eq, hash_attributes, Attribute, AttributeKind, AttributeMap,
    Qualifier, Svc, TypeReference,
};
use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
};

/// The immutable set of attributes a component was created under.
///
/// A component receives the attributes it accepts, and is cached under the
/// attributes it and its dependencies were affected by. Contexts compare and
/// hash without regard to attribute order.
#[derive(Clone, Default)]
pub struct ComponentContext {
    attributes: Svc<AttributeMap>,
}

impl ComponentContext {
    pub(crate) fn new(mut attributes: AttributeMap) -> Self {
        attributes.retain(|_, values| !values.is_empty());
        attributes.sort_keys();
        ComponentContext {
            attributes: Svc::new(attributes),
        }
    }

    /// Gets the first qualifier of type `Q`, if any.
    #[must_use]
    pub fn qualifier<Q: Qualifier>(&self) -> Option<&Q> {
        self.qualifiers().next()
    }

    /// Gets every qualifier of type `Q`.
    pub fn qualifiers<Q: Qualifier>(&self) -> impl Iterator<Item = &Q> {
        self.attributes_of(AttributeKind::of::<Q>())
            .iter()
            .filter_map(Attribute::downcast_ref)
    }

    /// Gets the attributes of the given kind.
    #[must_use]
    pub fn attributes_of(&self, kind: AttributeKind) -> &[Attribute] {
        self.attributes.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Gets the reference the component was requested through, if the
    /// component accepts it.
    #[must_use]
    pub fn reference(&self) -> Option<&TypeReference> {
        self.qualifier()
    }

    /// Gets the kinds present in this context.
    pub fn kinds(&self) -> impl Iterator<Item = AttributeKind> + '_ {
        self.attributes.keys().copied()
    }

    /// Whether this context has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl PartialEq for ComponentContext {
    fn eq(&self, other: &Self) -> bool {
        Svc::ptr_eq(&self.attributes, &other.attributes)
            || attributes_eq(&self.attributes, &other.attributes)
    }
}

impl Eq for ComponentContext {}

impl Hash for ComponentContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_attributes(&self.attributes, state);
    }
}

impl Debug for ComponentContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.attributes.iter().map(|(kind, values)| (kind.name(), values)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContextDefinition;
    use std::collections::HashSet;

    #[derive(Debug, PartialEq, Eq, Hash)]
    struct Tag(&'static str);
    impl Qualifier for Tag {}

    #[test]
    fn contexts_from_reordered_attributes_are_equal() {
        let left = ContextDefinition::create_from([(
            AttributeKind::of::<Tag>(),
            vec![Attribute::new(Tag("a")), Attribute::new(Tag("b"))],
        )]);
        let right = ContextDefinition::create_from([(
            AttributeKind::of::<Tag>(),
            vec![Attribute::new(Tag("b")), Attribute::new(Tag("a"))],
        )]);

        let mut set = HashSet::new();
        set.insert(left);
        assert!(set.contains(&right));
    }

    #[test]
    fn qualifiers_are_typed() {
        let context = ContextDefinition::create_from([(
            AttributeKind::of::<Tag>(),
            vec![Attribute::new(Tag("a")), Attribute::new(Tag("b"))],
        )]);

        let tags: Vec<_> = context.qualifiers::<Tag>().collect();
        assert_eq!(vec![&Tag("a"), &Tag("b")], tags);
        assert!(context.reference().is_none());
    }

    #[test]
    fn empty_kinds_are_dropped() {
        let context =
            ContextDefinition::create_from([(AttributeKind::of::<Tag>(), Vec::new())]);
        assert!(context.is_empty());
        assert_eq!(ComponentContext::default(), context);
    }
}
