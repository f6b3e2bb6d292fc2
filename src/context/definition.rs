use crate::{
    attributes_eq, hash_attributes, Attribute, AttributeKind, AttributeMap,
    ComponentContext, ComponentInfo, Qualifier, ResolutionError,
    ResolutionResult, TypeArgument, TypeReference,
};
use std::hash::{Hash, Hasher};

/// The attribute kinds a component wants to see in its context.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Acceptance {
    kinds: Vec<AttributeKind>,
    typed: bool,
}

impl Acceptance {
    /// Accepts nothing.
    #[must_use]
    pub fn new() -> Self {
        Acceptance::default()
    }

    /// Accepts qualifiers of type `Q`.
    #[must_use]
    pub fn accept<Q: Qualifier>(self) -> Self {
        self.accept_kind(AttributeKind::of::<Q>())
    }

    /// Accepts qualifiers of the given kind.
    #[must_use]
    pub fn accept_kind(mut self, kind: AttributeKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }

        self
    }

    /// Accepts the reference the component is requested through.
    #[must_use]
    pub fn typed(mut self) -> Self {
        self.typed = true;
        self
    }

    /// Whether the requesting reference is accepted.
    #[must_use]
    pub fn is_typed(&self) -> bool {
        self.typed
    }

    /// All accepted kinds, including the reference kind if it is accepted.
    pub fn kinds(&self) -> impl Iterator<Item = AttributeKind> + '_ {
        self.kinds
            .iter()
            .copied()
            .chain(self.typed.then(TypeReference::kind))
    }
}

/// A mutable, in-progress context built up while walking down the component
/// graph.
///
/// A definition tracks every attribute that was *defined* along the current
/// path, and the subset that is *active*, meaning that the component being
/// resolved (or one of its dependencies) actually accepts it. Only active
/// attributes become part of the created [`ComponentContext`].
///
/// Two definitions are equal if they define the same attributes, regardless
/// of order and of what is active.
#[derive(Clone, Debug, Default)]
pub struct ContextDefinition {
    defined: AttributeMap,
    active: AttributeMap,
}

impl ContextDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new() -> Self {
        ContextDefinition::default()
    }

    /// Adds attributes to this definition.
    ///
    /// Every kind an incoming attribute ignores is first removed entirely.
    /// The remaining attributes are merged in, skipping duplicates and
    /// internal attributes.
    pub fn expand<A>(&mut self, attributes: A) -> &mut Self
    where
        A: IntoIterator<Item = Attribute>,
    {
        let attributes: Vec<Attribute> = attributes.into_iter().collect();
        for kind in attributes.iter().flat_map(Attribute::ignored_kinds) {
            self.defined.shift_remove(&kind);
            self.active.shift_remove(&kind);
        }

        for attribute in attributes {
            if attribute.is_internal() {
                continue;
            }

            let kind = attribute.kind();
            if kind == TypeReference::kind() {
                self.defined.insert(kind, vec![attribute]);
                continue;
            }

            let values = self.defined.entry(kind).or_default();
            if !values.contains(&attribute) {
                values.push(attribute);
            }
        }

        self
    }

    /// Records the reference a component is being requested through.
    ///
    /// Type variables are resolved against the previously recorded
    /// reference, so a generic component can pass its own arguments on to
    /// its dependencies.
    pub fn expand_reference(
        &mut self,
        component: ComponentInfo,
        arguments: &[TypeArgument],
    ) -> ResolutionResult<&mut Self> {
        let previous = self.reference();
        let arguments = arguments
            .iter()
            .map(|argument| match *argument {
                TypeArgument::Concrete(info) => Ok(info),
                TypeArgument::Variable(index) => previous
                    .and_then(|previous| previous.arguments().get(index))
                    .copied()
                    .ok_or(ResolutionError::UnresolvedTypeVariable {
                        component,
                        index,
                    }),
            })
            .collect::<ResolutionResult<Vec<_>>>()?;

        let reference = Attribute::new(TypeReference::new(component, arguments));
        if let Some(active) = self.active.get_mut(&TypeReference::kind()) {
            *active = vec![reference.clone()];
        }
        self.defined.insert(TypeReference::kind(), vec![reference]);

        Ok(self)
    }

    /// Marks the defined attributes of the accepted kinds as active. Anything
    /// that was active before is discarded.
    pub fn accept(&mut self, acceptance: &Acceptance) -> &mut Self {
        self.active.clear();
        for kind in acceptance.kinds() {
            if let Some(values) = self.defined.get(&kind) {
                self.active.insert(kind, values.clone());
            }
        }

        self
    }

    /// Merges the active attributes of resolved dependencies into this
    /// definition.
    ///
    /// A dependency that is affected by an attribute makes its parent
    /// affected by it as well, so that the parent is not shared between
    /// contexts that produce different dependencies. References never
    /// propagate, and only kinds defined here are kept.
    pub fn collect<'a, C>(&mut self, children: C) -> &mut Self
    where
        C: IntoIterator<Item = &'a ContextDefinition>,
    {
        for child in children {
            for (kind, values) in &child.active {
                if *kind == TypeReference::kind() {
                    continue;
                }

                let merged = self.active.entry(*kind).or_default();
                for value in values {
                    if !merged.contains(value) {
                        merged.push(value.clone());
                    }
                }
            }
        }

        let defined = &self.defined;
        self.active.retain(|kind, _| defined.contains_key(kind));
        self
    }

    /// Creates the context of the currently active attributes.
    #[must_use]
    pub fn create(&self) -> ComponentContext {
        ComponentContext::new(self.active.clone())
    }

    /// Creates a context from an explicit attribute map.
    #[must_use]
    pub fn create_from(
        attributes: impl IntoIterator<Item = (AttributeKind, Vec<Attribute>)>,
    ) -> ComponentContext {
        ComponentContext::new(attributes.into_iter().collect())
    }

    /// The reference currently recorded in this definition.
    #[must_use]
    pub fn reference(&self) -> Option<&TypeReference> {
        self.defined
            .get(&TypeReference::kind())
            .and_then(|values| values.first())
            .and_then(Attribute::downcast_ref)
    }

    /// The kinds defined along the current path.
    pub fn defined_kinds(&self) -> impl Iterator<Item = AttributeKind> + '_ {
        self.defined.keys().copied()
    }

    /// The kinds currently active.
    pub fn active_kinds(&self) -> impl Iterator<Item = AttributeKind> + '_ {
        self.active.keys().copied()
    }

    /// The defined attributes of the given kind.
    #[must_use]
    pub fn defined(&self, kind: AttributeKind) -> &[Attribute] {
        self.defined.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// The active attributes of the given kind.
    #[must_use]
    pub fn active(&self, kind: AttributeKind) -> &[Attribute] {
        self.active.get(&kind).map_or(&[], Vec::as_slice)
    }
}

impl PartialEq for ContextDefinition {
    fn eq(&self, other: &Self) -> bool {
        attributes_eq(&self.defined, &other.defined)
    }
}

impl Eq for ContextDefinition {}

impl Hash for ContextDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_attributes(&self.defined, state);
    }
}
