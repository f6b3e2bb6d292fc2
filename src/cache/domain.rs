use crate::Svc;
use derive_more::Display;
use std::{
    hash::{Hash, Hasher},
    sync::Weak,
};

#[derive(Debug, Display)]
#[display(fmt = "{}", name)]
pub(crate) struct DomainToken {
    name: String,
}

/// A segregation boundary for cached components.
///
/// Components cached in one domain are never handed out in another. Cache
/// entries belonging to a domain are released once every handle to the
/// domain has been dropped.
///
/// Domains compare by identity: two domains created with the same name are
/// still different domains.
#[derive(Clone, Debug, Display)]
#[display(fmt = "{}", token)]
pub struct Domain {
    token: Svc<DomainToken>,
}

impl Domain {
    /// Creates a new domain.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Domain {
            token: Svc::new(DomainToken { name: name.into() }),
        }
    }

    /// The name this domain was created with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.token.name
    }

    pub(crate) fn key(&self) -> usize {
        Svc::as_ptr(&self.token) as usize
    }

    pub(crate) fn downgrade(&self) -> Weak<DomainToken> {
        Svc::downgrade(&self.token)
    }
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        Svc::ptr_eq(&self.token, &other.token)
    }
}

impl Eq for Domain {}

impl Hash for Domain {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
