use crate::{
    ComponentContext, ComponentInfo, Domain, DomainToken, DynSvc,
    ResolutionError, ResolutionResult, Svc,
};
use parking_lot::{Condvar, Mutex};
use std::{
    collections::HashMap,
    sync::Weak,
    thread::{self, ThreadId},
};
use tracing::debug;

/// Whether instances of a component may be shared.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Sharing {
    /// One instance is shared per domain and context.
    #[default]
    Stateless,

    /// Every request creates a new instance.
    Stateful,
}

enum SlotState {
    Vacant,
    Creating(ThreadId),
    Ready(ResolutionResult<DynSvc>),
}

/// The cached result for one context. Threads asking for an instance that is
/// still being created wait for the creating thread to finish.
struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl Default for Slot {
    fn default() -> Self {
        Slot {
            state: Mutex::new(SlotState::Vacant),
            ready: Condvar::new(),
        }
    }
}

impl Slot {
    fn peek(&self) -> Option<DynSvc> {
        match &*self.state.lock() {
            SlotState::Ready(Ok(instance)) => Some(instance.clone()),
            _ => None,
        }
    }

    fn get_or_create<F>(
        &self,
        component: ComponentInfo,
        source: &str,
        factory: F,
    ) -> ResolutionResult<DynSvc>
    where
        F: FnOnce() -> ResolutionResult<Option<DynSvc>>,
    {
        let current = thread::current().id();
        let mut state = self.state.lock();
        loop {
            let waiting = match &*state {
                SlotState::Ready(result) => {
                    debug!(%component, source, "reusing cached instance");
                    return result.clone();
                }
                SlotState::Creating(owner) if *owner == current => {
                    return Err(ResolutionError::ReentrantInstantiation { component });
                }
                SlotState::Creating(_) => true,
                SlotState::Vacant => false,
            };

            if !waiting {
                break;
            }
            self.ready.wait(&mut state);
        }

        *state = SlotState::Creating(current);
        drop(state);

        let creating = Creating { slot: self };
        let result = create(component, source, factory);
        creating.finish(result.clone());
        result
    }
}

/// Owns a slot while its instance is being created. If the factory unwinds,
/// the slot is released again and waiting threads retry the creation.
struct Creating<'a> {
    slot: &'a Slot,
}

impl Creating<'_> {
    fn finish(self, result: ResolutionResult<DynSvc>) {
        *self.slot.state.lock() = SlotState::Ready(result);
    }
}

impl Drop for Creating<'_> {
    fn drop(&mut self) {
        let mut state = self.slot.state.lock();
        if let SlotState::Creating(_) = *state {
            *state = SlotState::Vacant;
        }
        self.slot.ready.notify_all();
    }
}

fn create<F>(component: ComponentInfo, source: &str, factory: F) -> ResolutionResult<DynSvc>
where
    F: FnOnce() -> ResolutionResult<Option<DynSvc>>,
{
    let instance = factory()?.ok_or_else(|| ResolutionError::NullInstance {
        component,
        source: source.to_owned(),
    })?;
    debug!(%component, source, "created instance");
    Ok(instance)
}

type ContextMap = HashMap<ComponentContext, Svc<Slot>>;

#[derive(Default)]
struct DomainMaps {
    global: ContextMap,
    scoped: HashMap<usize, (Weak<DomainToken>, ContextMap)>,
}

impl DomainMaps {
    fn map(&mut self, domain: Option<&Domain>) -> &mut ContextMap {
        match domain {
            None => &mut self.global,
            Some(domain) => {
                self.scoped.retain(|_, (token, _)| token.strong_count() > 0);
                &mut self
                    .scoped
                    .entry(domain.key())
                    .or_insert_with(|| (domain.downgrade(), ContextMap::new()))
                    .1
            }
        }
    }
}

/// Caches the instances of one component by domain and context.
///
/// Each instance is created at most once per domain and context, even when
/// several threads ask for it at the same time. Failed creations are cached
/// as well, so a failing factory is never invoked twice for the same key.
pub struct ComponentCache {
    sharing: Sharing,
    maps: Mutex<DomainMaps>,
}

impl ComponentCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(sharing: Sharing) -> Self {
        ComponentCache {
            sharing,
            maps: Mutex::default(),
        }
    }

    /// Whether this cache shares instances.
    #[must_use]
    pub fn sharing(&self) -> Sharing {
        self.sharing
    }

    /// Looks up the instance for a domain and context, creating it with
    /// `factory` if it is missing.
    ///
    /// Without a factory, only an existing instance is returned. `source`
    /// names the site asking for the instance and is only used for
    /// diagnostics.
    pub fn lookup<F>(
        &self,
        domain: Option<&Domain>,
        source: &str,
        context: &ComponentContext,
        component: ComponentInfo,
        factory: Option<F>,
    ) -> ResolutionResult<Option<DynSvc>>
    where
        F: FnOnce() -> ResolutionResult<Option<DynSvc>>,
    {
        if self.sharing == Sharing::Stateful {
            return factory
                .map(|factory| create(component, source, factory))
                .transpose();
        }

        let slot = {
            let mut maps = self.maps.lock();
            let map = maps.map(domain);
            if factory.is_some() {
                Some(map.entry(context.clone()).or_default().clone())
            } else {
                map.get(context).cloned()
            }
        };

        match (slot, factory) {
            (Some(slot), Some(factory)) => {
                slot.get_or_create(component, source, factory).map(Some)
            }
            (Some(slot), None) => Ok(slot.peek()),
            (None, _) => Ok(None),
        }
    }

    /// Gets an existing instance without creating one.
    #[must_use]
    pub fn get(&self, domain: Option<&Domain>, context: &ComponentContext) -> Option<DynSvc> {
        self.maps
            .lock()
            .map(domain)
            .get(context)
            .and_then(|slot| slot.peek())
    }

    /// The number of live domains with cached entries, not counting the
    /// global domain.
    #[must_use]
    pub fn domain_count(&self) -> usize {
        let mut maps = self.maps.lock();
        maps.scoped.retain(|_, (token, _)| token.strong_count() > 0);
        maps.scoped.len()
    }
}

impl Default for ComponentCache {
    fn default() -> Self {
        ComponentCache::new(Sharing::default())
    }
}
