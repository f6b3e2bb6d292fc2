use crate::{ComponentInfo, DynSvc, NodeRef, Svc};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct ElementState {
    implementation: Option<ComponentInfo>,
    node: Option<NodeRef>,
    instance: Option<DynSvc>,
}

/// One step of a traversal path. The key is the interface that was
/// followed. The rest is filled in as the step resolves and instantiates.
pub(crate) struct PathElement {
    key: ComponentInfo,
    state: Mutex<ElementState>,
}

impl PathElement {
    pub fn new(key: ComponentInfo) -> Self {
        PathElement {
            key,
            state: Mutex::new(ElementState::default()),
        }
    }

    pub fn key(&self) -> ComponentInfo {
        self.key
    }

    pub fn resolve(&self, node: NodeRef) {
        let mut state = self.state.lock();
        state.implementation = Some(node.component());
        state.node = Some(node);
    }

    pub fn node(&self) -> Option<NodeRef> {
        self.state.lock().node.clone()
    }

    pub fn implementation(&self) -> Option<ComponentInfo> {
        self.state.lock().implementation
    }

    pub fn instance(&self) -> Option<DynSvc> {
        self.state.lock().instance.clone()
    }

    pub fn short_circuit(&self, instance: DynSvc) {
        self.state.lock().instance = Some(instance);
    }
}

/// What a path saw when an element was pushed onto it.
pub(crate) struct Descent {
    /// The first element on the path with the same key, if any.
    pub repeating: Option<Svc<PathElement>>,

    /// Whether the pushed element was already the last one.
    pub tip: bool,
}

/// The chain of references currently being followed.
#[derive(Default)]
pub(crate) struct Path {
    elements: Vec<Svc<PathElement>>,
    positions: HashMap<ComponentInfo, usize>,
}

impl Path {
    pub fn descend(&mut self, element: Svc<PathElement>) -> Descent {
        let key = element.key();
        let repeating = self
            .positions
            .get(&key)
            .map(|&position| self.elements[position].clone());
        let tip = self
            .elements
            .last()
            .is_some_and(|last| Svc::ptr_eq(last, &element));

        if repeating.is_none() {
            self.positions.insert(key, self.elements.len());
        }
        self.elements.push(element);

        Descent { repeating, tip }
    }

    pub fn ascend(&mut self) {
        if let Some(element) = self.elements.pop() {
            let depth = self.elements.len();
            if self.positions.get(&element.key()) == Some(&depth) {
                self.positions.remove(&element.key());
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    pub fn keys(&self) -> Vec<ComponentInfo> {
        self.elements.iter().map(|element| element.key()).collect()
    }
}
