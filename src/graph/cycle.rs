use crate::ComponentInfo;
use std::fmt::{Display, Formatter};

/// How far a circular reference has propagated back up the path.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CycleState {
    /// Still travelling back towards the first occurrence of the repeated
    /// component.
    Live,

    /// Passed the first occurrence without being deferred. Nothing further
    /// up the path tries to break it.
    Unrolled,
}

/// A dependency cycle found while following references.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CycleError {
    origin: ComponentInfo,
    path: Vec<ComponentInfo>,
    state: CycleState,
}

impl CycleError {
    /// Creates a live cycle for the repeated component. The path should end
    /// with the repetition.
    #[must_use]
    pub fn new(origin: ComponentInfo, path: Vec<ComponentInfo>) -> Self {
        CycleError {
            origin,
            path,
            state: CycleState::Live,
        }
    }

    /// The component that was requested twice.
    #[must_use]
    pub fn origin(&self) -> ComponentInfo {
        self.origin
    }

    /// The components along the cycle, starting and ending with the origin.
    #[must_use]
    pub fn path(&self) -> &[ComponentInfo] {
        let start = self
            .path
            .iter()
            .position(|component| *component == self.origin)
            .unwrap_or(0);
        &self.path[start..]
    }

    /// The full path that was being resolved when the cycle was found.
    #[must_use]
    pub fn full_path(&self) -> &[ComponentInfo] {
        &self.path
    }

    /// The propagation state of the cycle.
    #[must_use]
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Whether the cycle is still travelling back towards `component`.
    #[must_use]
    pub fn is_live_at(&self, component: ComponentInfo) -> bool {
        self.state == CycleState::Live && self.origin == component
    }

    /// Marks the cycle as having passed its origin.
    #[must_use]
    pub fn unroll(mut self) -> Self {
        self.state = CycleState::Unrolled;
        self
    }
}

impl Display for CycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "circular reference: ")?;
        for (index, component) in self.path().iter().enumerate() {
            if index > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{component}")?;
        }

        Ok(())
    }
}
