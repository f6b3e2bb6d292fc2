use crate::{Component, ComponentInfo, ResolutionError, ResolutionResult, Svc};
use std::{
    fmt::{Debug, Formatter},
    sync::atomic::{AtomicBool, Ordering},
};

struct GuardState<T> {
    enabled: AtomicBool,
    value: T,
}

/// Access to a capability that only becomes available once the component
/// graph it was handed to is fully wired.
///
/// Components can request an `AccessGuard<Container>` to look up further
/// components later on. Using it from inside the component's own factory
/// fails with [`ResolutionError::AccessDenied`], since the component graph is
/// still being assembled at that point. Once enabled, a guard stays enabled.
pub struct AccessGuard<T> {
    state: Svc<GuardState<T>>,
}

impl<T: Component> AccessGuard<T> {
    /// Creates a disabled guard.
    #[must_use]
    pub fn new(value: T) -> Self {
        AccessGuard {
            state: Svc::new(GuardState {
                enabled: AtomicBool::new(false),
                value,
            }),
        }
    }

    /// Creates a guard that is already enabled.
    #[must_use]
    pub fn enabled(value: T) -> Self {
        let guard = AccessGuard::new(value);
        guard.enable();
        guard
    }

    /// Permanently allows access to the guarded value.
    pub fn enable(&self) {
        self.state.enabled.store(true, Ordering::Release);
    }

    /// Whether access is allowed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::Acquire)
    }

    /// Gets the guarded value if access is allowed.
    pub fn access(&self) -> ResolutionResult<&T> {
        if self.is_enabled() {
            Ok(&self.state.value)
        } else {
            Err(ResolutionError::AccessDenied {
                capability: ComponentInfo::of::<T>(),
            })
        }
    }
}

impl<T> Clone for AccessGuard<T> {
    fn clone(&self) -> Self {
        AccessGuard {
            state: self.state.clone(),
        }
    }
}

impl<T: Component> Debug for AccessGuard<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("capability", &ComponentInfo::of::<T>())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
