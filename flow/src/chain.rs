//! Chain - Ordered Action Interceptors
//!
//! A `Chain` runs every intercepted call through its interceptors in the
//! order they were added, then hands it to the terminal that performs the
//! action. Each interceptor decides whether to call [`Next::run`].
//!
//! **IMPORTANT**: interception is synchronous. Async flows are observed only
//! at their boundaries, one call at a time.

use crate::call::ActionCall;
use loadline_core::LoadingResult;
use std::sync::Arc;

/// A link in the interception chain.
pub trait Interceptor<E = serde_json::Value>: Send + Sync {
    /// Handle `call`, forwarding it with `next.run(call)` to continue the chain.
    fn intercept(&self, call: ActionCall<E>, next: Next<'_, E>) -> LoadingResult;
}

impl<E, F> Interceptor<E> for F
where
    F: for<'a> Fn(ActionCall<E>, Next<'a, E>) -> LoadingResult + Send + Sync,
{
    fn intercept(&self, call: ActionCall<E>, next: Next<'_, E>) -> LoadingResult {
        self(call, next)
    }
}

/// Performs the action once every interceptor has forwarded the call.
pub type Terminal<E> = Arc<dyn Fn(ActionCall<E>) -> LoadingResult + Send + Sync>;

/// The rest of the chain after the current interceptor.
pub struct Next<'a, E> {
    rest: &'a [Box<dyn Interceptor<E>>],
    terminal: &'a Terminal<E>,
}

impl<E> Next<'_, E> {
    /// Forward `call` to the next interceptor, or to the terminal.
    pub fn run(self, call: ActionCall<E>) -> LoadingResult {
        match self.rest.split_first() {
            Some((head, tail)) => head.intercept(
                call,
                Next {
                    rest: tail,
                    terminal: self.terminal,
                },
            ),
            None => (self.terminal)(call),
        }
    }

    /// Interceptors left before the terminal.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

pub struct Chain<E = serde_json::Value> {
    interceptors: Vec<Box<dyn Interceptor<E>>>,
    terminal: Terminal<E>,
}

impl<E: 'static> Chain<E> {
    pub fn new<F>(terminal: F) -> Self
    where
        F: Fn(ActionCall<E>) -> LoadingResult + Send + Sync + 'static,
    {
        Self {
            interceptors: Vec::new(),
            terminal: Arc::new(terminal),
        }
    }

    /// A chain whose terminal accepts every call and does nothing.
    pub fn passthrough() -> Self {
        Self::new(|_| Ok(()))
    }

    pub fn with<I: Interceptor<E> + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    /// Run `call` through the whole chain.
    pub fn dispatch(&self, call: ActionCall<E>) -> LoadingResult {
        Next {
            rest: &self.interceptors,
            terminal: &self.terminal,
        }
        .run(call)
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl<E> std::fmt::Debug for Chain<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("interceptor_count", &self.interceptors.len())
            .finish()
    }
}
