//! Middleware pipelines attached to every node.
//!
//! Each node owns one [`Hooks`] record with three independent pipelines:
//!
//! - `init`: dispatched once at the end of construction with the node itself.
//!   Whatever node the pipeline returns is what the factory hands back.
//! - `input`: dispatched with the raw value passed to `input` before it is
//!   committed.
//! - `commit`: dispatched by a leaf with the candidate value just before it is
//!   stored; the returned value is what gets stored.
//!
//! Dispatch is synchronous and runs middleware in registration order. Each
//! middleware receives the payload returned by the one before it.

use std::{cell::RefCell, fmt, rc::Rc};

use serde_json::Value;

use crate::node::Node;

/// A single middleware function in a pipeline.
pub type Middleware<T> = Rc<dyn Fn(T) -> T>;

/// An ordered, synchronous middleware pipeline.
pub struct Dispatcher<T> {
    name: &'static str,
    middleware: RefCell<Vec<Middleware<T>>>,
}

impl<T> Dispatcher<T> {
    /// Create a new empty pipeline.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            middleware: RefCell::new(Vec::new()),
        }
    }

    /// Appends a middleware to the end of the pipeline.
    pub fn register(&self, middleware: impl Fn(T) -> T + 'static) {
        self.middleware.borrow_mut().push(Rc::new(middleware));
    }

    /// Threads `payload` through every middleware and returns the final value.
    ///
    /// The middleware list is captured before the first call, so a middleware
    /// that registers another one only affects later dispatches.
    pub fn dispatch(&self, payload: T) -> T {
        let chain: Vec<Middleware<T>> = self.middleware.borrow().clone();
        tracing::trace!(
            hook = self.name,
            middleware = chain.len(),
            "Dispatching hook"
        );
        chain
            .iter()
            .fold(payload, |payload, middleware| middleware(payload))
    }

    /// Name of the hook this pipeline serves.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the number of registered middleware.
    pub fn len(&self) -> usize {
        self.middleware.borrow().len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.middleware.borrow().is_empty()
    }
}

impl<T> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("middleware", &format!("<{} middleware>", self.len()))
            .finish()
    }
}

/// The three pipelines owned by a node.
#[derive(Debug)]
pub struct Hooks {
    /// Runs once at the end of construction.
    pub init: Dispatcher<Node>,
    /// Runs on every value passed to `input`.
    pub input: Dispatcher<Value>,
    /// Runs on a leaf's candidate value right before it is stored.
    pub commit: Dispatcher<Value>,
}

impl Hooks {
    /// Create a record with three empty pipelines.
    pub fn new() -> Self {
        Self {
            init: Dispatcher::new("init"),
            input: Dispatcher::new("input"),
            commit: Dispatcher::new("commit"),
        }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new()
    }
}
