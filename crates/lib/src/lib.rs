//!
//! formtree: the node engine underneath a form-state framework.
//! This library builds trees of typed nodes and gives every node the same
//! interceptable operation surface.
//!
//! ## Core Concepts
//!
//! * **Nodes (`node::Node`)**: Cheap-to-clone handles to tree units of type input, list, or group. Children are owned by their parent; the parent link is weak.
//! * **Traps (`node::Trap`)**: Per-node getter/setter pairs through which every operation is dispatched, so any one node can have an operation decorated or blocked.
//! * **Hooks (`hooks::Hooks`)**: Ordered, synchronous middleware pipelines for `init`, `input`, and `commit`.
//! * **Config (`config::SharedConfig`)**: A record of subtree options, aliased by reference from parent to child unless explicitly replaced.
//! * **Plugins (`plugin::Plugin`)**: Functions applied once per node that flood down a subtree unless they halt.
//! * **Addresses (`address::Locator`)**: Delimited name paths with `$root`, `$parent`, `$self` and `find(...)` tokens, resolved against the tree.
//!
//! Everything is single-threaded and synchronous. Operations are not
//! transactional: an error part way through leaves earlier mutations in place.

pub mod address;
pub mod config;
pub mod constants;
pub mod hooks;
pub mod node;
pub mod plugin;
pub mod search;
pub mod utils;

/// Re-export the node handle and factory for easier access.
pub use node::{Node, NodeError, NodeOptions, NodeType, create_node};

pub use config::{Config, ConfigError, SharedConfig};
pub use plugin::{Plugin, Propagate};

/// Result type used throughout the formtree library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the formtree library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured node errors from the node module
    #[error(transparent)]
    Node(node::NodeError),

    /// Structured config errors from the config module
    #[error(transparent)]
    Config(config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Node(_) => "node",
            Error::Config(_) => "config",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error came from writing a read-only trap.
    pub fn is_denied_mutation(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_denied_mutation(),
            _ => false,
        }
    }

    /// Check if this error came from calling a trap the node does not have.
    pub fn is_undefined_trap(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_undefined_trap(),
            _ => false,
        }
    }

    /// Check if a trap was handed, or answered with, the wrong shape.
    pub fn is_shape_error(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_shape_error(),
            _ => false,
        }
    }

    /// Check if a user-installed trap blocked the operation.
    pub fn is_intercepted(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_intercepted(),
            _ => false,
        }
    }

    /// Check if an attachment was refused because it would form a cycle.
    pub fn is_cyclic_attachment(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_cyclic_attachment(),
            _ => false,
        }
    }

    /// Check if this error is config-related.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
    }
}
