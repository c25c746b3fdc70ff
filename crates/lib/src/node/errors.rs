//! Error types for node operations.
//!
//! These represent programmer misuse of the operation surface: writing a
//! read-only trap, calling a trap that does not exist, or feeding a trap the
//! wrong shape of arguments. Expected, checkable outcomes such as a failed
//! address lookup or a rejected parent assignment are not errors; they come
//! back as `None` or `false`.

use thiserror::Error;

/// Structured error types for node operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NodeError {
    /// A write was attempted through a trap that has no setter
    #[error("Cannot set '{trap}': trap is read-only")]
    DeniedMutation { trap: String },

    /// The named trap is not in the node's trap table
    #[error("Undefined trap '{trap}'")]
    UndefinedTrap { trap: String },

    /// A trap was invoked with arguments it does not accept
    #[error("Trap '{trap}' expected {expected} arguments")]
    UnexpectedArguments { trap: String, expected: String },

    /// A trap answered with a reply the caller could not use
    #[error("Trap '{trap}' replied with something other than {expected}")]
    UnexpectedReply { trap: String, expected: String },

    /// A user-installed trap refused the operation
    #[error("Trap '{trap}' intercepted the operation: {reason}")]
    Intercepted { trap: String, reason: String },

    /// Attaching the node would make it its own ancestor
    #[error("Trap '{trap}' refused to attach '{child}' under its own descendant '{parent}'")]
    CyclicAttachment {
        trap: String,
        child: String,
        parent: String,
    },
}

impl NodeError {
    /// Check if this error came from writing a read-only trap
    pub fn is_denied_mutation(&self) -> bool {
        matches!(self, NodeError::DeniedMutation { .. })
    }

    /// Check if this error came from a missing trap
    pub fn is_undefined_trap(&self) -> bool {
        matches!(self, NodeError::UndefinedTrap { .. })
    }

    /// Check if this error came from a trap receiving or producing the wrong shape
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            NodeError::UnexpectedArguments { .. } | NodeError::UnexpectedReply { .. }
        )
    }

    /// Check if a user-installed trap blocked the operation
    pub fn is_intercepted(&self) -> bool {
        matches!(self, NodeError::Intercepted { .. })
    }

    /// Check if an attachment was refused because it would form a cycle
    pub fn is_cyclic_attachment(&self) -> bool {
        matches!(self, NodeError::CyclicAttachment { .. })
    }

    /// Get the trap name this error refers to
    pub fn trap(&self) -> &str {
        match self {
            NodeError::DeniedMutation { trap }
            | NodeError::UndefinedTrap { trap }
            | NodeError::UnexpectedArguments { trap, .. }
            | NodeError::UnexpectedReply { trap, .. }
            | NodeError::Intercepted { trap, .. }
            | NodeError::CyclicAttachment { trap, .. } => trap,
        }
    }
}

// Conversion from NodeError to the main Error type
impl From<NodeError> for crate::Error {
    fn from(err: NodeError) -> Self {
        crate::Error::Node(err)
    }
}
