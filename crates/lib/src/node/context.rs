//! The per-node state record.

use std::rc::Rc;

use serde_json::Value;

use super::{Node, NodeName, NodeType, WeakNode, traps::TrapTable};
use crate::{config::SharedConfig, hooks::Hooks, plugin::Plugin};

/// Mutable state owned by exactly one [`Node`].
///
/// All access goes through the node handle; the record is never shared.
pub(crate) struct Context {
    /// Ordered children. This is the only owning edge in the tree.
    pub children: Vec<Node>,
    /// Config handle, possibly aliased across the subtree.
    pub config: SharedConfig,
    /// The init/input/commit pipelines.
    pub hooks: Rc<Hooks>,
    pub name: NodeName,
    /// Non-owning back-reference.
    pub parent: Option<WeakNode>,
    /// Applied plugins in application order.
    pub plugins: Vec<Plugin>,
    pub traps: TrapTable,
    pub node_type: NodeType,
    /// Stored value. Only meaningful while the node has no children.
    pub value: Value,
}
