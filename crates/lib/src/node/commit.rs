//! Value commit and read-time aggregation.
//!
//! Values are written down the tree and read back up it. `input` sends a value
//! through the node's `input` hook, then either stores it (a leaf) or fans it
//! out to the children whose names are own keys of the value (a composite).
//!
//! A composite never stores the object it was given. Its value is rebuilt from
//! its children every time it is read: a list yields an array of child values
//! in order, anything else yields an object keyed by child name. A composite
//! that has no children yet returns whatever was stored on it.

use serde_json::{Map, Value};

use super::{Node, NodeType};
use crate::{Result, utils::has_own};

/// Commits `value` to `node` and, through it, to matching descendants.
pub(crate) fn input(node: &Node, value: Value) -> Result<()> {
    let hooks = node.hooks();
    let candidate = hooks.input.dispatch(value);
    let children = node.children();

    if children.is_empty() {
        let committed = hooks.commit.dispatch(candidate);
        node.ctx_mut().value = committed;
        return Ok(());
    }

    if !matches!(candidate, Value::Object(_) | Value::Array(_)) {
        tracing::trace!(node = %node, "Ignoring non-object input on a node with children");
        return Ok(());
    }

    let named = children
        .into_iter()
        .map(|child| Ok((child.name()?, child)))
        .collect::<Result<Vec<(String, Node)>>>()?;

    for (i, (name, child)) in named.iter().enumerate() {
        // With duplicate names the later sibling owns the key.
        if named[i + 1..].iter().any(|(other, _)| other == name) {
            continue;
        }
        if let Some(sub) = has_own(&candidate, name) {
            child.input(sub.clone())?;
        }
    }
    Ok(())
}

/// Reads the value of `node`, aggregating from children when it has any.
pub(crate) fn value(node: &Node) -> Result<Value> {
    let children = node.children();
    if children.is_empty() {
        return Ok(node.ctx().value.clone());
    }

    match node.node_type() {
        NodeType::List => children
            .iter()
            .map(Node::value)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        NodeType::Group | NodeType::Input => {
            let mut map = Map::with_capacity(children.len());
            for child in &children {
                map.insert(child.name()?, child.value()?);
            }
            Ok(Value::Object(map))
        }
    }
}
