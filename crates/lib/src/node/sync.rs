//! Parent/child synchronization.
//!
//! Keeps the two halves of every edge consistent: a node's parent link points
//! at `p` exactly when the node sits in `p`'s children. Every mutation routes
//! through the public traps of the nodes involved, so an intercepted `parent`
//! setter can redirect an attachment and `add` will follow the redirection.
//! Attaching a node under itself or one of its descendants is refused.

use serde_json::Value;

use super::{
    Node, NodeError, NodeName, NodeType,
    traps::{Op, Reply},
};
use crate::Result;

/// Position of `child` within `parent`'s children.
pub(crate) fn position(parent: &Node, child: &Node) -> Option<usize> {
    parent.ctx().children.iter().position(|c| c == child)
}

/// Fails when `parent` is `child` itself or one of its descendants.
fn ensure_acyclic(op: Op, parent: &Node, child: &Node) -> Result<()> {
    let mut pointer = Some(parent.clone());
    while let Some(node) = pointer {
        if &node == child {
            return Err(NodeError::CyclicAttachment {
                trap: op.to_string(),
                child: child.to_string(),
                parent: parent.to_string(),
            }
            .into());
        }
        pointer = node.parent_link();
    }
    Ok(())
}

/// Attaches `child` to `parent`.
pub(crate) fn add(parent: &Node, child: &Node) -> Result<()> {
    ensure_acyclic(Op::Add, parent, child)?;

    if let Some(current) = child.parent()?
        && &current != parent
    {
        current.remove(child)?;
    }

    if position(parent, child).is_none() {
        parent.ctx_mut().children.push(child.clone());
    }

    if child.parent()?.as_ref() == Some(parent) {
        // Already linked: only plugins registered since need to catch up.
        child.use_plugins(parent.plugins()?)?;
        return Ok(());
    }

    child.set_parent(Some(parent))?;

    // One re-check: if the parent setter sent the child elsewhere, follow it.
    let landed = child.parent()?;
    if landed.as_ref() != Some(parent) {
        tracing::debug!(
            child = %child,
            requested = %parent,
            landed = ?landed.as_ref().map(ToString::to_string),
            "Parent assignment was redirected"
        );
        parent.remove(child)?;
        if let Some(redirected) = landed {
            redirected.add(child)?;
        }
    }
    Ok(())
}

/// Detaches `child` from `parent`. No-op when it is not a child.
pub(crate) fn remove(parent: &Node, child: &Node) -> Result<()> {
    let Some(index) = position(parent, child) else {
        return Ok(());
    };
    parent.ctx_mut().children.remove(index);
    child.set_parent(None)?;
    Ok(())
}

/// Setter behind the `parent` trap.
///
/// Accepts a node or null. Anything else is rejected with `false` rather than
/// an error.
pub(crate) fn set_parent(child: &Node, value: Reply) -> Result<bool> {
    let parent = match value {
        Reply::Node(parent) => parent,
        Reply::Null => {
            child.ctx_mut().parent = None;
            return Ok(true);
        }
        other => {
            tracing::trace!(child = %child, value = ?other, "Rejected parent assignment");
            return Ok(false);
        }
    };
    ensure_acyclic(Op::Parent, &parent, child)?;

    if let Some(current) = child.parent()?
        && current != parent
    {
        current.remove(child)?;
    }

    tracing::debug!(child = %child, parent = %parent, "Setting parent");
    child.ctx_mut().parent = Some(parent.downgrade());
    child.set_config(parent.config()?)?;

    if position(&parent, child).is_none() {
        parent.add(child)?;
    } else {
        child.use_plugins(parent.plugins()?)?;
    }
    Ok(true)
}

/// Getter behind the `index` trap.
pub(crate) fn index(node: &Node) -> Result<Option<usize>> {
    Ok(node.parent()?.and_then(|parent| position(&parent, node)))
}

/// Setter behind the `index` trap.
///
/// Moves the node within its parent's children, clamping the target into
/// `[0, len - 1]`. Returns `false` for a non-numeric value or a detached node.
pub(crate) fn set_index(node: &Node, value: Reply) -> Result<bool> {
    let requested = match value {
        Reply::Index(Some(index)) => i64::try_from(index).unwrap_or(i64::MAX),
        Reply::Value(value) => match numeric(&value) {
            Some(index) => index,
            None => return Ok(false),
        },
        _ => return Ok(false),
    };
    let Some(parent) = node.parent()? else {
        return Ok(false);
    };

    let mut context = parent.ctx_mut();
    let Some(current) = context.children.iter().position(|c| c == node) else {
        return Ok(false);
    };
    let last = i64::try_from(context.children.len() - 1).unwrap_or(i64::MAX);
    let target = requested.clamp(0, last) as usize;
    if target != current {
        let moved = context.children.remove(current);
        context.children.insert(target, moved);
    }
    Ok(true)
}

fn numeric(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            f.is_finite().then(|| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Getter behind the `name` trap.
///
/// Children of a list, and nodes created with the index sentinel, are named by
/// their current position. A detached indexed node has an empty name.
pub(crate) fn name(node: &Node) -> Result<String> {
    let stored = node.ctx().name.clone();
    let indexed = match &stored {
        NodeName::Index => true,
        NodeName::Named(_) => node
            .parent()?
            .is_some_and(|parent| parent.node_type() == NodeType::List),
    };
    if indexed {
        return Ok(node.index()?.map(|i| i.to_string()).unwrap_or_default());
    }
    match stored {
        NodeName::Named(name) => Ok(name),
        NodeName::Index => Ok(String::new()),
    }
}
