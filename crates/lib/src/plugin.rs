//! Plugins applied across a subtree.
//!
//! A [`Plugin`] is a function run once per node. Its identity is the allocation
//! behind the handle: clones of one `Plugin` are the same plugin, two separate
//! `Plugin::new` calls are different plugins even with identical closures.
//!
//! After a plugin runs on a node it decides whether the node's current
//! children are enrolled too, by returning [`Propagate::Descend`] or
//! [`Propagate::Halt`]. Children attached later always inherit the plugin set
//! of their new parent, regardless of what the plugin returned.

use std::{fmt, rc::Rc};

use crate::{Result, node::Node, utils::token};

/// Outcome of applying a plugin to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagate {
    /// Apply the plugin to every current child as well.
    #[default]
    Descend,
    /// Stop here; current children are not enrolled.
    Halt,
}

type PluginFn = dyn Fn(&Node) -> Result<Propagate>;

/// An idempotent function applied once per node.
#[derive(Clone)]
pub struct Plugin {
    label: Rc<str>,
    apply: Rc<PluginFn>,
}

impl Plugin {
    /// Create a plugin that chooses whether to descend into children.
    pub fn new(apply: impl Fn(&Node) -> Result<Propagate> + 'static) -> Self {
        Self {
            label: token().into(),
            apply: Rc::new(apply),
        }
    }

    /// Create a plugin that always descends.
    pub fn from_fn(apply: impl Fn(&Node) + 'static) -> Self {
        Self::new(move |node| {
            apply(node);
            Ok(Propagate::Descend)
        })
    }

    /// Replace the generated label used in logs.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into().into();
        self
    }

    /// Label used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs the plugin against a node.
    pub fn apply(&self, node: &Node) -> Result<Propagate> {
        (self.apply)(node)
    }
}

impl PartialEq for Plugin {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.apply, &other.apply)
    }
}

impl Eq for Plugin {}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("label", &self.label)
            .finish()
    }
}

/// Runs `plugin` on `node` unless it is already recorded there.
pub(crate) fn apply(node: &Node, plugin: &Plugin) -> Result<()> {
    if !node.record_plugin(plugin) {
        tracing::trace!(plugin = plugin.label(), node = %node, "Plugin already applied");
        return Ok(());
    }

    match plugin.apply(node)? {
        Propagate::Descend => {
            for child in node.children() {
                child.use_plugin(plugin)?;
            }
        }
        Propagate::Halt => {
            tracing::debug!(
                plugin = plugin.label(),
                node = %node,
                "Plugin halted propagation to children"
            );
        }
    }
    Ok(())
}
