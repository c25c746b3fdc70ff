//! Nodes: the addressable, interceptable units of a form tree.
//!
//! A [`Node`] is a cheap-to-clone handle around its private state. Children
//! are owned by their parent; the parent link is a weak back-reference, so a
//! subtree is dropped as soon as it is unreachable from every handle.
//!
//! Every operation a node supports is routed through its per-node
//! [`TrapTable`](traps::TrapTable). The typed methods on `Node` (`add`,
//! `input`, `at`, ...) are thin wrappers over [`Node::dispatch`] and
//! [`Node::assign`], so replacing a trap on one node changes what those
//! methods do on that node.
//!
//! # Example
//!
//! ```
//! use formtree::node::{NodeOptions, NodeType, create_node};
//! use serde_json::json;
//!
//! let form = create_node(NodeOptions::new().name("form").node_type(NodeType::Group))?;
//! let email = create_node(NodeOptions::new().name("email").parent(&form))?;
//! create_node(NodeOptions::new().name("age").parent(&form))?;
//!
//! form.input(json!({"email": "a@b.c", "age": 30}))?;
//! assert_eq!(email.value()?, json!("a@b.c"));
//! assert_eq!(form.value()?, json!({"email": "a@b.c", "age": 30}));
//! assert_eq!(form.at("form.email")?, Some(email));
//! # Ok::<(), formtree::Error>(())
//! ```

use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::{Rc, Weak},
};

use handle_trait::Handle;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Result,
    address::Locator,
    config::{self, ConfigOverrides, SharedConfig},
    hooks::Hooks,
    plugin::Plugin,
    search::SearchGoal,
    utils::{dedupe, token},
};

mod commit;
mod context;
pub mod errors;
mod sync;
pub mod traps;

use context::Context;
pub use errors::NodeError;
pub use traps::{Call, Op, Reply, Trap, TrapTable};

/// The kind of value a node holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A scalar field.
    #[default]
    Input,
    /// An ordered sequence; children are named by position.
    List,
    /// A keyed mapping; children are named by their own names.
    Group,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Input => "input",
            NodeType::List => "list",
            NodeType::Group => "group",
        }
    }

    /// Value a node of this type starts with when none is given.
    pub fn empty_value(self) -> Value {
        match self {
            NodeType::Input => Value::Null,
            NodeType::List => Value::Array(Vec::new()),
            NodeType::Group => Value::Object(serde_json::Map::new()),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored name of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeName {
    Named(String),
    /// Sentinel: the effective name is the node's position in its parent.
    Index,
}

/// Options for [`create_node`].
///
/// Every field is optional. A node without a name gets a random one, unless it
/// is created under a list, in which case it is named by position.
#[derive(Debug, Default)]
pub struct NodeOptions {
    pub name: Option<String>,
    pub node_type: Option<NodeType>,
    pub parent: Option<Node>,
    pub value: Option<Value>,
    pub children: Vec<Node>,
    pub plugins: Vec<Plugin>,
    pub config: Option<ConfigOverrides>,
}

impl NodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    pub fn parent(mut self, parent: &Node) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Adds an initial child. Duplicates are dropped.
    pub fn child(mut self, child: &Node) -> Self {
        self.children = dedupe(self.children, [child.clone()]);
        self
    }

    /// Adds initial children from a sequence or set. Duplicates are dropped.
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children = dedupe(self.children, children);
        self
    }

    pub fn plugin(mut self, plugin: &Plugin) -> Self {
        self.plugins.push(plugin.clone());
        self
    }

    pub fn plugins(mut self, plugins: impl IntoIterator<Item = Plugin>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    /// Sets one config override.
    pub fn config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config
            .get_or_insert_with(ConfigOverrides::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replaces the whole override record.
    pub fn config_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.config = Some(overrides);
        self
    }
}

/// Builds and initializes a node.
///
/// Initialization runs before this returns: the node is attached to its parent
/// (inheriting the parent's plugins), initial children are linked back to it,
/// the requested plugins are applied, and the `init` hook is dispatched. The
/// node returned is whatever the `init` pipeline produced.
pub fn create_node(options: NodeOptions) -> Result<Node> {
    let NodeOptions {
        name,
        node_type,
        parent,
        value,
        children,
        plugins,
        config,
    } = options;

    let node_type = node_type.unwrap_or_default();
    let parent_config = parent.as_ref().map(Node::config).transpose()?;
    let config = config::inherit(parent_config, config.as_ref())?;
    let name = match &parent {
        Some(parent) if parent.node_type() == NodeType::List => NodeName::Index,
        _ => NodeName::Named(name.unwrap_or_else(token)),
    };

    let node = Node::from_context(Context {
        children: dedupe(Vec::new(), children),
        config,
        hooks: Rc::new(Hooks::new()),
        name,
        parent: parent.as_ref().map(Node::downgrade),
        plugins: Vec::new(),
        traps: TrapTable::new(),
        node_type,
        value: value.unwrap_or_else(|| node_type.empty_value()),
    });

    init(node, plugins)
}

fn init(node: Node, plugins: Vec<Plugin>) -> Result<Node> {
    if let Some(parent) = node.parent()? {
        parent.add(&node)?;
    }
    for child in node.children() {
        child.set_parent(Some(&node))?;
    }
    if !plugins.is_empty() {
        node.use_plugins(plugins)?;
    }
    let hooks = node.hooks();
    Ok(hooks.init.dispatch(node))
}

/// Handle to a node in a form tree.
///
/// Clones share the same node. Equality is identity.
#[derive(Clone, Handle)]
pub struct Node {
    inner: Rc<RefCell<Context>>,
}

/// Non-owning handle to a node.
#[derive(Clone, Handle)]
pub struct WeakNode {
    inner: Weak<RefCell<Context>>,
}

impl WeakNode {
    /// Converts back to a [`Node`] if it is still alive.
    pub fn upgrade(&self) -> Option<Node> {
        self.inner.upgrade().map(|inner| Node { inner })
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakNode")
    }
}

impl Node {
    fn from_context(context: Context) -> Self {
        Self {
            inner: Rc::new(RefCell::new(context)),
        }
    }

    pub(crate) fn ctx(&self) -> Ref<'_, Context> {
        self.inner.borrow()
    }

    pub(crate) fn ctx_mut(&self) -> RefMut<'_, Context> {
        self.inner.borrow_mut()
    }

    /// Parent link read straight from state, bypassing the `parent` trap.
    pub(crate) fn parent_link(&self) -> Option<Node> {
        self.ctx().parent.as_ref().and_then(WeakNode::upgrade)
    }

    /// Records a plugin; false when it was already recorded.
    pub(crate) fn record_plugin(&self, plugin: &Plugin) -> bool {
        let mut context = self.ctx_mut();
        if context.plugins.contains(plugin) {
            return false;
        }
        context.plugins.push(plugin.clone());
        true
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn node_type(&self) -> NodeType {
        self.ctx().node_type
    }

    /// Snapshot of the current children, in order.
    pub fn children(&self) -> Vec<Node> {
        self.ctx().children.clone()
    }

    /// The node's middleware pipelines.
    pub fn hooks(&self) -> Rc<Hooks> {
        Rc::clone(&self.ctx().hooks)
    }

    /// True when the node has no live parent.
    pub fn is_root(&self) -> bool {
        self.parent_link().is_none()
    }

    // ----- dynamic surface -----

    /// Looks up a trap in this node's table.
    pub fn trap(&self, op: Op) -> Result<Trap> {
        self.ctx().traps.get(op).ok_or_else(|| {
            NodeError::UndefinedTrap {
                trap: op.to_string(),
            }
            .into()
        })
    }

    /// Replaces one trap on this node only, returning the previous one.
    pub fn intercept(&self, op: Op, trap: Trap) -> Option<Trap> {
        tracing::debug!(node = %self, trap = %op, "Intercepting trap");
        self.ctx_mut().traps.insert(op, trap)
    }

    /// Removes a trap; later calls to it fail with `UndefinedTrap`.
    pub fn revoke(&self, op: Op) -> Option<Trap> {
        tracing::debug!(node = %self, trap = %op, "Revoking trap");
        self.ctx_mut().traps.remove(op)
    }

    /// Runs a trap's getter.
    pub fn dispatch(&self, op: Op, call: Call<'_>) -> Result<Reply> {
        let trap = self.trap(op)?;
        trap.get(self, call)
    }

    /// Writes through a trap's setter.
    ///
    /// Fails with `DeniedMutation` when the trap is read-only. A setter may
    /// also decline the value by returning `Ok(false)`.
    pub fn assign(&self, op: Op, value: Reply) -> Result<bool> {
        let trap = self.trap(op)?;
        trap.set(op, self, value)
    }

    // ----- typed operations -----

    /// Attaches `child`, detaching it from any previous parent. Returns `self`.
    pub fn add(&self, child: &Node) -> Result<Node> {
        self.dispatch(Op::Add, Call::Node(child.clone()))?
            .into_node(Op::Add)
    }

    /// Detaches `child` if present. Returns `self`.
    pub fn remove(&self, child: &Node) -> Result<Node> {
        self.dispatch(Op::Remove, Call::Node(child.clone()))?
            .into_node(Op::Remove)
    }

    /// Resolves an address relative to this node. `None` when nothing matches.
    pub fn at(&self, locator: impl Into<Locator>) -> Result<Option<Node>> {
        self.dispatch(Op::At, Call::Locator(locator.into()))?
            .into_maybe_node(Op::At)
    }

    /// Names from the root down to this node.
    pub fn address(&self) -> Result<Vec<String>> {
        self.dispatch(Op::Address, Call::None)?
            .into_address(Op::Address)
    }

    pub fn config(&self) -> Result<SharedConfig> {
        self.dispatch(Op::Config, Call::None)?
            .into_config(Op::Config)
    }

    /// Position within the parent's children; `None` for a detached node.
    pub fn index(&self) -> Result<Option<usize>> {
        self.dispatch(Op::Index, Call::None)?.into_index(Op::Index)
    }

    /// Moves this node within its parent, clamping into range.
    pub fn set_index(&self, index: i64) -> Result<bool> {
        self.assign(Op::Index, Reply::Value(Value::from(index)))
    }

    /// Commits a value to this node and its matching descendants.
    pub fn input(&self, value: impl Into<Value>) -> Result<()> {
        self.dispatch(Op::Input, Call::Value(value.into()))?
            .into_unit(Op::Input)
    }

    /// Visits each immediate child.
    pub fn each(&self, mut visitor: impl FnMut(&Node) -> Result<()>) -> Result<()> {
        self.dispatch(Op::Each, Call::Visitor(&mut visitor))?
            .into_unit(Op::Each)
    }

    /// Breadth-first search of this subtree, including this node.
    pub fn find(
        &self,
        term: impl Into<String>,
        goal: impl Into<SearchGoal>,
    ) -> Result<Option<Node>> {
        let call = Call::Search {
            term: term.into(),
            goal: goal.into(),
        };
        self.dispatch(Op::Find, call)?.into_maybe_node(Op::Find)
    }

    pub fn parent(&self) -> Result<Option<Node>> {
        self.dispatch(Op::Parent, Call::None)?
            .into_maybe_node(Op::Parent)
    }

    /// Attaches to `parent`, or detaches with `None`.
    pub fn set_parent(&self, parent: Option<&Node>) -> Result<bool> {
        self.assign(Op::Parent, Reply::from(parent.cloned()))
    }

    /// Plugins applied to this node, in application order.
    pub fn plugins(&self) -> Result<Vec<Plugin>> {
        self.dispatch(Op::Plugins, Call::None)?
            .into_plugins(Op::Plugins)
    }

    pub fn root(&self) -> Result<Node> {
        self.dispatch(Op::Root, Call::None)?.into_node(Op::Root)
    }

    /// Points this node and its whole subtree at `config`.
    pub fn set_config(&self, config: SharedConfig) -> Result<()> {
        self.dispatch(Op::SetConfig, Call::Config(config))?
            .into_unit(Op::SetConfig)
    }

    /// Applies a plugin here and, unless it halts, to current descendants.
    pub fn use_plugin(&self, plugin: &Plugin) -> Result<Node> {
        self.use_plugins([plugin.clone()])
    }

    /// Applies each plugin of a sequence or set in turn.
    pub fn use_plugins(&self, plugins: impl IntoIterator<Item = Plugin>) -> Result<Node> {
        let plugins = plugins.into_iter().collect();
        self.dispatch(Op::Use, Call::Plugins(plugins))?
            .into_node(Op::Use)
    }

    pub fn name(&self) -> Result<String> {
        self.dispatch(Op::Name, Call::None)?.into_text(Op::Name)
    }

    /// Visits every descendant, depth-first, pre-order.
    pub fn walk(&self, mut visitor: impl FnMut(&Node) -> Result<()>) -> Result<()> {
        self.dispatch(Op::Walk, Call::Visitor(&mut visitor))?
            .into_unit(Op::Walk)
    }

    /// Current value; aggregated from children when there are any.
    pub fn value(&self) -> Result<Value> {
        self.dispatch(Op::Value, Call::None)?.into_value(Op::Value)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

// Used in log fields, so it reads state directly and never panics on a
// borrowed context.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(context) = self.inner.try_borrow() else {
            return f.write_str("<busy>");
        };
        let parent = context.parent.as_ref().and_then(WeakNode::upgrade);
        let placement = parent.as_ref().and_then(|p| {
            p.inner.try_borrow().ok().map(|pc| {
                (
                    pc.node_type == NodeType::List,
                    pc.children.iter().position(|c| c == self),
                )
            })
        });
        let in_list = placement.is_some_and(|(is_list, _)| is_list);
        match &context.name {
            NodeName::Named(name) if !in_list => f.write_str(name),
            _ => match placement.and_then(|(_, index)| index) {
                Some(index) => write!(f, "{index}"),
                None => Ok(()),
            },
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(context) => f
                .debug_struct("Node")
                .field("name", &context.name)
                .field("type", &context.node_type)
                .field("children", &context.children.len())
                .field("value", &context.value)
                .finish(),
            Err(_) => f.write_str("Node { <borrowed> }"),
        }
    }
}
