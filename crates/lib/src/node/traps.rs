//! The per-node operation table.
//!
//! Every operation on a [`Node`] is looked up by name in the node's
//! [`TrapTable`] at call time. A [`Trap`] pairs a getter, which either reads a
//! property or performs the operation with the supplied [`Call`] arguments,
//! with an optional setter. Writing through a trap without a setter fails with
//! [`NodeError::DeniedMutation`].
//!
//! Tables are per node, so a single node can have one of its traps replaced
//! (to decorate or block an operation) without affecting any other node:
//!
//! ```
//! use formtree::NodeError;
//! use formtree::node::{NodeOptions, Op, Trap, create_node};
//!
//! let node = create_node(NodeOptions::new().name("locked"))?;
//! node.intercept(
//!     Op::Input,
//!     Trap::new(|_, _| {
//!         Err(NodeError::Intercepted {
//!             trap: "input".to_string(),
//!             reason: "field is locked".to_string(),
//!         }
//!         .into())
//!     }),
//! );
//! assert!(node.input(1).is_err());
//! # Ok::<(), formtree::Error>(())
//! ```

use std::{collections::HashMap, fmt, rc::Rc, str::FromStr};

use serde_json::Value;

use super::{Node, NodeError, commit, sync};
use crate::{
    Result,
    address::{self, Locator},
    config::SharedConfig,
    plugin::{self, Plugin},
    search::{self, SearchGoal},
    utils::normalize_set,
};

/// Names of the operations a node exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Remove,
    At,
    Address,
    Config,
    Index,
    Input,
    Each,
    Find,
    Parent,
    Plugins,
    Root,
    SetConfig,
    Use,
    Name,
    Walk,
    Value,
}

impl Op {
    /// Every operation, in table order.
    pub const ALL: [Op; 17] = [
        Op::Add,
        Op::Remove,
        Op::At,
        Op::Address,
        Op::Config,
        Op::Index,
        Op::Input,
        Op::Each,
        Op::Find,
        Op::Parent,
        Op::Plugins,
        Op::Root,
        Op::SetConfig,
        Op::Use,
        Op::Name,
        Op::Walk,
        Op::Value,
    ];

    /// The runtime name of the operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Remove => "remove",
            Op::At => "at",
            Op::Address => "address",
            Op::Config => "config",
            Op::Index => "index",
            Op::Input => "input",
            Op::Each => "each",
            Op::Find => "find",
            Op::Parent => "parent",
            Op::Plugins => "plugins",
            Op::Root => "root",
            Op::SetConfig => "setConfig",
            Op::Use => "use",
            Op::Name => "name",
            Op::Walk => "walk",
            Op::Value => "value",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = NodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Op::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| NodeError::UndefinedTrap {
                trap: s.to_string(),
            })
    }
}

/// Arguments handed to a trap's getter.
pub enum Call<'a> {
    /// Property reads take no arguments.
    None,
    Node(Node),
    Value(Value),
    Locator(Locator),
    Config(SharedConfig),
    Plugins(Vec<Plugin>),
    Visitor(&'a mut dyn FnMut(&Node) -> Result<()>),
    Search { term: String, goal: SearchGoal },
}

impl Call<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Call::None => "none",
            Call::Node(_) => "node",
            Call::Value(_) => "value",
            Call::Locator(_) => "locator",
            Call::Config(_) => "config",
            Call::Plugins(_) => "plugins",
            Call::Visitor(_) => "visitor",
            Call::Search { .. } => "search",
        }
    }
}

impl fmt::Debug for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Call::{}", self.kind())
    }
}

/// What a trap's getter produced, and what a setter accepts.
#[derive(Debug, Clone)]
pub enum Reply {
    Unit,
    /// An absent node: a root's parent, a failed lookup, or a cleared assignment.
    Null,
    Node(Node),
    Value(Value),
    Text(String),
    Index(Option<usize>),
    Address(Vec<String>),
    Config(SharedConfig),
    Plugins(Vec<Plugin>),
}

impl From<Option<Node>> for Reply {
    fn from(node: Option<Node>) -> Self {
        node.map_or(Reply::Null, Reply::Node)
    }
}

fn unexpected(op: Op, expected: &str) -> crate::Error {
    NodeError::UnexpectedReply {
        trap: op.to_string(),
        expected: expected.to_string(),
    }
    .into()
}

impl Reply {
    pub fn into_unit(self, op: Op) -> Result<()> {
        match self {
            Reply::Unit => Ok(()),
            _ => Err(unexpected(op, "unit")),
        }
    }

    pub fn into_node(self, op: Op) -> Result<Node> {
        match self {
            Reply::Node(node) => Ok(node),
            _ => Err(unexpected(op, "a node")),
        }
    }

    pub fn into_maybe_node(self, op: Op) -> Result<Option<Node>> {
        match self {
            Reply::Node(node) => Ok(Some(node)),
            Reply::Null => Ok(None),
            _ => Err(unexpected(op, "a node or null")),
        }
    }

    pub fn into_value(self, op: Op) -> Result<Value> {
        match self {
            Reply::Value(value) => Ok(value),
            _ => Err(unexpected(op, "a value")),
        }
    }

    pub fn into_text(self, op: Op) -> Result<String> {
        match self {
            Reply::Text(text) => Ok(text),
            _ => Err(unexpected(op, "text")),
        }
    }

    pub fn into_index(self, op: Op) -> Result<Option<usize>> {
        match self {
            Reply::Index(index) => Ok(index),
            _ => Err(unexpected(op, "an index")),
        }
    }

    pub fn into_address(self, op: Op) -> Result<Vec<String>> {
        match self {
            Reply::Address(address) => Ok(address),
            _ => Err(unexpected(op, "an address")),
        }
    }

    pub fn into_config(self, op: Op) -> Result<SharedConfig> {
        match self {
            Reply::Config(config) => Ok(config),
            _ => Err(unexpected(op, "a config")),
        }
    }

    pub fn into_plugins(self, op: Op) -> Result<Vec<Plugin>> {
        match self {
            Reply::Plugins(plugins) => Ok(plugins),
            _ => Err(unexpected(op, "a plugin list")),
        }
    }
}

/// Getter half of a trap.
pub type Getter = Rc<dyn for<'a> Fn(&Node, Call<'a>) -> Result<Reply>>;

/// Setter half of a trap. Returns whether the write was accepted.
pub type Setter = Rc<dyn Fn(&Node, Reply) -> Result<bool>>;

/// A getter/setter pair; one entry of a node's operation table.
#[derive(Clone)]
pub struct Trap {
    get: Getter,
    set: Option<Setter>,
}

impl Trap {
    /// Create a trap with only a getter. Writes through it are denied.
    pub fn new<F>(get: F) -> Self
    where
        F: for<'a> Fn(&Node, Call<'a>) -> Result<Reply> + 'static,
    {
        Self {
            get: Rc::new(get),
            set: None,
        }
    }

    /// Create a read-only trap that ignores its arguments.
    pub fn property(read: impl Fn(&Node) -> Result<Reply> + 'static) -> Self {
        Self::new(move |node, _| read(node))
    }

    /// Attach a setter.
    pub fn with_setter(mut self, set: impl Fn(&Node, Reply) -> Result<bool> + 'static) -> Self {
        self.set = Some(Rc::new(set));
        self
    }

    /// Check whether writes through this trap are allowed.
    pub fn has_setter(&self) -> bool {
        self.set.is_some()
    }

    /// Runs the getter.
    pub fn get(&self, node: &Node, call: Call<'_>) -> Result<Reply> {
        (self.get)(node, call)
    }

    /// Runs the setter, or fails with `DeniedMutation` when there is none.
    pub fn set(&self, op: Op, node: &Node, value: Reply) -> Result<bool> {
        match &self.set {
            Some(set) => set(node, value),
            None => Err(NodeError::DeniedMutation {
                trap: op.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Debug for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trap")
            .field("setter", &self.has_setter())
            .finish()
    }
}

/// A node's operation table.
#[derive(Debug, Clone)]
pub struct TrapTable {
    traps: HashMap<Op, Trap>,
}

impl TrapTable {
    /// Create a table holding the built-in behavior for every operation.
    pub fn new() -> Self {
        Self { traps: defaults() }
    }

    /// Create a table with no traps at all.
    pub fn empty() -> Self {
        Self {
            traps: HashMap::new(),
        }
    }

    pub fn get(&self, op: Op) -> Option<Trap> {
        self.traps.get(&op).cloned()
    }

    /// Installs a trap, returning the one it replaced.
    pub fn insert(&mut self, op: Op, trap: Trap) -> Option<Trap> {
        self.traps.insert(op, trap)
    }

    pub fn remove(&mut self, op: Op) -> Option<Trap> {
        self.traps.remove(&op)
    }

    pub fn contains(&self, op: Op) -> bool {
        self.traps.contains_key(&op)
    }

    pub fn len(&self) -> usize {
        self.traps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }
}

impl Default for TrapTable {
    fn default() -> Self {
        Self::new()
    }
}

fn arguments(op: Op, expected: &str, got: &Call<'_>) -> crate::Error {
    NodeError::UnexpectedArguments {
        trap: op.to_string(),
        expected: format!("{expected} (got {})", got.kind()),
    }
    .into()
}

fn defaults() -> HashMap<Op, Trap> {
    let mut traps = HashMap::with_capacity(Op::ALL.len());

    traps.insert(
        Op::Add,
        Trap::new(|node, call| match call {
            Call::Node(child) => {
                sync::add(node, &child)?;
                Ok(Reply::Node(node.clone()))
            }
            other => Err(arguments(Op::Add, "node", &other)),
        }),
    );
    traps.insert(
        Op::Remove,
        Trap::new(|node, call| match call {
            Call::Node(child) => {
                sync::remove(node, &child)?;
                Ok(Reply::Node(node.clone()))
            }
            other => Err(arguments(Op::Remove, "node", &other)),
        }),
    );
    traps.insert(
        Op::At,
        Trap::new(|node, call| match call {
            Call::Locator(locator) => address::resolve(node, locator).map(Reply::from),
            other => Err(arguments(Op::At, "locator", &other)),
        }),
    );
    traps.insert(
        Op::Address,
        Trap::property(|node| {
            let mut address = match node.parent()? {
                Some(parent) => parent.address()?,
                None => Vec::new(),
            };
            address.push(node.name()?);
            Ok(Reply::Address(address))
        }),
    );
    traps.insert(
        Op::Config,
        Trap::property(|node| Ok(Reply::Config(node.ctx().config.clone()))),
    );
    traps.insert(
        Op::Index,
        Trap::property(|node| Ok(Reply::Index(sync::index(node)?)))
            .with_setter(sync::set_index),
    );
    traps.insert(
        Op::Input,
        Trap::new(|node, call| match call {
            Call::Value(value) => {
                commit::input(node, value)?;
                Ok(Reply::Unit)
            }
            other => Err(arguments(Op::Input, "value", &other)),
        }),
    );
    traps.insert(
        Op::Each,
        Trap::new(|node, call| match call {
            Call::Visitor(visitor) => {
                for child in node.children() {
                    visitor(&child)?;
                }
                Ok(Reply::Unit)
            }
            other => Err(arguments(Op::Each, "visitor", &other)),
        }),
    );
    traps.insert(
        Op::Find,
        Trap::new(|node, call| match call {
            Call::Search { term, goal } => search::bfs(node, &term, &goal).map(Reply::from),
            other => Err(arguments(Op::Find, "search", &other)),
        }),
    );
    traps.insert(
        Op::Parent,
        Trap::property(|node| Ok(Reply::from(node.parent_link())))
            .with_setter(sync::set_parent),
    );
    traps.insert(
        Op::Plugins,
        Trap::property(|node| Ok(Reply::Plugins(node.ctx().plugins.clone()))),
    );
    traps.insert(
        Op::Root,
        Trap::property(|node| {
            let mut pointer = node.clone();
            while let Some(parent) = pointer.parent()? {
                pointer = parent;
            }
            Ok(Reply::Node(pointer))
        }),
    );
    traps.insert(
        Op::SetConfig,
        Trap::new(|node, call| match call {
            Call::Config(config) => {
                let children = node.children();
                tracing::debug!(node = %node, children = children.len(), "Cascading config");
                node.ctx_mut().config = config.clone();
                for child in children {
                    child.set_config(config.clone())?;
                }
                Ok(Reply::Unit)
            }
            other => Err(arguments(Op::SetConfig, "config", &other)),
        }),
    );
    traps.insert(
        Op::Use,
        Trap::new(|node, call| match call {
            Call::Plugins(plugins) => {
                for plugin in normalize_set(plugins) {
                    plugin::apply(node, &plugin)?;
                }
                Ok(Reply::Node(node.clone()))
            }
            other => Err(arguments(Op::Use, "plugins", &other)),
        }),
    );
    traps.insert(
        Op::Name,
        Trap::property(|node| Ok(Reply::Text(sync::name(node)?))),
    );
    traps.insert(
        Op::Walk,
        Trap::new(|node, call| match call {
            Call::Visitor(visitor) => {
                for child in node.children() {
                    visitor(&child)?;
                    child.dispatch(Op::Walk, Call::Visitor(&mut *visitor))?;
                }
                Ok(Reply::Unit)
            }
            other => Err(arguments(Op::Walk, "visitor", &other)),
        }),
    );
    traps.insert(
        Op::Value,
        Trap::property(|node| commit::value(node).map(Reply::Value)),
    );

    traps
}
