//! Breadth-first search over a subtree.
//!
//! The search visits the subtree root first, then its children in stored
//! order, then their children, and so on. The first node satisfying the goal
//! wins, so a shallow match always beats a deeper one regardless of which
//! branch it sits in.

use std::{collections::VecDeque, fmt, rc::Rc};

use serde_json::Value;

use crate::{
    Result,
    constants::DEFAULT_SEARCH_FIELD,
    node::Node,
    utils::loose_eq,
};

type Predicate = dyn Fn(&Node, &str) -> bool;

/// How a visited node is compared against the search term.
#[derive(Clone)]
pub enum SearchGoal {
    /// Compare a named field (`name`, `type`, `index`, `value`, `address`)
    /// against the term by string form.
    Field(String),
    /// Custom test receiving the node and the term.
    Predicate(Rc<Predicate>),
}

impl SearchGoal {
    pub fn field(name: impl Into<String>) -> Self {
        SearchGoal::Field(name.into())
    }

    pub fn predicate(test: impl Fn(&Node, &str) -> bool + 'static) -> Self {
        SearchGoal::Predicate(Rc::new(test))
    }

    fn matches(&self, node: &Node, term: &str) -> Result<bool> {
        match self {
            SearchGoal::Field(field) => {
                let value = field_value(node, field)?;
                Ok(value.is_some_and(|value| loose_eq(&value, term)))
            }
            SearchGoal::Predicate(test) => Ok(test(node, term)),
        }
    }
}

impl Default for SearchGoal {
    fn default() -> Self {
        SearchGoal::Field(DEFAULT_SEARCH_FIELD.to_string())
    }
}

impl From<&str> for SearchGoal {
    fn from(field: &str) -> Self {
        SearchGoal::field(field)
    }
}

impl From<String> for SearchGoal {
    fn from(field: String) -> Self {
        SearchGoal::Field(field)
    }
}

impl fmt::Debug for SearchGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchGoal::Field(field) => f.debug_tuple("Field").field(field).finish(),
            SearchGoal::Predicate(_) => f.write_str("Predicate(<fn>)"),
        }
    }
}

/// Reads the field a [`SearchGoal::Field`] compares. Unknown fields read as absent.
fn field_value(node: &Node, field: &str) -> Result<Option<Value>> {
    Ok(match field {
        "name" => Some(Value::String(node.name()?)),
        "type" => Some(Value::String(node.node_type().to_string())),
        "index" => node.index()?.map(Value::from),
        "value" => Some(node.value()?),
        "address" => {
            let delimiter = node.config()?.delimiter();
            Some(Value::String(node.address()?.join(&delimiter)))
        }
        _ => None,
    })
}

/// Returns the first node in level order under `tree` that satisfies `goal`.
pub fn bfs(tree: &Node, term: &str, goal: &SearchGoal) -> Result<Option<Node>> {
    let mut queue = VecDeque::from([tree.clone()]);
    while let Some(node) = queue.pop_front() {
        tracing::trace!(node = %node, term, "BFS visit");
        if goal.matches(&node, term)? {
            return Ok(Some(node));
        }
        queue.extend(node.children());
    }
    Ok(None)
}
