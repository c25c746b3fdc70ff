//! Address resolution.
//!
//! A locator is either a string, split on the node's configured delimiter, or
//! a pre-split list of tokens. Resolution walks the tree token by token:
//!
//! - `$root` jumps to the root of the tree.
//! - `$parent` moves to the parent of the current pointer.
//! - `$self` returns to the node resolution started from.
//! - any other token matches an immediate child by name, and failing that is
//!   tried as a selector. The only selector is `find(term, field)`, a
//!   breadth-first search rooted at the current pointer.
//!
//! Resolution from a node with a parent starts at that parent, so siblings are
//! reachable by bare name and a leading `$parent` is redundant (and dropped).
//! Only the first token of the locator counts as leading.
//! Resolution from a root starts at the root itself, after dropping a leading
//! token equal to the root's own name. That makes every node's `address`
//! resolvable from its root.
//!
//! A lookup that runs out of pointer or tokens without a match yields `None`.

use std::collections::VecDeque;

use crate::{
    Result,
    constants::{FIND_SELECTOR, PARENT_TOKEN, ROOT_TOKEN, SELF_TOKEN},
    node::Node,
    search::SearchGoal,
};

/// A path to resolve from a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Joined by the config delimiter.
    Path(String),
    /// Already split.
    Tokens(Vec<String>),
}

impl From<&str> for Locator {
    fn from(path: &str) -> Self {
        Locator::Path(path.to_string())
    }
}

impl From<String> for Locator {
    fn from(path: String) -> Self {
        Locator::Path(path)
    }
}

impl From<Vec<String>> for Locator {
    fn from(tokens: Vec<String>) -> Self {
        Locator::Tokens(tokens)
    }
}

impl From<Vec<&str>> for Locator {
    fn from(tokens: Vec<&str>) -> Self {
        Locator::Tokens(tokens.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Locator {
    fn from(tokens: &[&str]) -> Self {
        Locator::Tokens(tokens.iter().map(|t| t.to_string()).collect())
    }
}

/// Splits a locator into tokens using `node`'s delimiter.
fn tokenize(node: &Node, locator: Locator) -> Result<VecDeque<String>> {
    Ok(match locator {
        Locator::Path(path) => {
            let delimiter = node.config()?.delimiter();
            path.split(delimiter.as_str()).map(String::from).collect()
        }
        Locator::Tokens(tokens) => tokens.into(),
    })
}

/// Resolves `locator` starting from `node`.
pub(crate) fn resolve(node: &Node, locator: Locator) -> Result<Option<Node>> {
    let mut tokens = tokenize(node, locator)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut leads_with_parent = tokens.front().map(String::as_str) == Some(PARENT_TOKEN);
    let mut pointer = match node.parent()? {
        Some(parent) => Some(parent),
        None => {
            if tokens.front() == Some(&node.name()?) {
                tokens.pop_front();
                leads_with_parent = false;
            }
            Some(node.clone())
        }
    };

    if leads_with_parent {
        tokens.pop_front();
    }

    while let Some(current) = pointer.take() {
        let Some(token) = tokens.pop_front() else {
            return Ok(Some(current));
        };
        pointer = match token.as_str() {
            ROOT_TOKEN => Some(node.root()?),
            PARENT_TOKEN => current.parent()?,
            SELF_TOKEN => Some(node.clone()),
            name => match child_named(&current, name)? {
                Some(child) => Some(child),
                None => select(&current, name)?,
            },
        };
    }

    tracing::trace!(from = %node, remaining = tokens.len(), "Address did not resolve");
    Ok(None)
}

fn child_named(pointer: &Node, name: &str) -> Result<Option<Node>> {
    for child in pointer.children() {
        if child.name()? == name {
            return Ok(Some(child));
        }
    }
    Ok(None)
}

/// Splits `verb(args)` into its verb and raw argument string.
fn parse_selector(token: &str) -> Option<(&str, &str)> {
    let open = token.find('(')?;
    let verb = &token[..open];
    if verb.is_empty() || !verb.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let args = token[open + 1..].strip_suffix(')')?;
    Some((verb, args))
}

/// Applies a selector token at `pointer`. Unknown selectors match nothing.
fn select(pointer: &Node, token: &str) -> Result<Option<Node>> {
    let Some((verb, args)) = parse_selector(token) else {
        return Ok(None);
    };
    match verb {
        FIND_SELECTOR => {
            let mut args = args.split(',').map(str::trim);
            let term = args.next().unwrap_or_default();
            let goal = match args.next() {
                Some(field) if !field.is_empty() => SearchGoal::field(field),
                _ => SearchGoal::default(),
            };
            pointer.find(term, goal)
        }
        _ => Ok(None),
    }
}
