//! Constants used throughout the formtree library.
//!
//! This module provides central definitions for the reserved address tokens
//! and the defaults that seed a root node's configuration.

/// Delimiter used to split address strings when no override is configured.
pub const DEFAULT_DELIMITER: &str = ".";

/// Config key holding the address delimiter.
pub const DELIMITER_KEY: &str = "delimiter";

/// Address token that jumps to the root of the tree.
pub const ROOT_TOKEN: &str = "$root";

/// Address token that moves to the parent of the current pointer.
pub const PARENT_TOKEN: &str = "$parent";

/// Address token that resets the pointer to the node resolution started from.
pub const SELF_TOKEN: &str = "$self";

/// Selector verb delegating to a breadth-first search, as in `find(term, field)`.
pub const FIND_SELECTOR: &str = "find";

/// Field compared by breadth-first search when no goal is given.
pub const DEFAULT_SEARCH_FIELD: &str = "name";
