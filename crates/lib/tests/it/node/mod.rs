//! Node integration tests
//!
//! Organized by area of the node surface: construction, parent/child
//! synchronization, positional indexing, and trap dispatch.

mod construction;
mod sync;
