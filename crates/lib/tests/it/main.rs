/*! Integration tests for formtree.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - node: Construction, parent/child synchronization, indexing, and trap dispatch
 * - commit: The value commit protocol and read-time aggregation
 * - config: Config inheritance, aliasing, and cascading replacement
 * - plugins: Plugin idempotence, propagation, and short-circuiting
 * - hooks: The init/input/commit middleware pipelines on live nodes
 * - address: Address resolution and the selector DSL
 * - search: Breadth-first search
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("formtree=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod hooks;
mod node;
mod search;
