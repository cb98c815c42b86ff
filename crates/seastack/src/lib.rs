//! Crossing-minimizing row ordering for layered DAGs.
//!
//! Given a graph whose nodes carry row assignments and whose edges span
//! exactly one row, `seastack` assigns a left-to-right order to every row so
//! that edges between adjacent rows cross as little as possible. A
//! barycentric sweep produces the initial bound; a parallel branch-and-bound
//! search over PQ-tree-admissible permutations improves on it within a
//! wall-clock budget and always returns the best ordering seen.

pub use seastack_dag as dag;

pub mod order;
pub mod perm;

pub use order::{
    Barycentric, CrossingWorkspace, DebugFn, DebugInfo, OptimalSearch, Orderer, ProgressFn,
    RowDebugInfo, count_crossings,
};
