//! Row ordering / crossing minimization.
//!
//! A flat layer view feeds a workspace-backed crossing counter; the
//! barycentric sweep produces the initial bound; PQ-tree candidate
//! generation and a parallel branch-and-bound DFS improve on it within a
//! wall-clock deadline.

mod types;
pub use types::{DebugFn, DebugInfo, Orderer, ProgressFn, RowDebugInfo};

mod view;
pub use view::LayerView;

mod cross_count;
pub use cross_count::{
    CrossingWorkspace, count_crossings, count_crossings_idx, count_pair_crossings,
};

mod barycentric;
pub use barycentric::Barycentric;

mod candidates;

mod optimal;
pub use optimal::OptimalSearch;
