use crate::order::barycentric::Barycentric;
use crate::order::optimal::OptimalSearch;
use seastack_dag::LayeredGraph;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Periodic progress observer: (explored, pruned, best score).
pub type ProgressFn = Arc<dyn Fn(u64, u64, u64) + Send + Sync>;

/// One-shot diagnostics observer, called once after the search completes.
pub type DebugFn = Box<dyn FnOnce(DebugInfo) + Send>;

/// Row-ordering strategy.
pub enum Orderer {
    /// Sweep heuristic only.
    Barycentric(Barycentric),
    /// Branch-and-bound search seeded by the heuristic.
    Optimal(OptimalSearch),
}

impl Orderer {
    /// Orders every row of `g`; the result maps each non-empty row id to its
    /// node ids, left to right.
    pub fn order_rows<G: LayeredGraph + Sync>(self, g: &G) -> BTreeMap<i32, Vec<String>> {
        match self {
            Orderer::Barycentric(orderer) => orderer.order_rows(g),
            Orderer::Optimal(orderer) => orderer.order_rows(g),
        }
    }
}

/// Search diagnostics delivered to [`OptimalSearch`]'s debug callback.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub rows: Vec<RowDebugInfo>,
    pub max_depth: usize,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RowDebugInfo {
    pub row: i32,
    pub node_count: usize,
    pub candidates: usize,
}
