//! PQ-tree candidate generation for one row under a fixed previous row.
//!
//! Each parent in the previous row pins its children to a contiguous block,
//! and each node in the next row pins its parents likewise. Whatever
//! survives those reductions is enumerated (exactly for narrow rows, up to
//! the per-row budget otherwise) and ranked by barycenter deviation so the
//! search tries the most promising orderings first. If the constraints turn
//! out inconsistent, the row falls back to unconstrained permutations.

use crate::perm::{self, PqTree};
use rustc_hash::FxHashMap;
use seastack_dag::{LayeredGraph, Node};

const MAX_CANDIDATES_BASE: usize = 10_000;

/// Exhaustive-enumeration cutoff: at or below this width a row's admissible
/// orderings are enumerated exactly.
pub(crate) const EXHAUSTIVE_WIDTH: usize = 8;

/// Per-row candidate budget: generous for shallow towers, tighter as the
/// row count grows.
pub(crate) fn candidate_limit(num_rows: usize) -> usize {
    if num_rows <= 3 {
        return MAX_CANDIDATES_BASE;
    }
    (MAX_CANDIDATES_BASE / num_rows).clamp(100, 1000)
}

/// Admissible orderings of the row at `depth`, sorted by barycenter
/// deviation against the fixed previous-row order.
pub(crate) fn generate_candidates<G: LayeredGraph>(
    g: &G,
    rows: &[i32],
    row_nodes: &FxHashMap<i32, Vec<&Node>>,
    depth: usize,
    prev_order: &[usize],
    cand_limit: usize,
) -> Vec<Vec<usize>> {
    let nodes = &row_nodes[&rows[depth]];
    let n = nodes.len();
    if n <= 1 {
        return vec![perm::seq(n)];
    }

    let node_ix = build_node_index(nodes);
    let prev_nodes = &row_nodes[&rows[depth - 1]];

    let mut tree = PqTree::new(n);
    let reduced = apply_parent_constraints(g, &mut tree, &node_ix, rows[depth], prev_order, prev_nodes)
        && apply_child_constraints(g, &mut tree, &node_ix, rows, row_nodes, depth);

    let mut candidates = if reduced {
        let limit = if n <= EXHAUSTIVE_WIDTH {
            tree.valid_count() as usize
        } else {
            cand_limit
        };
        tree.enumerate(limit)
    } else {
        Vec::new()
    };

    if candidates.is_empty() {
        candidates = fallback_permutations(n, cand_limit);
    }

    let prev_pos = prev_positions(prev_nodes, prev_order);
    sort_by_barycenter(g, nodes, &mut candidates, &prev_pos);
    candidates
}

fn apply_parent_constraints<G: LayeredGraph>(
    g: &G,
    tree: &mut PqTree,
    node_ix: &FxHashMap<String, usize>,
    row: i32,
    prev_order: &[usize],
    prev_nodes: &[&Node],
) -> bool {
    for &ix in prev_order {
        let children = g.children_in_row(&prev_nodes[ix].id, row);
        let constraint = ids_to_indices(&children, node_ix);
        if constraint.len() >= 2 && !tree.reduce(&constraint) {
            return false;
        }
    }
    true
}

fn apply_child_constraints<G: LayeredGraph>(
    g: &G,
    tree: &mut PqTree,
    node_ix: &FxHashMap<String, usize>,
    rows: &[i32],
    row_nodes: &FxHashMap<i32, Vec<&Node>>,
    depth: usize,
) -> bool {
    if depth + 1 >= rows.len() {
        return true;
    }
    let row = rows[depth];
    for child in &row_nodes[&rows[depth + 1]] {
        let parents = g.parents_in_row(&child.id, row);
        let constraint = ids_to_indices(&parents, node_ix);
        if constraint.len() >= 2 && !tree.reduce(&constraint) {
            return false;
        }
    }
    true
}

fn fallback_permutations(n: usize, cand_limit: usize) -> Vec<Vec<usize>> {
    if n <= EXHAUSTIVE_WIDTH {
        perm::generate(n, 0)
    } else {
        perm::generate(n, cand_limit)
    }
}

fn build_node_index(nodes: &[&Node]) -> FxHashMap<String, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.clone(), i))
        .collect()
}

fn ids_to_indices(ids: &[String], node_ix: &FxHashMap<String, usize>) -> Vec<usize> {
    ids.iter()
        .filter_map(|id| node_ix.get(id.as_str()).copied())
        .collect()
}

fn prev_positions(prev_nodes: &[&Node], prev_order: &[usize]) -> FxHashMap<String, usize> {
    prev_order
        .iter()
        .enumerate()
        .map(|(pos, &ix)| (prev_nodes[ix].id.clone(), pos))
        .collect()
}

/// Stable ascending sort by deviation, so ties keep enumeration order (and
/// with it the row-local index tie-break).
fn sort_by_barycenter<G: LayeredGraph>(
    g: &G,
    nodes: &[&Node],
    candidates: &mut Vec<Vec<usize>>,
    prev_pos: &FxHashMap<String, usize>,
) {
    let mut scored: Vec<(f64, Vec<usize>)> = candidates
        .drain(..)
        .map(|candidate| {
            (
                barycenter_deviation(g, nodes, &candidate, prev_pos),
                candidate,
            )
        })
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    candidates.extend(scored.into_iter().map(|(_, candidate)| candidate));
}

/// Sum over positions of how far each node sits from the mean position of
/// its parents in the fixed previous row.
fn barycenter_deviation<G: LayeredGraph>(
    g: &G,
    nodes: &[&Node],
    candidate: &[usize],
    prev_pos: &FxHashMap<String, usize>,
) -> f64 {
    let mut deviation = 0.0;
    for (pos, &ix) in candidate.iter().enumerate() {
        let mut sum = 0.0;
        let mut count = 0u32;
        for parent in g.parents(&nodes[ix].id) {
            if let Some(&p) = prev_pos.get(parent.as_str()) {
                sum += p as f64;
                count += 1;
            }
        }
        if count > 0 {
            deviation += (pos as f64 - sum / f64::from(count)).abs();
        }
    }
    deviation
}
