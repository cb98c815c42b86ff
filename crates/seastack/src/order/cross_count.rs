//! Crossing counters for adjacent row orderings.
//!
//! The two-layer count scans the upper row left to right, projects each edge
//! to its lower-row position, and accumulates inversions in a flat binary
//! tree: O((E + n) log n) per pair, with every buffer drawn from a reused
//! workspace so the scan itself never allocates.

use crate::order::view::LayerView;
use rustc_hash::FxHashMap;
use seastack_dag::LayeredGraph;
use std::collections::BTreeMap;

/// Scratch space for [`count_crossings_idx`], sized to the widest row.
#[derive(Debug, Clone)]
pub struct CrossingWorkspace {
    tree: Vec<u64>,
    lower_pos: Vec<usize>,
    entries: Vec<usize>,
}

impl CrossingWorkspace {
    pub fn new(max_row_width: usize) -> Self {
        let mut first_index = 1usize;
        while first_index < max_row_width.max(1) {
            first_index <<= 1;
        }
        Self {
            tree: vec![0; 2 * first_index - 1],
            lower_pos: vec![0; max_row_width],
            entries: Vec::new(),
        }
    }
}

/// Crossings between two adjacent rows ordered by `upper` and `lower`
/// (permutations of their row-local indices), given the per-source sorted
/// child-index table for the pair.
pub fn count_crossings_idx(
    edges: &[Vec<usize>],
    upper: &[usize],
    lower: &[usize],
    ws: &mut CrossingWorkspace,
) -> u64 {
    if upper.is_empty() || lower.is_empty() {
        return 0;
    }

    let CrossingWorkspace {
        tree,
        lower_pos,
        entries,
    } = ws;

    for (pos, &ix) in lower.iter().enumerate() {
        lower_pos[ix] = pos;
    }

    entries.clear();
    for &u in upper {
        let start = entries.len();
        for &child in &edges[u] {
            entries.push(lower_pos[child]);
        }
        entries[start..].sort_unstable();
    }

    let mut first_index = 1usize;
    while first_index < lower.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let tree = &mut tree[..tree_size];
    tree.fill(0);

    let mut crossings: u64 = 0;
    for &pos in entries.iter() {
        let mut index = pos + first_index;
        tree[index] += 1;
        let mut seen_right: u64 = 0;
        while index > 0 {
            if index % 2 == 1 {
                seen_right += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        crossings += seen_right;
    }
    crossings
}

/// Total crossings of a per-row ordering, summed over adjacent row pairs.
pub fn count_crossings<G: LayeredGraph>(g: &G, orders: &BTreeMap<i32, Vec<String>>) -> u64 {
    let rows = g.row_ids();
    if rows.len() < 2 {
        return 0;
    }

    let view = LayerView::new(g, &rows);
    let mut ws = CrossingWorkspace::new(view.max_row_width());

    let index_orders: Vec<Vec<usize>> = rows
        .iter()
        .map(|&row| {
            let nodes = g.nodes_in_row(row);
            let node_ix: FxHashMap<&str, usize> = nodes
                .iter()
                .enumerate()
                .map(|(i, node)| (node.id.as_str(), i))
                .collect();
            orders
                .get(&row)
                .map(|order| {
                    order
                        .iter()
                        .filter_map(|id| node_ix.get(id.as_str()).copied())
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    let mut total = 0;
    for i in 0..rows.len() - 1 {
        total += count_crossings_idx(
            view.between(i),
            &index_orders[i],
            &index_orders[i + 1],
            &mut ws,
        );
    }
    total
}

/// Crossings contributed by an adjacent pair with `v` immediately left of
/// `w`, against the fixed neighboring row whose positions are `adj_pos`.
/// The transpose refinement compares both orientations of a pair with this.
pub fn count_pair_crossings<G: LayeredGraph>(
    g: &G,
    v: &str,
    w: &str,
    adj_pos: &FxHashMap<String, usize>,
    use_parents: bool,
) -> u64 {
    let v_neighbors = if use_parents { g.parents(v) } else { g.children(v) };
    let w_neighbors = if use_parents { g.parents(w) } else { g.children(w) };

    let mut crossings = 0;
    for a in &v_neighbors {
        let Some(&pos_a) = adj_pos.get(a.as_str()) else {
            continue;
        };
        for b in &w_neighbors {
            if let Some(&pos_b) = adj_pos.get(b.as_str()) {
                if pos_b < pos_a {
                    crossings += 1;
                }
            }
        }
    }
    crossings
}
