//! Weighted-median sweep with adjacent-transpose refinement.
//!
//! Seeds row 0 lexicographically and every later row by minimum parent
//! position, then alternates parent-fixed and child-fixed median passes,
//! swapping adjacent pairs whenever that lowers their local crossing
//! contribution. The best ordering across passes becomes the result, and
//! the branch-and-bound solver's initial bound.

use crate::order::cross_count::{count_crossings, count_pair_crossings};
use rustc_hash::FxHashMap;
use seastack_dag::{LayeredGraph, Node, node_ids, pos_map};
use std::collections::BTreeMap;

const DEFAULT_PASSES: usize = 24;

pub(crate) type Orders = BTreeMap<i32, Vec<String>>;

/// Sweep-based heuristic orderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Barycentric {
    /// Number of median passes; 0 means the default of 24.
    pub passes: usize,
}

impl Barycentric {
    pub fn order_rows<G: LayeredGraph>(&self, g: &G) -> Orders {
        let rows = g.row_ids();
        if rows.is_empty() {
            return Orders::new();
        }

        let passes = if self.passes == 0 {
            DEFAULT_PASSES
        } else {
            self.passes
        };

        let row_nodes: FxHashMap<i32, Vec<&Node>> =
            rows.iter().map(|&row| (row, g.nodes_in_row(row))).collect();

        let mut best = init_orders(g, &rows, &row_nodes);
        let mut best_score = count_crossings(g, &best);
        if best_score == 0 {
            return best;
        }

        let (orders, score) = run_passes(g, &rows, best.clone(), passes);
        if score < best_score {
            best = orders;
            best_score = score;
            if best_score == 0 {
                return best;
            }
        }

        let (orders, score) = run_passes(g, &rows, reverse_orders(&best, &rows), passes);
        if score < best_score {
            return orders;
        }
        best
    }
}

fn run_passes<G: LayeredGraph>(g: &G, rows: &[i32], init: Orders, passes: usize) -> (Orders, u64) {
    let mut orders = init;
    let mut best = orders.clone();
    let mut best_score = count_crossings(g, &orders);

    let mut stale = 0;
    let mut pass = 0;
    while pass < passes && best_score > 0 {
        let prev_score = best_score;

        if pass % 2 == 0 {
            for i in 1..rows.len() {
                let row = rows[i];
                let fixed = orders.get(&rows[i - 1]).cloned().unwrap_or_default();
                let current = orders.get(&row).cloned().unwrap_or_default();
                let resorted = wmedian(g, &g.nodes_in_row(row), &current, &fixed, true);
                orders.insert(row, resorted);
                transpose(g, &mut orders, row, rows[i - 1], true);
            }
        } else {
            for i in (0..rows.len().saturating_sub(1)).rev() {
                let row = rows[i];
                let fixed = orders.get(&rows[i + 1]).cloned().unwrap_or_default();
                let current = orders.get(&row).cloned().unwrap_or_default();
                let resorted = wmedian(g, &g.nodes_in_row(row), &current, &fixed, false);
                orders.insert(row, resorted);
                transpose(g, &mut orders, row, rows[i + 1], false);
            }
        }

        let score = count_crossings(g, &orders);
        if score < best_score {
            best = orders.clone();
            best_score = score;
            stale = 0;
        } else {
            stale += 1;
        }

        if stale >= 4 && score == prev_score {
            break;
        }
        pass += 1;
    }
    (best, best_score)
}

struct MedianEntry {
    id: String,
    median: usize,
    has_median: bool,
    current_pos: usize,
}

impl MedianEntry {
    fn sort_key(&self) -> usize {
        if self.has_median {
            self.median
        } else {
            self.current_pos
        }
    }
}

/// Reorders one row by the median positions of its neighbors in the fixed
/// row; nodes without neighbors there keep their current position as key.
fn wmedian<G: LayeredGraph>(
    g: &G,
    nodes: &[&Node],
    current: &[String],
    fixed: &[String],
    use_parents: bool,
) -> Vec<String> {
    if nodes.len() <= 1 {
        return node_ids(nodes);
    }

    let fixed_pos = pos_map(fixed);
    let current_pos = pos_map(current);

    let mut entries: Vec<MedianEntry> = nodes
        .iter()
        .map(|node| {
            let neighbors = if use_parents {
                g.parents(&node.id)
            } else {
                g.children(&node.id)
            };
            let pos = current_pos
                .get(node.id.as_str())
                .copied()
                .unwrap_or(current.len());
            let median = weighted_median(&neighbors, &fixed_pos);
            MedianEntry {
                id: node.id.clone(),
                median: median.unwrap_or(0),
                has_median: median.is_some(),
                current_pos: pos,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.sort_key()
            .cmp(&b.sort_key())
            .then_with(|| b.has_median.cmp(&a.has_median))
            .then_with(|| a.current_pos.cmp(&b.current_pos))
    });

    entries.into_iter().map(|entry| entry.id).collect()
}

fn weighted_median(neighbors: &[String], positions: &FxHashMap<String, usize>) -> Option<usize> {
    let mut pos: Vec<usize> = neighbors
        .iter()
        .filter_map(|n| positions.get(n.as_str()).copied())
        .collect();
    median_position(&mut pos)
}

/// Median of `pos`; for an even count, the midpoint of the two central
/// values.
fn median_position(pos: &mut [usize]) -> Option<usize> {
    if pos.is_empty() {
        return None;
    }
    pos.sort_unstable();
    let mid = pos.len() / 2;
    if pos.len() % 2 == 1 {
        Some(pos[mid])
    } else {
        Some((pos[mid - 1] + pos[mid]) / 2)
    }
}

/// Repeatedly swaps adjacent pairs whose swapped orientation crosses less.
/// Handles sharing an effective identity are never swapped.
fn transpose<G: LayeredGraph>(g: &G, orders: &mut Orders, row: i32, adj_row: i32, use_parents: bool) {
    let adj_pos = pos_map(orders.get(&adj_row).map(Vec::as_slice).unwrap_or_default());
    let Some(order) = orders.get_mut(&row) else {
        return;
    };
    if order.len() < 2 {
        return;
    }

    loop {
        let mut swapped = false;
        for i in 0..order.len() - 1 {
            let left = order[i].clone();
            let right = order[i + 1].clone();

            if let (Some(l), Some(r)) = (g.node(&left), g.node(&right)) {
                if l.effective_id() == r.effective_id() {
                    continue;
                }
            }

            if count_pair_crossings(g, &right, &left, &adj_pos, use_parents)
                < count_pair_crossings(g, &left, &right, &adj_pos, use_parents)
            {
                order.swap(i, i + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

fn init_orders<G: LayeredGraph>(
    g: &G,
    rows: &[i32],
    row_nodes: &FxHashMap<i32, Vec<&Node>>,
) -> Orders {
    let mut orders = Orders::new();

    let mut first = node_ids(&row_nodes[&rows[0]]);
    first.sort_unstable();
    orders.insert(rows[0], first);

    for i in 1..rows.len() {
        let row = rows[i];
        let nodes = &row_nodes[&row];
        if !nodes.is_empty() {
            let parent_order = orders.get(&rows[i - 1]).cloned().unwrap_or_default();
            orders.insert(row, order_by_min_parent(g, nodes, &parent_order));
        }
    }
    orders
}

/// Seeds a row under an already-ordered parent row: minimum parent position
/// first, then average parent position, then id.
fn order_by_min_parent<G: LayeredGraph>(
    g: &G,
    nodes: &[&Node],
    parent_order: &[String],
) -> Vec<String> {
    let parent_pos = pos_map(parent_order);

    struct SeedEntry {
        id: String,
        min_pos: usize,
        avg_pos: f64,
    }

    let mut entries: Vec<SeedEntry> = nodes
        .iter()
        .map(|node| {
            let mut min_pos = parent_order.len();
            let mut sum = 0usize;
            let mut count = 0usize;
            for parent in g.parents(&node.id) {
                if let Some(&pos) = parent_pos.get(parent.as_str()) {
                    min_pos = min_pos.min(pos);
                    sum += pos;
                    count += 1;
                }
            }
            let avg_pos = if count > 0 {
                sum as f64 / count as f64
            } else {
                min_pos as f64
            };
            SeedEntry {
                id: node.id.clone(),
                min_pos,
                avg_pos,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.min_pos
            .cmp(&b.min_pos)
            .then_with(|| a.avg_pos.total_cmp(&b.avg_pos))
            .then_with(|| a.id.cmp(&b.id))
    });

    entries.into_iter().map(|entry| entry.id).collect()
}

fn reverse_orders(orders: &Orders, rows: &[i32]) -> Orders {
    rows.iter()
        .filter_map(|row| {
            orders.get(row).map(|order| {
                let mut reversed = order.clone();
                reversed.reverse();
                (*row, reversed)
            })
        })
        .collect()
}
