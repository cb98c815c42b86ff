//! Parallel branch-and-bound search over PQ-tree-admissible row orderings.
//!
//! The barycentric sweep provides the initial bound. Work splits at the
//! first multi-node row: each admissible ordering of that row becomes one
//! task in the rayon pool, and every task runs a DFS that generates
//! candidates per depth, prunes on the shared bound, and publishes
//! improvements through a mutex-guarded best record mirrored into an atomic
//! score. A deadline plus a zero-score flag cancel cooperatively; every DFS
//! frame polls at entry and after each child.

use crate::order::barycentric::Barycentric;
use crate::order::candidates::{candidate_limit, generate_candidates};
use crate::order::cross_count::{CrossingWorkspace, count_crossings, count_crossings_idx};
use crate::order::types::{DebugFn, DebugInfo, ProgressFn, RowDebugInfo};
use crate::order::view::LayerView;
use crate::perm;
use rustc_hash::FxHashMap;
use seastack_dag::{LayeredGraph, Node};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const MONITOR_INTERVAL: Duration = Duration::from_millis(250);
const STARTS_PER_WORKER: usize = 100;
const EXHAUSTIVE_START_WIDTH: usize = 8;

/// Branch-and-bound orderer. Always returns an ordering, never worse than
/// the barycentric sweep's; with enough budget it is optimal.
#[derive(Default)]
pub struct OptimalSearch {
    /// Wall-clock budget; zero means 60 seconds.
    pub timeout: Duration,
    /// Called once after the initial bound, roughly every 250 ms while
    /// searching, and once at completion with (explored, pruned, best).
    pub progress: Option<ProgressFn>,
    /// Called once after the search with per-row diagnostics.
    pub debug: Option<DebugFn>,
}

impl OptimalSearch {
    pub fn order_rows<G: LayeredGraph + Sync>(mut self, g: &G) -> BTreeMap<i32, Vec<String>> {
        let rows = g.row_ids();
        if rows.is_empty() {
            return BTreeMap::new();
        }

        let timing = timing_enabled();
        let started = Instant::now();
        let timeout = if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        };

        let initial = Barycentric::default().order_rows(g);
        let initial_score = count_crossings(g, &initial);
        if initial_score == 0 {
            self.report(1, 0, 0);
            return initial;
        }
        self.report(0, 0, initial_score);
        let heuristic = started.elapsed();

        let row_nodes: FxHashMap<i32, Vec<&Node>> =
            rows.iter().map(|&row| (row, g.nodes_in_row(row))).collect();

        let solver = Solver {
            g,
            view: LayerView::new(g, &rows),
            rows: &rows,
            row_nodes: &row_nodes,
            cand_limit: candidate_limit(rows.len()),
            shared: Arc::new(Shared::new(initial_score, to_index_path(g, &rows, &initial))),
            cancel: Arc::new(Cancel::with_deadline(Instant::now() + timeout)),
        };

        let monitor_handle = self.progress.clone().map(|progress| {
            let shared = Arc::clone(&solver.shared);
            let cancel = Arc::clone(&solver.cancel);
            std::thread::spawn(move || monitor(&shared, &cancel, progress))
        });

        let search_started = Instant::now();
        solver.search();
        solver.cancel.trip();
        if let Some(handle) = monitor_handle {
            let _ = handle.join();
        }

        let shared = &solver.shared;
        self.report(
            shared.explored.load(Ordering::Relaxed),
            shared.pruned.load(Ordering::Relaxed),
            shared.best_score.load(Ordering::Relaxed),
        );
        if let Some(debug) = self.debug.take() {
            debug(solver.collect_debug_info(&initial));
        }

        let best = shared.lock_best();
        let result = to_string_order(&row_nodes, &rows, &best.path);

        if timing {
            eprintln!(
                "[seastack-timing] stage=order total={:?} heuristic={:?} search={:?} explored={} pruned={} best={}",
                started.elapsed(),
                heuristic,
                search_started.elapsed(),
                shared.explored.load(Ordering::Relaxed),
                shared.pruned.load(Ordering::Relaxed),
                best.score,
            );
        }
        result
    }

    fn report(&self, explored: u64, pruned: u64, best: u64) {
        if let Some(progress) = &self.progress {
            progress(explored, pruned, best);
        }
    }
}

fn timing_enabled() -> bool {
    std::env::var("SEASTACK_ORDER_TIMING")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

struct BestPath {
    score: u64,
    path: Vec<Vec<usize>>,
}

/// Cross-task search state. `best_score` mirrors the locked record so
/// pruning can read the bound without taking the lock; a stale read only
/// over-estimates the bound and under-prunes.
struct Shared {
    best: Mutex<BestPath>,
    best_score: AtomicU64,
    explored: AtomicU64,
    pruned: AtomicU64,
    max_depth: AtomicUsize,
}

impl Shared {
    fn new(score: u64, path: Vec<Vec<usize>>) -> Self {
        Self {
            best: Mutex::new(BestPath { score, path }),
            best_score: AtomicU64::new(score),
            explored: AtomicU64::new(0),
            pruned: AtomicU64::new(0),
            max_depth: AtomicUsize::new(0),
        }
    }

    fn lock_best(&self) -> std::sync::MutexGuard<'_, BestPath> {
        self.best.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Deadline plus early-exit flag, polled cooperatively.
struct Cancel {
    deadline: Instant,
    tripped: AtomicBool,
}

impl Cancel {
    fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline,
            tripped: AtomicBool::new(false),
        }
    }

    fn trip(&self) {
        self.tripped.store(true, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.tripped.load(Ordering::Relaxed) || Instant::now() >= self.deadline
    }
}

fn monitor(shared: &Shared, cancel: &Cancel, progress: ProgressFn) {
    loop {
        std::thread::sleep(MONITOR_INTERVAL);
        if cancel.is_cancelled() {
            return;
        }
        progress(
            shared.explored.load(Ordering::Relaxed),
            shared.pruned.load(Ordering::Relaxed),
            shared.best_score.load(Ordering::Relaxed),
        );
    }
}

struct Solver<'a, G> {
    g: &'a G,
    view: LayerView,
    rows: &'a [i32],
    row_nodes: &'a FxHashMap<i32, Vec<&'a Node>>,
    cand_limit: usize,
    shared: Arc<Shared>,
    cancel: Arc<Cancel>,
}

impl<G: LayeredGraph + Sync> Solver<'_, G> {
    fn search(&self) {
        let workers = rayon::current_num_threads();
        let parallel_row = self.find_parallel_row();

        let (prefix, prefix_score) = self.build_prefix(parallel_row);
        let starts = self.start_permutations(parallel_row, &prefix, workers * STARTS_PER_WORKER);

        let prefix = &prefix;
        rayon::scope(|scope| {
            for start in starts {
                if self.shared.best_score.load(Ordering::Relaxed) == 0
                    || self.cancel.is_cancelled()
                {
                    break;
                }
                scope.spawn(move |_| self.run_start(parallel_row, prefix, prefix_score, start));
            }
        });
    }

    /// First row with more than one node; everything above it has a unique
    /// ordering and becomes the fixed prefix.
    fn find_parallel_row(&self) -> usize {
        self.rows
            .iter()
            .position(|row| self.row_nodes[row].len() > 1)
            .unwrap_or(0)
    }

    fn build_prefix(&self, parallel_row: usize) -> (Vec<Vec<usize>>, u64) {
        let mut prefix = vec![Vec::new(); self.rows.len()];
        let mut score = 0;
        let mut ws = CrossingWorkspace::new(self.view.max_row_width());

        for depth in 0..parallel_row {
            prefix[depth] = perm::seq(self.row_nodes[&self.rows[depth]].len());
            if depth > 0 {
                score += count_crossings_idx(
                    self.view.between(depth - 1),
                    &prefix[depth - 1],
                    &prefix[depth],
                    &mut ws,
                );
            }
        }
        (prefix, score)
    }

    fn start_permutations(
        &self,
        parallel_row: usize,
        prefix: &[Vec<usize>],
        worker_limit: usize,
    ) -> Vec<Vec<usize>> {
        let n = self.row_nodes[&self.rows[parallel_row]].len();

        if parallel_row == 0 {
            return if n <= EXHAUSTIVE_START_WIDTH {
                perm::generate(n, 0)
            } else {
                perm::generate(n, worker_limit)
            };
        }

        let mut starts = generate_candidates(
            self.g,
            self.rows,
            self.row_nodes,
            parallel_row,
            &prefix[parallel_row - 1],
            self.cand_limit,
        );
        starts.truncate(worker_limit);
        starts
    }

    fn run_start(
        &self,
        parallel_row: usize,
        prefix: &[Vec<usize>],
        prefix_score: u64,
        start: Vec<usize>,
    ) {
        if self.cancel.is_cancelled() {
            return;
        }

        let mut path = prefix.to_vec();
        let mut ws = CrossingWorkspace::new(self.view.max_row_width());

        let mut score = prefix_score;
        if parallel_row > 0 {
            score += count_crossings_idx(
                self.view.between(parallel_row - 1),
                &path[parallel_row - 1],
                &start,
                &mut ws,
            );
        }
        path[parallel_row] = start;

        if score >= self.shared.best_score.load(Ordering::Relaxed) {
            self.shared.pruned.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.dfs(parallel_row + 1, score, &mut path, &mut ws);
    }

    fn dfs(&self, depth: usize, score: u64, path: &mut Vec<Vec<usize>>, ws: &mut CrossingWorkspace) {
        if self.cancel.is_cancelled() {
            return;
        }

        self.shared.max_depth.fetch_max(depth, Ordering::Relaxed);

        if score >= self.shared.best_score.load(Ordering::Relaxed) {
            self.shared.pruned.fetch_add(1, Ordering::Relaxed);
            return;
        }

        if depth == self.rows.len() {
            self.update_best(path, score);
            return;
        }

        if self.row_nodes[&self.rows[depth]].is_empty() {
            path[depth].clear();
            self.dfs(depth + 1, score, path, ws);
            return;
        }

        let prev_order = path[depth - 1].clone();
        let candidates = generate_candidates(
            self.g,
            self.rows,
            self.row_nodes,
            depth,
            &prev_order,
            self.cand_limit,
        );

        for candidate in candidates {
            let new_score = score
                + count_crossings_idx(self.view.between(depth - 1), &prev_order, &candidate, ws);
            if new_score >= self.shared.best_score.load(Ordering::Relaxed) {
                self.shared.pruned.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            path[depth] = candidate;
            self.dfs(depth + 1, new_score, path, ws);

            if self.shared.best_score.load(Ordering::Relaxed) == 0 || self.cancel.is_cancelled() {
                return;
            }
        }
    }

    fn update_best(&self, path: &[Vec<usize>], score: u64) {
        self.shared.explored.fetch_add(1, Ordering::Relaxed);

        let mut best = self.shared.lock_best();
        if score < best.score {
            best.score = score;
            best.path = path.to_vec();
            self.shared.best_score.store(score, Ordering::Relaxed);
            if score == 0 {
                self.cancel.trip();
            }
        }
    }

    fn collect_debug_info(&self, initial: &BTreeMap<i32, Vec<String>>) -> DebugInfo {
        let path = to_index_path(self.g, self.rows, initial);

        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, &row)| {
                let nodes = &self.row_nodes[&row];
                let candidates = if nodes.len() <= 1 {
                    1
                } else if i == 0 {
                    perm::factorial(nodes.len()).min(self.cand_limit as u64) as usize
                } else {
                    generate_candidates(
                        self.g,
                        self.rows,
                        self.row_nodes,
                        i,
                        &path[i - 1],
                        self.cand_limit,
                    )
                    .len()
                };
                RowDebugInfo {
                    row,
                    node_count: nodes.len(),
                    candidates,
                }
            })
            .collect();

        DebugInfo {
            rows,
            max_depth: self.shared.max_depth.load(Ordering::Relaxed),
            total_rows: self.rows.len(),
        }
    }
}

fn to_index_path<G: LayeredGraph>(
    g: &G,
    rows: &[i32],
    orders: &BTreeMap<i32, Vec<String>>,
) -> Vec<Vec<usize>> {
    rows.iter()
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
        .collect()
}

fn to_string_order(
    row_nodes: &FxHashMap<i32, Vec<&Node>>,
    rows: &[i32],
    path: &[Vec<usize>],
) -> BTreeMap<i32, Vec<String>> {
    let mut result = BTreeMap::new();
    for (i, &row) in rows.iter().enumerate() {
        let Some(order) = path.get(i) else { continue };
        if order.is_empty() {
            continue;
        }
        let nodes = &row_nodes[&row];
        result.insert(row, order.iter().map(|&ix| nodes[ix].id.clone()).collect());
    }
    result
}
