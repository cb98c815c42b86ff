use seastack::dag::{LayeredDag, LayeredGraph, Node, pos_map};
use seastack::order::{
    CrossingWorkspace, LayerView, count_crossings, count_crossings_idx, count_pair_crossings,
};
use std::collections::BTreeMap;

fn graph(rows: &[&[&str]], edges: &[(&str, &str)]) -> LayeredDag {
    let mut g = LayeredDag::new();
    for (row, ids) in rows.iter().enumerate() {
        for id in ids.iter() {
            g.add_node(Node::new(*id), row as i32).unwrap();
        }
    }
    for (from, to) in edges {
        g.add_edge(from, to).unwrap();
    }
    g
}

fn orders(rows: &[(i32, &[&str])]) -> BTreeMap<i32, Vec<String>> {
    rows.iter()
        .map(|(row, ids)| (*row, ids.iter().map(|id| id.to_string()).collect()))
        .collect()
}

#[test]
fn returns_0_for_a_single_row() {
    let g = graph(&[&["a", "b"]], &[]);
    assert_eq!(count_crossings(&g, &orders(&[(0, &["a", "b"])])), 0);
}

#[test]
fn returns_0_for_a_layering_with_no_crossings() {
    let g = graph(&[&["a1", "a2"], &["b1", "b2"]], &[("a1", "b1"), ("a2", "b2")]);
    assert_eq!(
        count_crossings(&g, &orders(&[(0, &["a1", "a2"]), (1, &["b1", "b2"])])),
        0
    );
}

#[test]
fn returns_1_for_a_layering_with_1_crossing() {
    let g = graph(&[&["a1", "a2"], &["b1", "b2"]], &[("a1", "b1"), ("a2", "b2")]);
    assert_eq!(
        count_crossings(&g, &orders(&[(0, &["a1", "a2"]), (1, &["b2", "b1"])])),
        1
    );
}

#[test]
fn counts_crossings_across_layers() {
    let g = graph(
        &[&["a1", "a2"], &["b1", "b2"], &["c1", "c2"]],
        &[("a1", "b1"), ("b1", "c1"), ("a2", "b2"), ("b2", "c2")],
    );
    assert_eq!(
        count_crossings(
            &g,
            &orders(&[(0, &["a1", "a2"]), (1, &["b2", "b1"]), (2, &["c1", "c2"])]),
        ),
        2
    );
}

#[test]
fn counts_a_dense_bipartite_correctly() {
    // K(2,2) always has exactly one crossing.
    let g = graph(
        &[&["a", "b"], &["c", "d"]],
        &[("a", "c"), ("a", "d"), ("b", "c"), ("b", "d")],
    );
    for lower in [["c", "d"], ["d", "c"]] {
        assert_eq!(
            count_crossings(&g, &orders(&[(0, &["a", "b"]), (1, &lower)])),
            1
        );
    }
}

#[test]
fn interleaved_parents_force_one_crossing() {
    let g = graph(
        &[&["a", "b", "c"], &["x", "y"]],
        &[("a", "y"), ("b", "x"), ("c", "y")],
    );
    // With the upper row fixed either way around row 1 still crosses once.
    for lower in [["x", "y"], ["y", "x"]] {
        assert_eq!(
            count_crossings(&g, &orders(&[(0, &["a", "b", "c"]), (1, &lower)])),
            1
        );
    }
}

#[test]
fn reversing_both_rows_preserves_the_count() {
    let g = graph(
        &[&["a", "b", "c"], &["p", "q", "r"]],
        &[("a", "q"), ("a", "r"), ("b", "p"), ("c", "p"), ("c", "q")],
    );
    let forward = count_crossings(
        &g,
        &orders(&[(0, &["a", "b", "c"]), (1, &["p", "q", "r"])]),
    );
    let reversed = count_crossings(
        &g,
        &orders(&[(0, &["c", "b", "a"]), (1, &["r", "q", "p"])]),
    );
    assert_eq!(forward, reversed);
}

#[test]
fn idx_counter_reuses_its_workspace() {
    let g = graph(
        &[&["a", "b"], &["c", "d"]],
        &[("a", "c"), ("a", "d"), ("b", "c"), ("b", "d")],
    );
    let rows = g.row_ids();
    let view = LayerView::new(&g, &rows);
    let mut ws = CrossingWorkspace::new(view.max_row_width());

    assert_eq!(count_crossings_idx(view.between(0), &[0, 1], &[0, 1], &mut ws), 1);
    assert_eq!(count_crossings_idx(view.between(0), &[0, 1], &[1, 0], &mut ws), 1);
    assert_eq!(count_crossings_idx(view.between(0), &[], &[0, 1], &mut ws), 0);
}

#[test]
fn idx_counter_sums_match_the_whole_graph_count() {
    let g = graph(
        &[&["a1", "a2"], &["b1", "b2"], &["c1", "c2"]],
        &[("a1", "b2"), ("a2", "b1"), ("b1", "c2"), ("b2", "c1")],
    );
    let rows = g.row_ids();
    let view = LayerView::new(&g, &rows);
    let mut ws = CrossingWorkspace::new(view.max_row_width());

    let per_pair: u64 = (0..rows.len() - 1)
        .map(|i| count_crossings_idx(view.between(i), &[0, 1], &[0, 1], &mut ws))
        .sum();
    let whole = count_crossings(
        &g,
        &orders(&[(0, &["a1", "a2"]), (1, &["b1", "b2"]), (2, &["c1", "c2"])]),
    );
    assert_eq!(per_pair, whole);
    assert_eq!(whole, 2);
}

#[test]
fn pair_counter_matches_both_orientations_of_k22() {
    let g = graph(
        &[&["a", "b"], &["c", "d"]],
        &[("a", "c"), ("a", "d"), ("b", "c"), ("b", "d")],
    );
    let adj = pos_map(&["c".to_string(), "d".to_string()]);
    assert_eq!(count_pair_crossings(&g, "a", "b", &adj, false), 1);
    assert_eq!(count_pair_crossings(&g, "b", "a", &adj, false), 1);
}

#[test]
fn pair_counter_prefers_the_uncrossed_orientation() {
    let g = graph(&[&["a", "b"], &["c", "d"]], &[("a", "d"), ("b", "c")]);
    let adj = pos_map(&["c".to_string(), "d".to_string()]);
    // [a, b] crosses once, [b, a] not at all.
    assert_eq!(count_pair_crossings(&g, "a", "b", &adj, false), 1);
    assert_eq!(count_pair_crossings(&g, "b", "a", &adj, false), 0);
}
