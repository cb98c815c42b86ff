use seastack_dag::{DagError, LayeredDag, LayeredGraph, Node};

fn three_row_dag() -> LayeredDag {
    let mut g = LayeredDag::new();
    g.add_node(Node::new("a"), 0).unwrap();
    g.add_node(Node::new("b"), 0).unwrap();
    g.add_node(Node::new("c"), 1).unwrap();
    g.add_node(Node::new("d"), 1).unwrap();
    g.add_node(Node::new("e"), 2).unwrap();
    g.add_edge("a", "c").unwrap();
    g.add_edge("a", "d").unwrap();
    g.add_edge("b", "d").unwrap();
    g.add_edge("c", "e").unwrap();
    g
}

#[test]
fn rejects_duplicate_node_ids() {
    let mut g = LayeredDag::new();
    g.add_node(Node::new("a"), 0).unwrap();
    let err = g.add_node(Node::new("a"), 1).unwrap_err();
    assert!(matches!(err, DagError::DuplicateNode { id } if id == "a"));
}

#[test]
fn rejects_unknown_edge_endpoints() {
    let mut g = LayeredDag::new();
    g.add_node(Node::new("a"), 0).unwrap();
    assert!(matches!(
        g.add_edge("a", "missing").unwrap_err(),
        DagError::UnknownNode { id } if id == "missing"
    ));
    assert!(matches!(
        g.add_edge("missing", "a").unwrap_err(),
        DagError::UnknownNode { id } if id == "missing"
    ));
}

#[test]
fn rejects_edges_spanning_more_than_one_row() {
    let mut g = LayeredDag::new();
    g.add_node(Node::new("a"), 0).unwrap();
    g.add_node(Node::new("b"), 2).unwrap();
    g.add_node(Node::new("c"), 0).unwrap();
    let err = g.add_edge("a", "b").unwrap_err();
    assert!(matches!(err, DagError::RowSpan { from_row: 0, to_row: 2, .. }));
    // Same-row and upward edges are rejected too.
    assert!(g.add_edge("a", "c").is_err());
    let mut g2 = three_row_dag();
    assert!(g2.add_edge("c", "a").is_err());
}

#[test]
fn row_ids_are_ascending() {
    let mut g = LayeredDag::new();
    g.add_node(Node::new("z"), 5).unwrap();
    g.add_node(Node::new("y"), 1).unwrap();
    g.add_node(Node::new("x"), 3).unwrap();
    assert_eq!(g.row_ids(), vec![1, 3, 5]);
}

#[test]
fn nodes_keep_insertion_order_within_a_row() {
    let g = three_row_dag();
    let ids: Vec<&str> = g.nodes_in_row(1).iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "d"]);
    assert!(g.nodes_in_row(9).is_empty());
}

#[test]
fn adjacency_is_filtered_by_row() {
    let g = three_row_dag();
    assert_eq!(g.children("a"), vec!["c".to_string(), "d".to_string()]);
    assert_eq!(g.children_in_row("a", 1), vec!["c".to_string(), "d".to_string()]);
    assert!(g.children_in_row("a", 2).is_empty());
    assert_eq!(g.parents("d"), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(g.parents_in_row("d", 0), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(g.parents_in_row("e", 1), vec!["c".to_string()]);
    assert!(g.children("unknown").is_empty());
}

#[test]
fn row_lookup_and_counts() {
    let g = three_row_dag();
    assert_eq!(g.row_of("a"), Some(0));
    assert_eq!(g.row_of("e"), Some(2));
    assert_eq!(g.row_of("nope"), None);
    assert_eq!(g.node_count(), 5);
    assert!(!g.is_empty());
    assert!(LayeredDag::new().is_empty());
}

#[test]
fn effective_id_falls_back_to_the_node_id() {
    let plain = Node::new("pkg");
    assert_eq!(plain.effective_id(), "pkg");
    assert!(!plain.auxiliary);

    let aux = Node::subdivider("pkg#2", "pkg");
    assert_eq!(aux.id, "pkg#2");
    assert_eq!(aux.effective_id(), "pkg");
    assert!(aux.auxiliary);
}
