use crate::graph::Node;
use rustc_hash::FxHashMap;

/// Position of every id within `order`.
pub fn pos_map(order: &[String]) -> FxHashMap<String, usize> {
    order
        .iter()
        .enumerate()
        .map(|(pos, id)| (id.clone(), pos))
        .collect()
}

pub fn node_ids(nodes: &[&Node]) -> Vec<String> {
    nodes.iter().map(|node| node.id.clone()).collect()
}
