use rustc_hash::FxHashMap;
use seastack_dag::LayeredGraph;

/// Flat inter-row adjacency: for each pair of adjacent rows, the sorted
/// lower-row child indices of every upper-row node, addressed by row-local
/// index. Built once per solve and read-only afterwards.
#[derive(Debug, Clone)]
pub struct LayerView {
    edges: Vec<Vec<Vec<usize>>>,
    max_row_width: usize,
}

impl LayerView {
    pub fn new<G: LayeredGraph>(g: &G, rows: &[i32]) -> Self {
        let row_nodes: Vec<_> = rows.iter().map(|&row| g.nodes_in_row(row)).collect();
        let max_row_width = row_nodes.iter().map(Vec::len).max().unwrap_or(0);

        let mut edges = Vec::with_capacity(rows.len().saturating_sub(1));
        for i in 0..rows.len().saturating_sub(1) {
            let upper = &row_nodes[i];
            let lower = &row_nodes[i + 1];

            let mut lower_ix: FxHashMap<&str, usize> = FxHashMap::default();
            for (j, node) in lower.iter().enumerate() {
                lower_ix.insert(node.id.as_str(), j);
            }

            let mut table = Vec::with_capacity(upper.len());
            for node in upper.iter() {
                let mut targets: Vec<usize> = g
                    .children_in_row(&node.id, rows[i + 1])
                    .iter()
                    .filter_map(|child| lower_ix.get(child.as_str()).copied())
                    .collect();
                targets.sort_unstable();
                table.push(targets);
            }
            edges.push(table);
        }

        Self {
            edges,
            max_row_width,
        }
    }

    pub fn max_row_width(&self) -> usize {
        self.max_row_width
    }

    /// Child-index table for the pair (rows\[i\], rows\[i+1\]).
    pub fn between(&self, i: usize) -> &[Vec<usize>] {
        &self.edges[i]
    }
}
