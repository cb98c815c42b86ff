use crate::error::{DagError, Result};
use rustc_hash::FxBuildHasher;
use std::collections::BTreeMap;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// A node handle: a stable opaque id, plus the effective identity used when
/// several handles stand in for the same underlying node (subdividers
/// inserted so every edge spans exactly one row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub effective_id: Option<String>,
    pub auxiliary: bool,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            effective_id: None,
            auxiliary: false,
        }
    }

    /// An auxiliary handle standing in for `effective_id` on its row.
    pub fn subdivider(id: impl Into<String>, effective_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            effective_id: Some(effective_id.into()),
            auxiliary: true,
        }
    }

    pub fn effective_id(&self) -> &str {
        self.effective_id.as_deref().unwrap_or(&self.id)
    }
}

/// The graph interface the ordering core consumes.
///
/// `row_ids` is ascending; `nodes_in_row` is stable across calls (its order
/// defines the row-local indexing the core works in). All edges connect
/// adjacent rows, so `children` of a node in row `r` live in row `r + 1` and
/// `parents` in row `r - 1`.
pub trait LayeredGraph {
    fn row_ids(&self) -> Vec<i32>;
    fn nodes_in_row(&self, row: i32) -> Vec<&Node>;
    fn node(&self, id: &str) -> Option<&Node>;
    fn row_of(&self, id: &str) -> Option<i32>;
    fn children(&self, id: &str) -> Vec<String>;
    fn parents(&self, id: &str) -> Vec<String>;

    fn children_in_row(&self, id: &str, row: i32) -> Vec<String> {
        self.children(id)
            .into_iter()
            .filter(|child| self.row_of(child) == Some(row))
            .collect()
    }

    fn parents_in_row(&self, id: &str, row: i32) -> Vec<String> {
        self.parents(id)
            .into_iter()
            .filter(|parent| self.row_of(parent) == Some(row))
            .collect()
    }
}

/// Concrete layered DAG with a validating builder.
#[derive(Debug, Clone, Default)]
pub struct LayeredDag {
    nodes: Vec<Node>,
    node_rows: Vec<i32>,
    index: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    rows: BTreeMap<i32, Vec<usize>>,
}

impl LayeredDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node` to `row`. Nodes keep insertion order within their row.
    pub fn add_node(&mut self, node: Node, row: i32) -> Result<()> {
        if self.index.contains_key(&node.id) {
            return Err(DagError::DuplicateNode { id: node.id });
        }
        let ix = self.nodes.len();
        self.index.insert(node.id.clone(), ix);
        self.nodes.push(node);
        self.node_rows.push(row);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.rows.entry(row).or_default().push(ix);
        Ok(())
    }

    /// Adds an edge from `from` to `to`; `to` must sit exactly one row below
    /// `from` and both endpoints must already exist.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        let Some(&from_ix) = self.index.get(from) else {
            return Err(DagError::UnknownNode {
                id: from.to_string(),
            });
        };
        let Some(&to_ix) = self.index.get(to) else {
            return Err(DagError::UnknownNode { id: to.to_string() });
        };

        let from_row = self.node_rows[from_ix];
        let to_row = self.node_rows[to_ix];
        if to_row != from_row + 1 {
            return Err(DagError::RowSpan {
                from: from.to_string(),
                to: to.to_string(),
                from_row,
                to_row,
            });
        }

        self.outgoing[from_ix].push(to_ix);
        self.incoming[to_ix].push(from_ix);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl LayeredGraph for LayeredDag {
    fn row_ids(&self) -> Vec<i32> {
        self.rows.keys().copied().collect()
    }

    fn nodes_in_row(&self, row: i32) -> Vec<&Node> {
        self.rows
            .get(&row)
            .map(|members| members.iter().map(|&ix| &self.nodes[ix]).collect())
            .unwrap_or_default()
    }

    fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&ix| &self.nodes[ix])
    }

    fn row_of(&self, id: &str) -> Option<i32> {
        self.index.get(id).map(|&ix| self.node_rows[ix])
    }

    fn children(&self, id: &str) -> Vec<String> {
        self.index
            .get(id)
            .map(|&ix| {
                self.outgoing[ix]
                    .iter()
                    .map(|&child| self.nodes[child].id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parents(&self, id: &str) -> Vec<String> {
        self.index
            .get(id)
            .map(|&ix| {
                self.incoming[ix]
                    .iter()
                    .map(|&parent| self.nodes[parent].id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}
