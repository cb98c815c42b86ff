//! Layered graph container APIs used by `seastack`.
//!
//! A layered DAG assigns every node to an integer row and restricts every
//! edge to span exactly one row downward. [`LayeredGraph`] is the interface
//! the ordering core consumes; [`LayeredDag`] is the concrete container with
//! a validating builder.

mod error;
mod graph;
mod util;

pub use error::{DagError, Result};
pub use graph::{LayeredDag, LayeredGraph, Node};
pub use util::{node_ids, pos_map};
