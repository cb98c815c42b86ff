//! Permutation machinery: PQ-trees and Heap's-algorithm generation.

mod generate;
pub use generate::{factorial, generate, seq};

mod pqtree;
pub use pqtree::PqTree;
