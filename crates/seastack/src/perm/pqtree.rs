//! PQ-tree over the leaf set `0..n`.
//!
//! A PQ-tree represents the orderings of its leaves that keep every subset
//! from a stream of "these leaves are consecutive" constraints contiguous.
//! P-node children may be permuted freely; Q-node children are fixed up to
//! reversal. Nodes live in an arena and reference children by index, so
//! rewrites splice index vectors instead of chasing parent pointers;
//! detached nodes simply stop being reachable from the root.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Leaf,
    P,
    Q,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mark {
    #[default]
    Unmarked,
    Empty,
    Full,
    Partial,
}

#[derive(Debug, Clone)]
struct PqNode {
    kind: Kind,
    value: usize,
    children: Vec<usize>,
    mark: Mark,
}

impl PqNode {
    fn leaf(value: usize) -> Self {
        Self {
            kind: Kind::Leaf,
            value,
            children: Vec::new(),
            mark: Mark::Unmarked,
        }
    }

    fn internal(kind: Kind, children: Vec<usize>, mark: Mark) -> Self {
        Self {
            kind,
            value: 0,
            children,
            mark,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PqTree {
    nodes: Vec<PqNode>,
    root: Option<usize>,
    leaves: Vec<usize>,
}

impl PqTree {
    /// A tree over `0..n` admitting every ordering: `n == 0` is empty,
    /// `n == 1` a single leaf, anything larger a P-root over `n` leaves.
    pub fn new(n: usize) -> Self {
        if n == 0 {
            return Self {
                nodes: Vec::new(),
                root: None,
                leaves: Vec::new(),
            };
        }

        let mut nodes: Vec<PqNode> = (0..n).map(PqNode::leaf).collect();
        let leaves: Vec<usize> = (0..n).collect();
        if n == 1 {
            return Self {
                nodes,
                root: Some(0),
                leaves,
            };
        }

        nodes.push(PqNode::internal(Kind::P, leaves.clone(), Mark::Unmarked));
        let root = nodes.len() - 1;
        Self {
            nodes,
            root: Some(root),
            leaves,
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Restricts the admissible orderings to those placing `constraint`
    /// contiguously. Returns `false` when the accumulated constraints have
    /// become unsatisfiable; the tree contents are unspecified afterwards
    /// and the caller is expected to stop using it. Subsets of size ≤ 1 or
    /// covering every leaf change nothing and return `true`; leaf values out
    /// of range are ignored.
    pub fn reduce(&mut self, constraint: &[usize]) -> bool {
        let Some(root) = self.root else { return true };
        if constraint.len() <= 1 || constraint.len() == self.leaves.len() {
            return true;
        }

        for node in &mut self.nodes {
            node.mark = Mark::Unmarked;
        }
        for &value in constraint {
            if let Some(&leaf) = self.leaves.get(value) {
                self.nodes[leaf].mark = Mark::Full;
            }
        }

        if self.bubble_up(root) == Mark::Empty {
            return true;
        }
        self.reduce_node(root)
    }

    /// Post-order marking: full if every child is full, empty if none is
    /// full or partial, partial otherwise.
    fn bubble_up(&mut self, ix: usize) -> Mark {
        if self.nodes[ix].kind == Kind::Leaf {
            if self.nodes[ix].mark == Mark::Unmarked {
                self.nodes[ix].mark = Mark::Empty;
            }
            return self.nodes[ix].mark;
        }

        let children = self.nodes[ix].children.clone();
        let mut full = 0;
        let mut partial = 0;
        for child in children {
            match self.bubble_up(child) {
                Mark::Full => full += 1,
                Mark::Partial => partial += 1,
                _ => {}
            }
        }

        let node = &mut self.nodes[ix];
        node.mark = if full == node.children.len() {
            Mark::Full
        } else if full == 0 && partial == 0 {
            Mark::Empty
        } else {
            Mark::Partial
        };
        node.mark
    }

    fn reduce_node(&mut self, ix: usize) -> bool {
        match self.nodes[ix].mark {
            Mark::Full | Mark::Empty => return true,
            _ => {}
        }
        match self.nodes[ix].kind {
            Kind::Leaf => true,
            Kind::P => self.reduce_p(ix),
            Kind::Q => self.reduce_q(ix),
        }
    }

    /// Reduces every partial child in place; the caller re-inspects marks
    /// against the rewritten children afterwards.
    fn reduce_partial_children(&mut self, ix: usize) -> bool {
        let children = self.nodes[ix].children.clone();
        for &child in &children {
            if self.nodes[child].mark == Mark::Partial && !self.reduce_node(child) {
                return false;
            }
        }
        true
    }

    fn reduce_p(&mut self, ix: usize) -> bool {
        if !self.reduce_partial_children(ix) {
            return false;
        }

        let mut full_children = Vec::new();
        let mut partial_children = Vec::new();
        let mut empty_count = 0usize;
        for &child in &self.nodes[ix].children {
            match self.nodes[child].mark {
                Mark::Full => full_children.push(child),
                Mark::Partial => partial_children.push(child),
                _ => empty_count += 1,
            }
        }

        if partial_children.len() > 1 {
            return false;
        }
        if full_children.is_empty() {
            return true;
        }
        if partial_children.is_empty() {
            if full_children.len() > 1 && empty_count > 0 {
                self.group_children(ix, &full_children, Kind::P);
            }
            return true;
        }
        self.extend_partial_child(ix, partial_children[0], &full_children)
    }

    fn reduce_q(&mut self, ix: usize) -> bool {
        if !self.reduce_partial_children(ix) {
            return false;
        }

        let children = self.nodes[ix].children.clone();
        let mut first: Option<usize> = None;
        let mut last = 0usize;
        let mut partial_idx = Vec::new();
        for (i, &child) in children.iter().enumerate() {
            match self.nodes[child].mark {
                Mark::Full => {
                    if first.is_none() {
                        first = Some(i);
                    }
                    last = i;
                }
                Mark::Partial => partial_idx.push(i),
                _ => {}
            }
        }

        let Some(first) = first else { return true };

        for &child in &children[first..=last] {
            if self.nodes[child].mark == Mark::Empty {
                return false;
            }
        }
        for &idx in &partial_idx {
            if idx + 1 != first && idx != last + 1 {
                return false;
            }
        }

        // Two partial Q children would need splices at both ends of the full
        // run, and the second splice would act on indices shifted by the
        // first. Give up instead; the caller falls back to unconstrained
        // permutations.
        let q_partials: Vec<usize> = partial_idx
            .iter()
            .copied()
            .filter(|&idx| self.nodes[children[idx]].kind == Kind::Q)
            .collect();
        if q_partials.len() > 1 {
            return false;
        }
        if let Some(&idx) = q_partials.first() {
            self.merge_q_node(ix, idx);
        }
        true
    }

    /// Wraps `group` (≥ 2 children of `parent` with a shared mark) in a new
    /// node inserted at the first grouped position.
    fn group_children(&mut self, parent: usize, group: &[usize], kind: Kind) {
        if group.len() <= 1 {
            return;
        }

        let mark = self.nodes[group[0]].mark;
        self.nodes.push(PqNode::internal(kind, group.to_vec(), mark));
        let grouped = self.nodes.len() - 1;

        let old = std::mem::take(&mut self.nodes[parent].children);
        let mut children = Vec::with_capacity(old.len() - group.len() + 1);
        let mut inserted = false;
        for child in old {
            if group.contains(&child) {
                if !inserted {
                    children.push(grouped);
                    inserted = true;
                }
            } else {
                children.push(child);
            }
        }
        self.nodes[parent].children = children;
    }

    /// Replaces a P-node's single partial child and its full siblings with a
    /// Q-node ordered empty-side first, so the full leaves of the subtree
    /// end up contiguous with the grouped full siblings.
    fn extend_partial_child(&mut self, parent: usize, partial: usize, full_siblings: &[usize]) -> bool {
        if full_siblings.is_empty() {
            return true;
        }

        let mut merged = Vec::new();
        for &child in &self.nodes[partial].children {
            if self.nodes[child].mark != Mark::Full {
                merged.push(child);
            }
        }
        for &child in &self.nodes[partial].children {
            if self.nodes[child].mark == Mark::Full {
                merged.push(child);
            }
        }
        merged.extend_from_slice(full_siblings);

        self.nodes.push(PqNode::internal(Kind::Q, merged, Mark::Partial));
        let qnode = self.nodes.len() - 1;

        let old = std::mem::take(&mut self.nodes[parent].children);
        let mut children = Vec::with_capacity(old.len());
        let mut replaced = false;
        for child in old {
            if child == partial || full_siblings.contains(&child) {
                if !replaced {
                    children.push(qnode);
                    replaced = true;
                }
            } else {
                children.push(child);
            }
        }
        self.nodes[parent].children = children;

        if self.nodes[parent].children.len() == 1 && Some(parent) == self.root {
            self.root = Some(self.nodes[parent].children[0]);
        }
        true
    }

    /// Splices a partial Q child's children into the parent Q-node, reversed
    /// if needed so its full end adjoins the neighboring full run.
    fn merge_q_node(&mut self, parent: usize, idx: usize) {
        let child = self.nodes[parent].children[idx];
        if self.nodes[child].kind != Kind::Q {
            return;
        }

        let siblings = &self.nodes[parent].children;
        let grandchildren = &self.nodes[child].children;
        let mut reverse = false;
        if idx > 0 && self.nodes[siblings[idx - 1]].mark == Mark::Full {
            if let Some(&tail) = grandchildren.last() {
                reverse = self.nodes[tail].mark == Mark::Full;
            }
        } else if idx + 1 < siblings.len() && self.nodes[siblings[idx + 1]].mark == Mark::Full {
            if let Some(&head) = grandchildren.first() {
                reverse = self.nodes[head].mark == Mark::Full;
            }
        }

        let mut spliced = self.nodes[child].children.clone();
        if reverse {
            spliced.reverse();
        }
        self.nodes[parent].children.splice(idx..=idx, spliced);
    }

    /// Number of admissible orderings: 1 per leaf, 2·∏ for a Q-node,
    /// k!·∏ for a P-node with k children. Saturates at `u64::MAX`.
    pub fn valid_count(&self) -> u64 {
        match self.root {
            None => 1,
            Some(root) => self.count_node(root),
        }
    }

    fn count_node(&self, ix: usize) -> u64 {
        let node = &self.nodes[ix];
        if node.kind == Kind::Leaf {
            return 1;
        }
        let mut product: u64 = 1;
        for &child in &node.children {
            product = product.saturating_mul(self.count_node(child));
        }
        match node.kind {
            Kind::Q => product.saturating_mul(2),
            _ => product.saturating_mul(crate::perm::factorial(node.children.len())),
        }
    }

    /// Admissible orderings, at most `limit` of them when `limit > 0`.
    pub fn enumerate(&self, limit: usize) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        self.for_each_ordering(|ordering| {
            out.push(ordering.to_vec());
            limit == 0 || out.len() < limit
        });
        out
    }

    /// Calls `emit` with each admissible ordering until it returns `false`.
    /// Q-nodes yield their child sequence forward then reversed; P-nodes
    /// iterate child orderings by Heap's algorithm.
    pub fn for_each_ordering<F>(&self, mut emit: F)
    where
        F: FnMut(&[usize]) -> bool,
    {
        match self.root {
            None => {
                emit(&[]);
            }
            Some(root) => {
                let mut prefix = Vec::with_capacity(self.leaves.len());
                self.expand(&[root], &mut prefix, &mut emit);
            }
        }
    }

    /// Expands `items` (a sequence of nodes still to linearize) against the
    /// growing `prefix`; returns `false` once `emit` asks to stop.
    fn expand<F>(&self, items: &[usize], prefix: &mut Vec<usize>, emit: &mut F) -> bool
    where
        F: FnMut(&[usize]) -> bool,
    {
        let Some((&head, rest)) = items.split_first() else {
            return emit(prefix);
        };

        let node = &self.nodes[head];
        match node.kind {
            Kind::Leaf => {
                prefix.push(node.value);
                let keep_going = self.expand(rest, prefix, emit);
                prefix.pop();
                keep_going
            }
            Kind::Q => {
                let mut agenda = Vec::with_capacity(node.children.len() + rest.len());
                agenda.extend_from_slice(&node.children);
                agenda.extend_from_slice(rest);
                if !self.expand(&agenda, prefix, emit) {
                    return false;
                }
                if node.children.len() <= 1 {
                    return true;
                }
                agenda.clear();
                agenda.extend(node.children.iter().rev());
                agenda.extend_from_slice(rest);
                self.expand(&agenda, prefix, emit)
            }
            Kind::P => {
                let k = node.children.len();
                if k == 0 {
                    return self.expand(rest, prefix, emit);
                }

                let mut perm = node.children.clone();
                let mut state = vec![0usize; k];
                let mut agenda = Vec::with_capacity(k + rest.len());
                agenda.extend_from_slice(&perm);
                agenda.extend_from_slice(rest);
                if !self.expand(&agenda, prefix, emit) {
                    return false;
                }

                let mut i = 0;
                while i < k {
                    if state[i] < i {
                        if i % 2 == 0 {
                            perm.swap(0, i);
                        } else {
                            perm.swap(state[i], i);
                        }
                        agenda.clear();
                        agenda.extend_from_slice(&perm);
                        agenda.extend_from_slice(rest);
                        if !self.expand(&agenda, prefix, emit) {
                            return false;
                        }
                        state[i] += 1;
                        i = 0;
                    } else {
                        state[i] = 0;
                        i += 1;
                    }
                }
                true
            }
        }
    }

    /// Renders the tree shape with `labels` for leaves that have one:
    /// `{..}` for P-nodes, `[..]` for Q-nodes.
    pub fn render(&self, labels: &[&str]) -> String {
        match self.root {
            None => "(empty)".to_string(),
            Some(root) => {
                let mut out = String::new();
                self.render_node(&mut out, root, labels);
                out
            }
        }
    }

    fn render_node(&self, out: &mut String, ix: usize, labels: &[&str]) {
        let node = &self.nodes[ix];
        if node.kind == Kind::Leaf {
            match labels.get(node.value) {
                Some(label) => out.push_str(label),
                None => out.push_str(&node.value.to_string()),
            }
            return;
        }

        let (open, close) = if node.kind == Kind::Q {
            ('[', ']')
        } else {
            ('{', '}')
        };
        out.push(open);
        for (i, &child) in node.children.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            self.render_node(out, child, labels);
        }
        out.push(close);
    }
}

impl fmt::Display for PqTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&[]))
    }
}
