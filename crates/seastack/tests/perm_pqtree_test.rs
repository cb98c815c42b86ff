use seastack::perm::{PqTree, factorial, generate, seq};

fn contiguous(ordering: &[usize], subset: &[usize]) -> bool {
    let positions: Vec<usize> = ordering
        .iter()
        .enumerate()
        .filter(|(_, value)| subset.contains(value))
        .map(|(pos, _)| pos)
        .collect();
    positions.windows(2).all(|w| w[1] == w[0] + 1)
}

#[test]
fn construct_admits_every_ordering() {
    assert_eq!(PqTree::new(0).valid_count(), 1);
    assert_eq!(PqTree::new(1).valid_count(), 1);
    assert_eq!(PqTree::new(3).valid_count(), 6);
    assert_eq!(PqTree::new(5).valid_count(), 120);

    let orderings = PqTree::new(3).enumerate(0);
    assert_eq!(orderings.len(), 6);
    for a in &orderings {
        assert_eq!(orderings.iter().filter(|b| *b == a).count(), 1);
    }
}

#[test]
fn single_leaf_enumerates_itself() {
    assert_eq!(PqTree::new(1).enumerate(0), vec![vec![0]]);
    assert_eq!(PqTree::new(0).enumerate(0), vec![Vec::<usize>::new()]);
}

#[test]
fn trivial_subsets_are_noops() {
    let mut tree = PqTree::new(4);
    assert!(tree.reduce(&[]));
    assert!(tree.reduce(&[2]));
    assert!(tree.reduce(&[0, 1, 2, 3]));
    assert_eq!(tree.valid_count(), 24);
}

#[test]
fn reduce_keeps_the_subset_contiguous() {
    let mut tree = PqTree::new(4);
    assert!(tree.reduce(&[0, 1]));
    assert_eq!(tree.valid_count(), 12);

    for ordering in tree.enumerate(0) {
        assert!(contiguous(&ordering, &[0, 1]), "not contiguous: {ordering:?}");
    }
}

#[test]
fn chained_reductions_collapse_to_a_q_node() {
    let mut tree = PqTree::new(4);
    assert!(tree.reduce(&[0, 1]));
    assert!(tree.reduce(&[1, 2]));
    assert!(tree.reduce(&[2, 3]));

    assert_eq!(tree.valid_count(), 2);
    assert_eq!(tree.enumerate(0), vec![vec![0, 1, 2, 3], vec![3, 2, 1, 0]]);
}

#[test]
fn every_reduced_subset_stays_contiguous() {
    let mut tree = PqTree::new(6);
    let subsets: [&[usize]; 3] = [&[0, 1, 2], &[2, 3], &[4, 5]];
    for subset in subsets {
        assert!(tree.reduce(subset));
    }
    let orderings = tree.enumerate(0);
    assert!(!orderings.is_empty());
    for ordering in &orderings {
        for subset in subsets {
            assert!(contiguous(ordering, subset), "{subset:?} split in {ordering:?}");
        }
    }
    assert_eq!(orderings.len() as u64, tree.valid_count());
}

#[test]
fn reduce_is_idempotent() {
    let mut tree = PqTree::new(4);
    assert!(tree.reduce(&[1, 2]));
    let count = tree.valid_count();
    assert!(tree.reduce(&[1, 2]));
    assert_eq!(tree.valid_count(), count);
}

#[test]
fn inconsistent_constraints_fail() {
    let mut tree = PqTree::new(4);
    assert!(tree.reduce(&[0, 1]));
    assert!(tree.reduce(&[1, 2]));
    assert!(tree.reduce(&[2, 3]));
    // The leaves now form a Q-node [0 1 2 3]; {0, 2} cannot be contiguous.
    assert!(!tree.reduce(&[0, 2]));
}

#[test]
fn vacuous_reduction_succeeds() {
    let mut tree = PqTree::new(3);
    // Out-of-range values are dropped, leaving fewer than two leaves marked.
    assert!(tree.reduce(&[7, 9]));
    assert_eq!(tree.valid_count(), 6);
}

#[test]
fn enumerate_respects_the_limit() {
    let tree = PqTree::new(4);
    assert_eq!(tree.enumerate(5).len(), 5);
    assert_eq!(tree.enumerate(0).len(), 24);
}

#[test]
fn render_shows_p_and_q_nodes() {
    let mut tree = PqTree::new(4);
    assert!(tree.reduce(&[0, 1]));
    assert!(tree.reduce(&[1, 2]));
    assert!(tree.reduce(&[2, 3]));
    assert_eq!(tree.render(&["a", "b", "c", "d"]), "[a b c d]");
    assert_eq!(PqTree::new(2).to_string(), "{0 1}");
}

#[test]
fn generate_walks_permutations_by_single_transpositions() {
    let perms = generate(4, 0);
    assert_eq!(perms.len(), 24);
    for pair in perms.windows(2) {
        let differing = pair[0]
            .iter()
            .zip(pair[1].iter())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(differing, 2, "{:?} -> {:?}", pair[0], pair[1]);
    }

    assert_eq!(generate(4, 7).len(), 7);
    assert_eq!(generate(0, 0), vec![Vec::<usize>::new()]);
}

#[test]
fn seq_and_factorial_basics() {
    assert_eq!(seq(3), vec![0, 1, 2]);
    assert_eq!(seq(0), Vec::<usize>::new());
    assert_eq!(factorial(0), 1);
    assert_eq!(factorial(5), 120);
    assert_eq!(factorial(10), 3_628_800);
}
