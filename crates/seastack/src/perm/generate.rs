/// Identity permutation of `0..n`.
pub fn seq(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Permutations of `0..n` in Heap's-algorithm order (successive entries
/// differ by one transposition), at most `limit` of them when `limit > 0`.
pub fn generate(n: usize, limit: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if n == 0 {
        out.push(Vec::new());
        return out;
    }

    let mut perm = seq(n);
    let mut state = vec![0usize; n];

    out.push(perm.clone());
    if limit != 0 && out.len() >= limit {
        return out;
    }

    let mut i = 0;
    while i < n {
        if state[i] < i {
            if i % 2 == 0 {
                perm.swap(0, i);
            } else {
                perm.swap(state[i], i);
            }
            out.push(perm.clone());
            if limit != 0 && out.len() >= limit {
                return out;
            }
            state[i] += 1;
            i = 0;
        } else {
            state[i] = 0;
            i += 1;
        }
    }
    out
}

/// `n!`, saturating at `u64::MAX`.
pub fn factorial(n: usize) -> u64 {
    let mut product: u64 = 1;
    for k in 2..=n as u64 {
        product = product.saturating_mul(k);
    }
    product
}
