//! Gordian - Order-preserving k-subsets

/// Upper bound on the up-front allocation for one result set.
const MAX_PREALLOCATED: usize = 1 << 16;

/// All `k`-element subsequences of `items`, in lexicographic order of
/// position.
///
/// `k = 0` yields a single empty combination; `k > items.len()` yields none.
pub fn combinations<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if k > items.len() {
        return Vec::new();
    }
    if k == items.len() {
        return vec![items.to_vec()];
    }

    let mut out = Vec::with_capacity(capacity_hint(items.len(), k));
    for (i, head) in items.iter().enumerate() {
        for tail in combinations(&items[i + 1..], k - 1) {
            let mut combo = Vec::with_capacity(k);
            combo.push(head.clone());
            combo.extend(tail);
            out.push(combo);
        }
    }
    out
}

fn capacity_hint(n: usize, k: usize) -> usize {
    binomial(n, k).min(MAX_PREALLOCATED)
}

/// `n` choose `k`, saturating on overflow.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: usize = 1;
    for i in 0..k {
        // acc * (n - i) is always divisible by (i + 1) here
        acc = match acc.checked_mul(n - i) {
            Some(v) => v / (i + 1),
            None => return usize::MAX,
        };
    }
    acc
}
