//! Stable time ordering of a [`HitStats`] without breaking row consistency.
//!
//! # Algorithm
//!
//! 1. [`time_order`] builds an index permutation `p` with
//!    `hit_time[p[0]] <= hit_time[p[1]] <= …`, stable on ties.
//! 2. [`apply_permutation`] rearranges one column in place by following the
//!    cycles of `p`: each element is swapped into its final slot exactly
//!    once, and a `visited` bitmap is the only O(N) scratch space.
//! 3. [`sort_by_time`] applies the same `p` to every column through
//!    [`HitStats::visit_columns_mut`], so row `i` stays one logical hit.
//!
//! Sorting an already sorted container leaves it unchanged (`p` is the
//! identity and every cycle has length one).

use om_core::{ColumnVisitor, HitStats};

/// Indices of `stats` in ascending `hit_time` order.  Ties keep their
/// original relative order.
pub fn time_order(stats: &HitStats) -> Vec<usize> {
    let times = &stats.hit_time;
    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));
    order
}

/// Rearrange `column` so that `column_after[k] == column_before[order[k]]`.
///
/// # Panics
///
/// Panics if `order` is not a permutation of `0..column.len()`.
pub fn apply_permutation<T>(column: &mut [T], order: &[usize]) {
    assert_eq!(column.len(), order.len(), "permutation length must match column length");

    let mut visited = vec![false; column.len()];
    for start in 0..column.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let mut prev = start;
        let mut next = order[start];
        while next != start {
            column.swap(prev, next);
            visited[next] = true;
            prev = next;
            next = order[next];
        }
    }
}

struct Permute<'a> {
    order: &'a [usize],
}

impl ColumnVisitor for Permute<'_> {
    fn visit<T>(&mut self, _name: &'static str, column: &mut Vec<T>) {
        apply_permutation(column, self.order);
    }
}

/// Sort every column of `stats` by ascending `hit_time`, stably.
pub fn sort_by_time(stats: &mut HitStats) {
    if stats.is_time_sorted() {
        return;
    }
    let order = time_order(stats);
    stats.visit_columns_mut(&mut Permute { order: &order });
}
