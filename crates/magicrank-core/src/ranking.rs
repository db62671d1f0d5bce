//! Rank arithmetic for the combined ordering.
//!
//! Ranks are 1-based. Equal values share the average of the positions they
//! occupy. Non-finite values (NaN and infinities from zero denominators) form
//! a single group placed after every finite value.

use std::cmp::Ordering;

/// Ranks `values` from largest (rank 1) to smallest.
pub fn rank_descending(values: &[f64]) -> Vec<f64> {
    let mut ranks = vec![0.0; values.len()];

    let mut finite: Vec<usize> = (0..values.len())
        .filter(|&index| values[index].is_finite())
        .collect();
    finite.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));

    let mut start = 0;
    while start < finite.len() {
        let value = values[finite[start]];
        let end = finite[start..]
            .iter()
            .position(|&index| values[index] != value)
            .map_or(finite.len(), |offset| start + offset);
        let shared = average_position(start, end);
        for &index in &finite[start..end] {
            ranks[index] = shared;
        }
        start = end;
    }

    let bottom = average_position(finite.len(), values.len());
    for (index, value) in values.iter().enumerate() {
        if !value.is_finite() {
            ranks[index] = bottom;
        }
    }

    ranks
}

/// Dense 1-based ordinal of each value in ascending order. Ties are broken by
/// position, so the earlier entry gets the smaller ordinal.
pub fn ordinal_first(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ordinals = vec![0; values.len()];
    for (position, index) in order.into_iter().enumerate() {
        ordinals[index] = position + 1;
    }
    ordinals
}

/// Average of the 1-based positions `start + 1 ..= end`.
fn average_position(start: usize, end: usize) -> f64 {
    (start + 1 + end) as f64 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_value_ranks_first() {
        assert_eq!(rank_descending(&[0.1, 0.3, 0.2]), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn ties_share_average_rank() {
        assert_eq!(
            rank_descending(&[0.5, 0.2, 0.5, 0.1]),
            vec![1.5, 3.0, 1.5, 4.0]
        );
    }

    #[test]
    fn non_finite_values_rank_last_together() {
        let ranks = rank_descending(&[f64::NAN, 0.2, f64::INFINITY, 0.4, f64::NEG_INFINITY]);
        assert_eq!(ranks, vec![4.0, 2.0, 4.0, 1.0, 4.0]);
    }

    #[test]
    fn single_non_finite_value_takes_last_rank() {
        assert_eq!(rank_descending(&[f64::NAN, 1.0]), vec![2.0, 1.0]);
    }

    #[test]
    fn empty_input_yields_empty_ranks() {
        assert!(rank_descending(&[]).is_empty());
        assert!(ordinal_first(&[]).is_empty());
    }

    #[test]
    fn rank_is_monotone_in_value() {
        let values = [0.05, -0.2, 0.7, 0.05, 0.31, 0.0];
        let ranks = rank_descending(&values);
        for a in 0..values.len() {
            for b in 0..values.len() {
                if values[a] > values[b] {
                    assert!(ranks[a] < ranks[b], "{} vs {}", values[a], values[b]);
                }
            }
        }
    }

    #[test]
    fn ordinal_breaks_ties_by_position() {
        assert_eq!(ordinal_first(&[3.0, 2.0, 3.0, 1.0]), vec![3, 2, 4, 1]);
    }
}
