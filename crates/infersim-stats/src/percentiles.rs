//! Nearest-rank percentiles of sorted data.
//!
//! Both rank rules take the fractional rank `len * percentile / 100` and
//! differ only in rounding: [`lower_rank`] floors it and [`upper_rank`] ceils
//! it. Percentile intervals use the floor at their lower bound and the ceiling
//! at their upper bound.

/// Tolerance for snapping a fractional rank onto the integer it is meant to be.
///
/// `1000.0 * (1.0 + 0.95) / 2.0` lands a hair above `975.0`; without snapping
/// the ceiling would step one rank too far.
const RANK_SNAP_EPSILON: f64 = 1e-9;

fn snap_rank(rank: f64) -> f64 {
    let rounded = rank.round();
    if (rank - rounded).abs() < RANK_SNAP_EPSILON {
        rounded
    } else {
        rank
    }
}

/// Rank (0-indexed) at `floor(len * percentile / 100)`, clamped to `[0, len - 1]`.
///
/// Returns `None` for an empty dataset.
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn lower_rank(len: usize, percentile: f64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let rank = snap_rank(len as f64 * percentile / 100.0).floor().max(0.0) as usize;
    Some(rank.min(len - 1))
}

/// Rank (0-indexed) at `ceil(len * percentile / 100)`, clamped to `[0, len - 1]`.
///
/// Returns `None` for an empty dataset.
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn upper_rank(len: usize, percentile: f64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let rank = snap_rank(len as f64 * percentile / 100.0).ceil().max(0.0) as usize;
    Some(rank.min(len - 1))
}

/// Value at [`lower_rank`] of `sorted_values`, or `f64::NAN` if it is empty.
///
/// ```
/// use infersim_stats::percentiles::compute_percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_percentile(&values, 50.0), 3.0);
/// assert_eq!(compute_percentile(&values, 25.0), 2.0);
/// ```
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    lower_rank(sorted_values.len(), percentile).map_or(f64::NAN, |idx| sorted_values[idx])
}

/// Value at [`upper_rank`] of `sorted_values`, or `f64::NAN` if it is empty.
///
/// ```
/// use infersim_stats::percentiles::compute_upper_percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_upper_percentile(&values, 25.0), 3.0);
/// assert_eq!(compute_upper_percentile(&values, 100.0), 5.0);
/// ```
#[must_use]
pub fn compute_upper_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    upper_rank(sorted_values.len(), percentile).map_or(f64::NAN, |idx| sorted_values[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(compute_percentile(&[], 50.0).is_nan());
        assert_eq!(lower_rank(0, 50.0), None);
        assert_eq!(upper_rank(0, 50.0), None);
    }

    #[test]
    fn test_ranks_for_ninety_five_percent_interval() {
        assert_eq!(lower_rank(1000, 100.0 * (1.0 - 0.95) / 2.0), Some(25));
        assert_eq!(upper_rank(1000, 100.0 * (1.0 + 0.95) / 2.0), Some(975));
    }

    #[test]
    fn test_ranks_are_clamped() {
        assert_eq!(upper_rank(2, 99.99), Some(1));
        assert_eq!(lower_rank(2, 0.0), Some(0));
        assert_eq!(lower_rank(3, 150.0), Some(2));
    }

    #[test]
    fn test_floor_and_ceiling_differ_between_ranks() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(compute_percentile(&values, 30.0), 20.0);
        assert_eq!(compute_upper_percentile(&values, 30.0), 30.0);
        assert_eq!(compute_upper_percentile(&values, 50.0), 30.0);
    }
}
